pub mod client;
mod provider;
mod source;

pub use client::{ReportPortalClient, RetryPolicy};
pub use provider::{CollectConfig, CollectionReport, ReportPortalProvider};
pub use source::{Source, PLATFORMS};
