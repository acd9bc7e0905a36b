mod collect;
mod core;

pub use self::core::{CollectConfig, ReportPortalProvider};
pub use collect::CollectionReport;
