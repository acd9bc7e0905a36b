pub mod auth;
pub mod case_id;
pub mod error;
pub mod logging;
pub mod reportportal;
pub mod results;
pub mod rollup;
pub mod sheets;
pub mod tickets;
pub mod url_utils;

pub use error::{CaseLensError, Result};
