mod token;

use std::path::Path;

use log::debug;
use serde_json::Value;

use crate::error::{CaseLensError, Result};

pub use token::Token;

/// JSON field holding the ReportPortal token inside the fallback key file.
pub const TOKEN_FILE_FIELD: &str = "ginkgo_rp_mmtoken";

/// Resolves the ReportPortal token.
///
/// Order: explicit value (the CLI flag, which clap already fills from
/// `RP_TOKEN`), then the `ginkgo_rp_mmtoken` field of `key_file` when that
/// file exists.
pub fn resolve_reportportal_token(explicit: Option<&str>, key_file: &Path) -> Result<Token> {
    if let Some(value) = explicit.filter(|v| !v.trim().is_empty()) {
        return Ok(Token::from(value));
    }

    if key_file.exists() {
        debug!("Reading ReportPortal token from {}", key_file.display());
        let raw = std::fs::read_to_string(key_file)?;
        let data: Value = serde_json::from_str(&raw)?;
        if let Some(value) = data.get(TOKEN_FILE_FIELD).and_then(Value::as_str) {
            let token = Token::from(value);
            if !token.is_empty() {
                return Ok(token);
            }
        }
    }

    Err(CaseLensError::Config(
        "token is empty, pass it with --token or RP_TOKEN".to_string(),
    ))
}
