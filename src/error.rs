use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaseLensError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Lookup failed: {0}")]
    Lookup(String),

    #[error("Unexpected response shape: {0}")]
    DataShape(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token signing error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl CaseLensError {
    /// Connection-level failures worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, CaseLensError>;
