use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::auth::Token;
use crate::error::{CaseLensError, Result};

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// The fields of a Google service-account key file this tool needs.
#[derive(Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CaseLensError::Config(format!("Cannot read key file {}: {e}", path.display()))
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// RS256-signed JWT asserting this account, valid for one hour.
    pub fn assertion(&self, issued_at: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            iss: &self.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.token_uri,
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::hours(1)).timestamp(),
        };
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }
}

/// Exchanges a signed assertion for an OAuth access token.
pub async fn fetch_access_token(client: &Client, key: &ServiceAccountKey) -> Result<Token> {
    debug!("Requesting access token for {}", key.client_email);
    let assertion = key.assertion(Utc::now())?;

    let params = [
        ("grant_type", JWT_BEARER_GRANT),
        ("assertion", assertion.as_str()),
    ];
    let response = client.post(&key.token_uri).form(&params).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CaseLensError::Api(format!(
            "Token exchange failed: {status} - {body}"
        )));
    }

    let token: TokenResponse = response.json().await?;
    Ok(Token::from(token.access_token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use jsonwebtoken::decode_header;

    const FIXTURE: &str = include_str!("../../tests/fixtures/service_account.json");

    #[test]
    fn test_assertion_is_rs256_jwt() {
        let key: ServiceAccountKey = serde_json::from_str(FIXTURE).unwrap();
        let issued_at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();

        let assertion = key.assertion(issued_at).unwrap();

        assert_eq!(assertion.split('.').count(), 3);
        assert_eq!(decode_header(&assertion).unwrap().alg, Algorithm::RS256);
    }

    #[test]
    fn test_token_uri_defaults_to_google() {
        let key: ServiceAccountKey = serde_json::from_str(
            r#"{"client_email": "a@b.iam.gserviceaccount.com", "private_key": "pem"}"#,
        )
        .unwrap();

        assert_eq!(key.token_uri, "https://oauth2.googleapis.com/token");
        assert!(!format!("{key:?}").contains("pem"));
    }
}
