use log::{debug, error};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::retry::RetryPolicy;
use crate::auth::Token;
use crate::error::{CaseLensError, Result};

pub struct ReportPortalClient {
    pub client: Client,
    pub base_url: Url,
    pub token: Token,
    pub retry: RetryPolicy,
}

impl ReportPortalClient {
    /// Certificate validation is off unless `verify_tls` is set; the
    /// reporting service is reached with an internal CA.
    pub fn new(base_url: &str, token: Token, verify_tls: bool) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("caselens/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .map_err(|e| CaseLensError::Config(format!("Failed to create HTTP client: {e}")))?;

        let base_url = Url::parse(base_url)
            .map_err(|e| CaseLensError::Config(format!("Invalid base URL: {e}")))?;

        Ok(Self {
            client,
            base_url,
            token,
            retry: RetryPolicy::default(),
        })
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// `<base>/api/v1/<project>/<endpoint>`
    pub fn api_url(&self, project: &str, endpoint: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CaseLensError::Config(format!("Invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "v1", project, endpoint]);
        Ok(url)
    }

    /// GETs `url` and parses the body as JSON.
    ///
    /// Connection failures are retried. A non-2xx status is logged but the
    /// body is still handed back, so callers must cope with missing fields.
    pub async fn fetch_json(&self, url: Url) -> Result<Value> {
        debug!("GET {url}");

        let response = self
            .retry
            .execute(
                || {
                    let request = self
                        .client
                        .get(url.clone())
                        .header(AUTHORIZATION, format!("bearer {}", self.token.as_str()));
                    async move { request.send().await.map_err(CaseLensError::from) }
                },
                CaseLensError::is_transient,
            )
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("GET {url} failed with {status}: {body}");
        }

        serde_json::from_str(&body).map_err(|e| {
            CaseLensError::Api(format!("GET {url} returned {status} with a non-JSON body: {e}"))
        })
    }
}
