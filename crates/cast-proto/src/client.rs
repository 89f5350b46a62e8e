//! HTTP client for the bridge's control endpoint.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::config::BackendConfig;
use crate::protocol::Command;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("could not build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

/// Cheap to clone; every spawned request task holds its own copy.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("cast-remote/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, ClientError> {
        Self::new(config.base_url(), Duration::from_millis(config.timeout_ms))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `cmd` as a bare body to `/` and return the response text.
    pub async fn send(&self, cmd: Command) -> Result<String, ClientError> {
        let url = format!("{}/", self.base_url);
        let body = cmd.wire();
        debug!("POST {} {:?}", url, body);

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|source| ClientError::Http {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(ClientError::Status {
                url,
                status: response.status(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| ClientError::Http { url, source })
    }

    /// Fetch the cover image. `cover_url` may carry a `#fragment`; it is
    /// dropped before the request goes out.
    pub async fn fetch_cover(&self, cover_url: &str) -> Result<Vec<u8>, ClientError> {
        let url = cover_url
            .split_once('#')
            .map(|(u, _)| u)
            .unwrap_or(cover_url)
            .to_string();

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| ClientError::Http {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(ClientError::Status {
                url,
                status: response.status(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| ClientError::Http { url, source })?;
        Ok(bytes.to_vec())
    }
}
