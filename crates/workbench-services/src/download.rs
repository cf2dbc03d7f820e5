//! Outbound HTTP fetches (development companion, CDN callback page).

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

/// Errors from an outbound fetch.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("could not connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },
    #[error("failed to read response from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to decode JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Thin wrapper over a shared HTTP client with a per-request timeout.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: reqwest::Client,
}

impl Downloader {
    pub fn new(timeout: Duration) -> Result<Self, DownloadError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(DownloadError::Client)?;
        Ok(Self { client })
    }

    /// GET `url` and return the body as text. Non-2xx statuses are errors.
    pub async fn fetch_text(&self, url: &str) -> Result<String, DownloadError> {
        debug!("Fetching {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| DownloadError::Body {
            url: url.to_string(),
            source,
        })
    }

    /// GET `url` and decode the body as JSON.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, DownloadError> {
        let text = self.fetch_text(url).await?;
        serde_json::from_str(&text).map_err(|source| DownloadError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

fn classify(url: &str, err: reqwest::Error) -> DownloadError {
    if err.is_timeout() {
        DownloadError::Timeout { url: url.to_string() }
    } else {
        DownloadError::Connect {
            url: url.to_string(),
            source: err,
        }
    }
}
