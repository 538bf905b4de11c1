//! JSON fetching with a normalised failure taxonomy.
//!
//! Everything the dashboard shows comes from the platform backend as JSON.
//! [`JsonFetcher`] is the seam between the update coordinator and the network:
//! production code uses [`HttpFetcher`] (a thin wrapper over a shared
//! [`reqwest::Client`]), while tests substitute an in-memory fetcher and never
//! touch a socket.
//!
//! Failures are split three ways so callers can tell "the server is down"
//! from "the server answered with an error" from "the server answered with
//! garbage". None of the call sites retry — the next scheduled poll is the
//! retry mechanism.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Why a fetch-and-parse cycle failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent, or no response was received.
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    /// A response arrived, but with a non-success status code.
    #[error("server returned {status} for {url}")]
    Status { status: StatusCode, url: String },

    /// The response body was not valid JSON.
    #[error("invalid JSON from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Asynchronous JSON-over-HTTP GET, abstracted so the polling machinery can
/// be exercised without a network.
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    /// Fetch `url` and parse the body as JSON.
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// The production fetcher.
///
/// Holds one connection-pooling [`reqwest::Client`] shared by every feed.
pub struct HttpFetcher {
    client: reqwest::Client,
}

/// Per-request timeout. A hung backend must not wedge a polling cycle past
/// the next tick.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(FetchError::Network)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        let body = response.text().await.map_err(FetchError::Network)?;
        serde_json::from_str(&body).map_err(|source| FetchError::Parse {
            url: url.to_string(),
            source,
        })
    }
}
