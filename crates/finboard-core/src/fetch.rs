//! Analysis service fetcher
//!
//! The analysis service exposes two read-only endpoints. Every failure is
//! reported to the caller as an error; [`report_failure`] turns it into the
//! user-visible notice that replaces the missing data.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::DEFAULT_FETCH_TIMEOUT;
use crate::error::{Error, Result};
use crate::models::Notice;

/// Path of the spending breakdown resource
pub const SPENDING_BY_CATEGORY_PATH: &str = "/analysis/spending-by-category";

/// Path of the income/expense/savings resource
pub const TOTAL_SUMMARY_PATH: &str = "/analysis/total-summary";

/// Source of JSON documents keyed by URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and decode the body as JSON
    async fn fetch(&self, url: &str) -> Result<Value>;
}

/// Absolute URLs of the analysis service resources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn spending_by_category(&self) -> String {
        format!("{}{}", self.base, SPENDING_BY_CATEGORY_PATH)
    }

    pub fn total_summary(&self) -> String {
        format!("{}{}", self.base, TOTAL_SUMMARY_PATH)
    }
}

/// HTTP GET with a fixed timeout and no retries
#[derive(Clone)]
pub struct HttpFetcher {
    http_client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            http_client: Client::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Value> {
        debug!(url = %url, timeout_ms = self.timeout.as_millis() as u64, "GET");

        let response = self
            .http_client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        // Read the body first so a transport failure and a decode failure
        // surface as different error kinds
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Convert a fetch failure into the notice shown in place of the data
pub fn report_failure(url: &str, err: &Error) -> Notice {
    tracing::warn!(url = %url, error = %err, "Analysis service fetch failed");
    match err {
        Error::Json(e) => Notice::error(format!("Error decoding JSON: {}", e)),
        Error::Http(e) => Notice::error(format!("Error fetching data: {}", e)),
        other => Notice::error(format!("Error fetching data: {}", other)),
    }
}
