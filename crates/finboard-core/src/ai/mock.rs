//! Mock backend for testing
//!
//! Useful for unit tests and development without inference credentials.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::prompts::GenerationParams;

use super::InsightBackend;

const DEFAULT_RESPONSE: &str = "1. Cook at home more often to reduce dining costs.\n\
2. Review recurring subscriptions and cancel the ones you no longer use.\n\
3. Set up an automatic transfer to savings on payday.";

/// Mock insight backend
///
/// Returns a fixed response, or a fixed error when built with `failing`.
/// Clones share the call counter.
#[derive(Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    response: std::result::Result<String, String>,
    calls: Arc<AtomicUsize>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self::with_response(DEFAULT_RESPONSE)
    }

    /// Mock that always answers `response`
    pub fn with_response(response: &str) -> Self {
        Self {
            healthy: true,
            response: Ok(response.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Mock whose generation always fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            healthy: false,
            response: Err(message.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of generate calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InsightBackend for MockBackend {
    async fn generate(&self, _prompt: &str, _params: &GenerationParams) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(Error::Inference(message.clone())),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> GenerationParams {
        GenerationParams {
            max_new_tokens: 10,
            temperature: 0.5,
        }
    }

    #[tokio::test]
    async fn test_custom_response_and_counter() {
        let mock = MockBackend::with_response("Spend less");
        let clone = mock.clone();
        assert_eq!(mock.generate("p", &params()).await.unwrap(), "Spend less");
        clone.generate("p", &params()).await.unwrap();
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_failing() {
        let mock = MockBackend::failing("quota exceeded");
        let err = mock.generate("p", &params()).await.unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
        assert!(!mock.health_check().await);
    }
}
