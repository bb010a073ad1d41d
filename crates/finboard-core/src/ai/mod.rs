//! Pluggable text-generation backend abstraction
//!
//! # Architecture
//!
//! - `InsightBackend` trait: the single operation insight generation needs
//! - `InsightClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `HuggingFaceBackend`, `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = DashboardConfig::load()?;
//! if let Some(client) = InsightClient::from_config(&config) {
//!     let text = client.generate(&prompt.text, &prompt.params).await?;
//! }
//! ```
//!
//! A client is only built when the credential is present; callers treat
//! `None` as "feature disabled", not as an error.

mod huggingface;
mod mock;
mod openai_compatible;

pub use huggingface::HuggingFaceBackend;
pub use mock::MockBackend;
pub use openai_compatible::OpenAICompatibleBackend;

use async_trait::async_trait;

use crate::config::{DashboardConfig, InferenceBackend};
use crate::error::Result;
use crate::prompts::GenerationParams;

/// Trait defining the interface for all text-generation backends
#[async_trait]
pub trait InsightBackend: Send + Sync {
    /// Generate a completion for `prompt`
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;

    /// Check if the backend is reachable with the configured credential
    async fn health_check(&self) -> bool;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete insight client enum
#[derive(Clone)]
pub enum InsightClient {
    /// Hosted text-generation inference API
    HuggingFace(HuggingFaceBackend),
    /// OpenAI-compatible chat completions server
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl InsightClient {
    /// Create a client from configuration
    ///
    /// Returns None if the credential is missing.
    pub fn from_config(config: &DashboardConfig) -> Option<Self> {
        if !config.insights_enabled() {
            return None;
        }

        let token = config.inference_token.as_deref().unwrap_or_default();
        match config.backend {
            InferenceBackend::HuggingFace => Some(InsightClient::HuggingFace(
                HuggingFaceBackend::new(&config.inference_host, &config.model, token),
            )),
            InferenceBackend::OpenAICompatible => Some(InsightClient::OpenAICompatible(
                OpenAICompatibleBackend::with_api_key(&config.inference_host, &config.model, token),
            )),
            InferenceBackend::Mock => Some(InsightClient::Mock(MockBackend::new())),
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        InsightClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl InsightBackend for InsightClient {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        match self {
            InsightClient::HuggingFace(b) => b.generate(prompt, params).await,
            InsightClient::OpenAICompatible(b) => b.generate(prompt, params).await,
            InsightClient::Mock(b) => b.generate(prompt, params).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            InsightClient::HuggingFace(b) => b.health_check().await,
            InsightClient::OpenAICompatible(b) => b.health_check().await,
            InsightClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            InsightClient::HuggingFace(b) => b.model(),
            InsightClient::OpenAICompatible(b) => b.model(),
            InsightClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            InsightClient::HuggingFace(b) => b.host(),
            InsightClient::OpenAICompatible(b) => b.host(),
            InsightClient::Mock(b) => b.host(),
        }
    }
}
