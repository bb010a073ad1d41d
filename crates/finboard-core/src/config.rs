//! Dashboard configuration
//!
//! Values are resolved with three layers, later layers winning:
//! 1. Built-in defaults
//! 2. Secrets file (`~/.config/finboard/secrets.toml` or an explicit path)
//! 3. Environment variables
//!
//! ```toml
//! analysis_api = "http://localhost:8080"
//! huggingface_api_token = "hf_..."
//!
//! [inference]
//! model = "mistralai/Mistral-7B-Instruct-v0.3"
//! host = "https://api-inference.huggingface.co"
//! backend = "huggingface"
//! ```
//!
//! The uppercase `QUARKUS_API` and `HUGGINGFACE_API_TOKEN` keys are accepted
//! as aliases for the first two entries.
//!
//! A missing token is not an error: insight generation is simply disabled.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Default analysis service location
pub const DEFAULT_ANALYSIS_API: &str = "http://localhost:8080";

/// Default hosted text-generation model
pub const DEFAULT_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.3";

/// Default hosted inference API
pub const DEFAULT_INFERENCE_HOST: &str = "https://api-inference.huggingface.co";

/// Timeout for analysis service requests
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Which text-generation API serves insights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InferenceBackend {
    /// Hosted text-generation inference API
    #[default]
    HuggingFace,
    /// Any server implementing `/v1/chat/completions`
    OpenAICompatible,
    /// Canned responses, for development and tests
    Mock,
}

impl InferenceBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HuggingFace => "huggingface",
            Self::OpenAICompatible => "openai_compatible",
            Self::Mock => "mock",
        }
    }
}

impl std::str::FromStr for InferenceBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(Self::HuggingFace),
            "openai_compatible" | "openai" | "vllm" | "localai" => Ok(Self::OpenAICompatible),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown inference backend: {}", s)),
        }
    }
}

impl std::fmt::Display for InferenceBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolved dashboard configuration
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Base URL of the analysis service
    pub api_base: String,
    /// Credential for the hosted inference API
    pub inference_token: Option<String>,
    /// Text-generation model identifier
    pub model: String,
    /// Inference API base URL
    pub inference_host: String,
    /// Inference API flavour
    pub backend: InferenceBackend,
    /// Per-request timeout for analysis service fetches, not read from the
    /// secrets file
    pub fetch_timeout: Duration,
    /// Secrets file that was read, if any
    pub secrets_path: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_ANALYSIS_API.to_string(),
            inference_token: None,
            model: DEFAULT_MODEL.to_string(),
            inference_host: DEFAULT_INFERENCE_HOST.to_string(),
            backend: InferenceBackend::default(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            secrets_path: None,
        }
    }
}

impl DashboardConfig {
    /// Load from the default secrets location and the environment
    pub fn load() -> Result<Self> {
        let path = std::env::var("FINBOARD_SECRETS")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .or_else(default_secrets_path);
        Self::load_from(path.as_deref())
    }

    /// Load from an explicit secrets file (if it exists) and the environment
    pub fn load_from(secrets_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = secrets_path {
            if path.exists() {
                let content = fs::read_to_string(path).map_err(|e| {
                    Error::InvalidData(format!(
                        "Failed to read secrets file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                config.apply_secrets(&content)?;
                config.secrets_path = Some(path.to_path_buf());
            } else {
                tracing::debug!(path = %path.display(), "No secrets file, using defaults");
            }
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply a TOML secrets document on top of the current values
    pub fn apply_secrets(&mut self, content: &str) -> Result<()> {
        let raw: RawSecrets = toml::from_str(content)?;

        if let Some(api) = non_empty(raw.analysis_api) {
            self.api_base = api;
        }
        if let Some(token) = non_empty(raw.huggingface_api_token) {
            self.inference_token = Some(token);
        }
        if let Some(inference) = raw.inference {
            if let Some(model) = non_empty(inference.model) {
                self.model = model;
            }
            if let Some(host) = non_empty(inference.host) {
                self.inference_host = host;
            }
            if let Some(backend) = non_empty(inference.backend) {
                self.backend = backend.parse().map_err(Error::InvalidData)?;
            }
        }
        Ok(())
    }

    /// Apply environment overrides through a lookup function
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api) = non_empty(lookup("FINBOARD_ANALYSIS_API")) {
            self.api_base = api;
        }
        if let Some(token) = non_empty(lookup("HUGGINGFACE_API_TOKEN")) {
            self.inference_token = Some(token);
        }
        if let Some(model) = non_empty(lookup("FINBOARD_MODEL")) {
            self.model = model;
        }
        if let Some(host) = non_empty(lookup("FINBOARD_INFERENCE_HOST")) {
            self.inference_host = host;
        }
        if let Some(backend) = non_empty(lookup("FINBOARD_INFERENCE_BACKEND")) {
            match backend.parse() {
                Ok(backend) => self.backend = backend,
                Err(e) => tracing::warn!(error = %e, "Ignoring FINBOARD_INFERENCE_BACKEND"),
            }
        }
    }

    /// Override the analysis service base URL
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.to_string();
        self
    }

    /// Whether insight generation can be offered
    ///
    /// Every real backend needs the credential; the mock backend does not.
    pub fn insights_enabled(&self) -> bool {
        self.inference_token.is_some() || self.backend == InferenceBackend::Mock
    }
}

/// Default secrets file location
pub fn default_secrets_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("finboard").join("secrets.toml"))
}

#[derive(Debug, Deserialize)]
struct RawSecrets {
    #[serde(alias = "QUARKUS_API")]
    analysis_api: Option<String>,
    #[serde(alias = "HUGGINGFACE_API_TOKEN")]
    huggingface_api_token: Option<String>,
    inference: Option<RawInference>,
}

#[derive(Debug, Deserialize)]
struct RawInference {
    model: Option<String>,
    host: Option<String>,
    backend: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.api_base, "http://localhost:8080");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert!(!config.insights_enabled());
    }

    #[test]
    fn test_apply_secrets() {
        let mut config = DashboardConfig::default();
        config
            .apply_secrets(
                r#"
analysis_api = "http://analysis:9000"
huggingface_api_token = "hf_secret"

[inference]
model = "some/model"
"#,
            )
            .unwrap();
        assert_eq!(config.api_base, "http://analysis:9000");
        assert_eq!(config.inference_token.as_deref(), Some("hf_secret"));
        assert_eq!(config.model, "some/model");
        assert_eq!(config.inference_host, DEFAULT_INFERENCE_HOST);
        assert!(config.insights_enabled());
    }

    #[test]
    fn test_uppercase_secret_keys() {
        let mut config = DashboardConfig::default();
        config
            .apply_secrets(
                "QUARKUS_API = \"http://quarkus:8080\"\nHUGGINGFACE_API_TOKEN = \"hf_upper\"",
            )
            .unwrap();
        assert_eq!(config.api_base, "http://quarkus:8080");
        assert_eq!(config.inference_token.as_deref(), Some("hf_upper"));
        assert!(config.insights_enabled());
    }

    #[test]
    fn test_fetch_timeout_is_fixed() {
        let mut config = DashboardConfig::default();
        config.apply_secrets("fetch_timeout_secs = 0").unwrap();
        assert_eq!(config.fetch_timeout, DEFAULT_FETCH_TIMEOUT);
    }

    #[test]
    fn test_empty_token_is_absent() {
        let mut config = DashboardConfig::default();
        config.apply_secrets("huggingface_api_token = \"  \"").unwrap();
        assert!(config.inference_token.is_none());
        assert!(!config.insights_enabled());
    }

    #[test]
    fn test_backend_selection() {
        let mut config = DashboardConfig::default();
        assert_eq!(config.backend, InferenceBackend::HuggingFace);
        config
            .apply_secrets("[inference]\nbackend = \"openai\"\nhost = \"http://llm:8000\"")
            .unwrap();
        assert_eq!(config.backend, InferenceBackend::OpenAICompatible);
        assert_eq!(config.inference_host, "http://llm:8000");
        assert!(config
            .apply_secrets("[inference]\nbackend = \"carrier-pigeon\"")
            .is_err());
    }

    #[test]
    fn test_invalid_toml() {
        let mut config = DashboardConfig::default();
        assert!(config.apply_secrets("analysis_api = ").is_err());
    }

    #[test]
    fn test_env_overrides_secrets() {
        let mut config = DashboardConfig::default();
        config
            .apply_secrets("analysis_api = \"http://from-file\"")
            .unwrap();

        let env: HashMap<&str, &str> = [
            ("FINBOARD_ANALYSIS_API", "http://from-env"),
            ("HUGGINGFACE_API_TOKEN", "hf_env"),
        ]
        .into_iter()
        .collect();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_base, "http://from-env");
        assert_eq!(config.inference_token.as_deref(), Some("hf_env"));
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::load_from(Some(&dir.path().join("nope.toml"))).unwrap();
        assert!(config.secrets_path.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.toml");
        std::fs::write(&path, "[inference]\nmodel = \"file/model\"\n").unwrap();
        let config = DashboardConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.secrets_path.as_deref(), Some(path.as_path()));
    }
}
