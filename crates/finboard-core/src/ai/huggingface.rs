//! Hosted text-generation inference backend
//!
//! Calls `POST {host}/models/{model}` with a bearer token. The API answers
//! either a list of generations, a single generation object, or an error
//! object; all three shapes are handled.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::prompts::GenerationParams;

use super::InsightBackend;

/// Hosted inference API backend
#[derive(Clone)]
pub struct HuggingFaceBackend {
    http_client: Client,
    base_url: String,
    model: String,
    token: String,
}

impl HuggingFaceBackend {
    pub fn new(base_url: &str, model: &str, token: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            token: token.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model)
    }
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
    return_full_text: bool,
}

#[async_trait]
impl InsightBackend for HuggingFaceBackend {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        if self.token.trim().is_empty() {
            return Err(Error::NotConfigured("HuggingFace API token".into()));
        }

        let request = GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters {
                max_new_tokens: params.max_new_tokens,
                temperature: params.temperature,
                return_full_text: false,
            },
        };

        debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            max_new_tokens = params.max_new_tokens,
            "Text generation request"
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let detail = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(body);
            return Err(Error::Inference(format!(
                "Inference API error {}: {}",
                status, detail
            )));
        }

        parse_generation(&body)
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(self.endpoint())
            .bearer_auth(&self.token)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

/// Extract `generated_text` from any of the response shapes
fn parse_generation(body: &str) -> Result<String> {
    let value: Value = serde_json::from_str(body)?;

    let generation = match &value {
        Value::Array(items) => items.first(),
        Value::Object(_) => Some(&value),
        _ => None,
    };

    if let Some(error) = value.get("error").and_then(Value::as_str) {
        return Err(Error::Inference(error.to_string()));
    }

    generation
        .and_then(|g| g.get("generated_text"))
        .and_then(Value::as_str)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| Error::Inference("No generated text in response".into()))
}
