//! AI-powered savings insights
//!
//! Builds a prompt from the two analysis payloads, sends it to the configured
//! text-generation backend and optionally renders the answer as a PDF report
//! and MP3 audio. Every failure is caught here and turned into a notice; the
//! caller always gets an `InsightReport` back.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ai::{InsightBackend, InsightClient};
use crate::artifacts::{synthesize_artifact, Artifact, GoogleTranslateTts, PdfReport, SpeechSynthesizer};
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::models::{Language, Notice, Notices, SpendingByCategory, SummaryPayload};
use crate::prompts::{InsightPrompt, PromptId, PromptLibrary};

/// Shown instead of the generate action when no credential is configured
pub const MISSING_TOKEN_WARNING: &str =
    "Please configure your HuggingFace API token to enable AI features";

/// Shown when either analysis payload is unavailable
pub const MISSING_DATA_WARNING: &str = "Missing data for insights. Please refresh the dashboard.";

/// Follows every generation failure
pub const INSIGHT_ERROR_HINT: &str = "Check your HuggingFace API token and network connection.";

/// Send a rendered prompt to the backend and return the trimmed answer
pub async fn generate_insight(client: &dyn InsightBackend, prompt: &InsightPrompt) -> Result<String> {
    debug!(
        prompt = prompt.id.as_str(),
        model = client.model(),
        prompt_len = prompt.text.len(),
        "Generating insight"
    );
    let text = client.generate(&prompt.text, &prompt.params).await?;
    Ok(text.trim().to_string())
}

/// Newlines become `<br>`; nothing else is touched
pub fn to_display_html(text: &str) -> String {
    text.replace('\n', "<br>")
}

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InsightRequest {
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_prompt")]
    pub prompt: PromptId,
    #[serde(default)]
    pub pdf: bool,
    #[serde(default)]
    pub audio: bool,
}

fn default_prompt() -> PromptId {
    PromptId::SavingsTips
}

impl Default for InsightRequest {
    fn default() -> Self {
        Self {
            language: Language::default(),
            prompt: default_prompt(),
            pdf: false,
            audio: false,
        }
    }
}

impl InsightRequest {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }
}

/// Outcome of one generate action
#[derive(Debug, Clone, Default, Serialize)]
pub struct InsightReport {
    pub language: Language,
    pub text: Option<String>,
    pub html: Option<String>,
    pub pdf: Option<Artifact>,
    pub audio: Option<Artifact>,
    pub notices: Notices,
}

/// Whether the insights feature is usable, and with what
#[derive(Debug, Clone, Serialize)]
pub struct InsightStatus {
    pub enabled: bool,
    pub model: Option<String>,
    pub host: Option<String>,
    pub languages: Vec<Language>,
    pub notices: Notices,
}

/// Runs the insight pipeline against a fixed backend and synthesizer
pub struct InsightRenderer {
    client: Option<InsightClient>,
    speech: Arc<dyn SpeechSynthesizer>,
    prompts: Mutex<PromptLibrary>,
}

impl InsightRenderer {
    pub fn new(
        client: Option<InsightClient>,
        speech: Arc<dyn SpeechSynthesizer>,
        prompts: PromptLibrary,
    ) -> Self {
        Self {
            client,
            speech,
            prompts: Mutex::new(prompts),
        }
    }

    /// Backend from config, online speech, prompts with user overrides
    pub fn from_config(config: &DashboardConfig) -> Self {
        let client = InsightClient::from_config(config);
        if client.is_none() {
            info!("No inference token configured, AI insights disabled");
        }
        Self::new(
            client,
            Arc::new(GoogleTranslateTts::new()),
            PromptLibrary::new(),
        )
    }

    pub fn enabled(&self) -> bool {
        self.client.is_some()
    }

    pub fn client(&self) -> Option<&InsightClient> {
        self.client.as_ref()
    }

    pub fn status(&self) -> InsightStatus {
        let mut notices = Notices::new();
        if self.client.is_none() {
            notices.push(Notice::warning(MISSING_TOKEN_WARNING));
        }
        InsightStatus {
            enabled: self.client.is_some(),
            model: self.client.as_ref().map(|c| c.model().to_string()),
            host: self.client.as_ref().map(|c| c.host().to_string()),
            languages: Language::all().to_vec(),
            notices,
        }
    }

    fn build_prompt(
        &self,
        summary: &SummaryPayload,
        spending: &SpendingByCategory,
        request: &InsightRequest,
    ) -> Result<InsightPrompt> {
        let mut prompts = self.prompts.lock().unwrap_or_else(|e| e.into_inner());
        prompts.build(request.prompt, summary, spending, request.language)
    }

    /// Generate advice and the requested artifacts
    pub async fn render(
        &self,
        summary: Option<&SummaryPayload>,
        spending: Option<&SpendingByCategory>,
        request: &InsightRequest,
    ) -> InsightReport {
        let mut report = InsightReport {
            language: request.language,
            ..InsightReport::default()
        };

        let Some(client) = self.client.as_ref() else {
            report.notices.push(Notice::warning(MISSING_TOKEN_WARNING));
            return report;
        };

        let (Some(summary), Some(spending)) = (summary, spending) else {
            report.notices.push(Notice::warning(MISSING_DATA_WARNING));
            return report;
        };

        let text = match self.build_prompt(summary, spending, request) {
            Ok(prompt) => generate_insight(client, &prompt).await,
            Err(e) => Err(e),
        };

        let text = match text {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Insight generation failed");
                report
                    .notices
                    .push(Notice::error(format!("Failed to generate insights: {}", e)));
                report.notices.push(Notice::info(INSIGHT_ERROR_HINT));
                return report;
            }
        };

        if request.pdf {
            match PdfReport::for_insights(&text, request.language).write() {
                Ok(artifact) => report.pdf = Some(artifact),
                Err(e) => {
                    warn!(error = %e, "PDF generation failed");
                    report
                        .notices
                        .push(Notice::error(format!("Failed to generate PDF: {}", e)));
                }
            }
        }

        if request.audio {
            match synthesize_artifact(self.speech.as_ref(), &text, request.language).await {
                Ok(artifact) => report.audio = Some(artifact),
                Err(e) => {
                    warn!(error = %e, synthesizer = self.speech.name(), "Speech synthesis failed");
                    report
                        .notices
                        .push(Notice::error(format!("Failed to generate audio: {}", e)));
                }
            }
        }

        report.html = Some(to_display_html(&text));
        report.text = Some(text);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;
    use crate::artifacts::MockSpeech;
    use crate::models::NoticeLevel;

    fn summary() -> SummaryPayload {
        SummaryPayload {
            total_income: 3000.0,
            total_expenses: 2000.0,
            savings: 1000.0,
        }
    }

    fn spending() -> SpendingByCategory {
        SpendingByCategory::from_pairs([("Rent", 1000.0), ("Food", 500.0), ("Other", 500.0)])
            .unwrap()
    }

    fn renderer(backend: MockBackend, speech: MockSpeech) -> InsightRenderer {
        InsightRenderer::new(
            Some(InsightClient::Mock(backend)),
            Arc::new(speech),
            PromptLibrary::embedded_only(),
        )
    }

    fn cleanup(report: &InsightReport) {
        for artifact in report.pdf.iter().chain(report.audio.iter()) {
            let _ = std::fs::remove_file(&artifact.path);
        }
    }

    #[test]
    fn test_display_html() {
        assert_eq!(to_display_html("1. A\n2. B"), "1. A<br>2. B");
        assert_eq!(to_display_html("<b>x</b>"), "<b>x</b>");
    }

    #[tokio::test]
    async fn test_disabled_without_client() {
        let renderer = InsightRenderer::new(
            None,
            Arc::new(MockSpeech::new()),
            PromptLibrary::embedded_only(),
        );
        assert!(!renderer.status().enabled);

        let report = renderer
            .render(Some(&summary()), Some(&spending()), &InsightRequest::default())
            .await;
        assert!(report.text.is_none());
        assert_eq!(report.notices, vec![Notice::warning(MISSING_TOKEN_WARNING)]);
    }

    #[tokio::test]
    async fn test_missing_data_skips_backend() {
        let backend = MockBackend::new();
        let renderer = renderer(backend.clone(), MockSpeech::new());

        let report = renderer
            .render(Some(&summary()), None, &InsightRequest::default())
            .await;
        assert_eq!(report.notices, vec![Notice::warning(MISSING_DATA_WARNING)]);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_text_and_artifacts() {
        let speech = MockSpeech::new();
        let renderer = renderer(MockBackend::with_response("  Tip one\nTip two \n"), speech.clone());
        let request = InsightRequest {
            language: Language::German,
            pdf: true,
            audio: true,
            ..InsightRequest::default()
        };

        let report = renderer
            .render(Some(&summary()), Some(&spending()), &request)
            .await;
        assert_eq!(report.text.as_deref(), Some("Tip one\nTip two"));
        assert_eq!(report.html.as_deref(), Some("Tip one<br>Tip two"));
        assert_eq!(
            report.pdf.as_ref().map(|a| a.file_name.as_str()),
            Some("savings_insights_german.pdf")
        );
        assert!(report.audio.is_some());
        assert_eq!(speech.calls(), 1);
        assert!(report.notices.is_empty());
        cleanup(&report);
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_notices() {
        let renderer = renderer(MockBackend::failing("401 Unauthorized"), MockSpeech::new());
        let report = renderer
            .render(Some(&summary()), Some(&spending()), &InsightRequest::default())
            .await;

        assert!(report.text.is_none());
        assert_eq!(report.notices.len(), 2);
        assert_eq!(report.notices[0].level, NoticeLevel::Error);
        assert!(report.notices[0]
            .message
            .starts_with("Failed to generate insights: "));
        assert!(report.notices[0].message.contains("401 Unauthorized"));
        assert_eq!(report.notices[1].message, INSIGHT_ERROR_HINT);
    }

    #[tokio::test]
    async fn test_audio_failure_keeps_text() {
        let renderer = renderer(MockBackend::new(), MockSpeech::failing());
        let request = InsightRequest {
            audio: true,
            pdf: true,
            ..InsightRequest::default()
        };
        let report = renderer
            .render(Some(&summary()), Some(&spending()), &request)
            .await;

        assert!(report.text.is_some());
        assert!(report.pdf.is_some());
        assert!(report.audio.is_none());
        assert_eq!(report.notices.len(), 1);
        assert!(report.notices[0].message.starts_with("Failed to generate audio"));
        cleanup(&report);
    }

    #[test]
    fn test_request_defaults_from_json() {
        let request: InsightRequest = serde_json::from_str(r#"{"language": "es"}"#).unwrap();
        assert_eq!(request.language, Language::Spanish);
        assert_eq!(request.prompt, PromptId::SavingsTips);
        assert!(!request.pdf && !request.audio);
    }
}
