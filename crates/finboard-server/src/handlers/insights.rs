//! AI insights tab handlers

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use base64::Engine;
use serde::Serialize;
use tracing::debug;

use finboard_core::{Artifact, InsightRequest, InsightStatus, Language, Notices};

use super::current_session;
use crate::{AppError, AppState};

/// A generated file inlined in the response
#[derive(Debug, Serialize)]
pub struct ArtifactPayload {
    pub file_name: String,
    pub mime: &'static str,
    pub size: usize,
    /// Base64 of the file contents
    pub data: String,
}

impl ArtifactPayload {
    /// Inline the artifact and remove its temporary file
    fn take(artifact: Artifact) -> Self {
        if let Err(e) = std::fs::remove_file(&artifact.path) {
            debug!(path = %artifact.path.display(), error = %e, "Could not remove artifact file");
        }
        Self {
            size: artifact.bytes.len(),
            data: base64::engine::general_purpose::STANDARD.encode(&artifact.bytes),
            file_name: artifact.file_name,
            mime: artifact.mime,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InsightResponse {
    pub language: Language,
    pub text: Option<String>,
    pub html: Option<String>,
    pub pdf: Option<ArtifactPayload>,
    pub audio: Option<ArtifactPayload>,
    pub notices: Notices,
}

/// GET /api/insights/status - Whether insights can be generated
pub async fn get_insight_status(State(state): State<Arc<AppState>>) -> Json<InsightStatus> {
    Json(state.insights.status())
}

/// POST /api/insights - Generate savings advice
///
/// Re-posting re-runs the whole generation. Failures are reported in
/// `notices`; the request itself only fails on a bad body or session id.
pub async fn generate_insights(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<InsightRequest>,
) -> Result<Json<InsightResponse>, AppError> {
    let session = current_session(&state, &headers).await?;
    let data = {
        let mut session = session.lock().await;
        session.load(state.fetcher.as_ref(), &state.endpoints).await
    };

    let report = state
        .insights
        .render(data.summary.as_ref(), data.spending.as_ref(), &request)
        .await;

    let mut notices = data.notices;
    notices.extend(report.notices);

    Ok(Json(InsightResponse {
        language: report.language,
        text: report.text,
        html: report.html,
        pdf: report.pdf.map(ArtifactPayload::take),
        audio: report.audio.map(ArtifactPayload::take),
        notices,
    }))
}
