//! Integration tests for finboard-core
//!
//! These tests run the dashboard against a real HTTP analysis service and a
//! real HTTP inference endpoint, both served locally by axum.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::State, routing::get, routing::post, Json, Router};
use serde_json::{json, Value};

use finboard_core::{
    DashboardConfig, DashboardSession, Endpoints, HttpFetcher, InsightClient, InsightRenderer,
    InsightRequest, Language, MockSpeech, NoticeLevel, PromptLibrary,
};

#[derive(Default)]
struct ServiceState {
    summary_hits: AtomicUsize,
    spending_hits: AtomicUsize,
    summary_delay: Option<Duration>,
    last_prompt: Mutex<Option<Value>>,
}

/// Analysis service plus a text-generation endpoint on one ephemeral port
async fn start_service(summary_delay: Option<Duration>) -> (String, Arc<ServiceState>) {
    let state = Arc::new(ServiceState {
        summary_delay,
        ..ServiceState::default()
    });

    async fn summary(State(state): State<Arc<ServiceState>>) -> Json<Value> {
        state.summary_hits.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = state.summary_delay {
            tokio::time::sleep(delay).await;
        }
        Json(json!({"totalIncome": 3000, "totalExpenses": 2000, "savings": 1000}))
    }

    async fn spending(State(state): State<Arc<ServiceState>>) -> Json<Value> {
        state.spending_hits.fetch_add(1, Ordering::SeqCst);
        Json(json!({"Rent": 1000, "Food": 500, "Other": 500}))
    }

    async fn generate(
        State(state): State<Arc<ServiceState>>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        *state.last_prompt.lock().unwrap() = Some(body);
        Json(json!([{ "generated_text": "1. Cocina en casa.\n2. Revisa tus suscripciones." }]))
    }

    let app = Router::new()
        .route("/analysis/total-summary", get(summary))
        .route("/analysis/spending-by-category", get(spending))
        .route("/models/test/model", post(generate))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), state)
}

// =============================================================================
// Overview
// =============================================================================

#[tokio::test]
async fn test_overview_renders_metrics_and_chart() {
    let (url, state) = start_service(None).await;
    let fetcher = HttpFetcher::new();
    let endpoints = Endpoints::new(&url);
    let mut session = DashboardSession::new();

    let view = session.overview(&fetcher, &endpoints).await;
    assert!(view.notices.is_empty());

    let metrics = view.metrics.expect("metrics rendered");
    assert_eq!(metrics.income.display, "€3,000.00");
    assert_eq!(metrics.expenses.display, "€2,000.00");
    assert_eq!(metrics.savings.display, "€1,000.00");

    let chart = view.chart.expect("chart rendered");
    let bars: Vec<(&str, f64)> = chart
        .bars
        .iter()
        .map(|b| (b.category.as_str(), b.amount))
        .collect();
    assert_eq!(bars, vec![("Rent", 1000.0), ("Food", 500.0), ("Other", 500.0)]);

    // Second render inside the TTL is served from cache
    session.overview(&fetcher, &endpoints).await;
    assert_eq!(state.summary_hits.load(Ordering::SeqCst), 1);
    assert_eq!(state.spending_hits.load(Ordering::SeqCst), 1);

    // Refresh goes back to the service
    session.refresh(&fetcher, &endpoints).await;
    assert_eq!(state.summary_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_timeout_shows_one_error_and_is_not_cached() {
    let (url, state) = start_service(Some(Duration::from_secs(2))).await;
    let fetcher = HttpFetcher::with_timeout(Duration::from_millis(200));
    let endpoints = Endpoints::new(&url);
    let mut session = DashboardSession::new();

    let view = session.overview(&fetcher, &endpoints).await;
    assert!(view.metrics.is_none());
    assert!(view.chart.is_some());
    assert_eq!(view.notices.len(), 1);
    assert_eq!(view.notices[0].level, NoticeLevel::Error);
    assert!(view.notices[0].message.starts_with("Error fetching data:"));

    // The failed key is retried on the next render
    session.overview(&fetcher, &endpoints).await;
    assert_eq!(state.summary_hits.load(Ordering::SeqCst), 2);
    assert_eq!(state.spending_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unreachable_service() {
    let fetcher = HttpFetcher::with_timeout(Duration::from_secs(2));
    let endpoints = Endpoints::new("http://127.0.0.1:9");
    let mut session = DashboardSession::new();

    let view = session.overview(&fetcher, &endpoints).await;
    assert!(view.metrics.is_none());
    assert!(view.chart.is_none());
    assert_eq!(view.notices.len(), 2);
    assert!(session.cache.is_empty());
}

// =============================================================================
// Insights
// =============================================================================

#[tokio::test]
async fn test_missing_credential_disables_insights() {
    let config = DashboardConfig::default();
    assert!(config.inference_token.is_none());

    let renderer = InsightRenderer::new(
        InsightClient::from_config(&config),
        Arc::new(MockSpeech::new()),
        PromptLibrary::embedded_only(),
    );
    let status = renderer.status();
    assert!(!status.enabled);
    assert_eq!(status.notices.len(), 1);
    assert_eq!(status.notices[0].level, NoticeLevel::Warning);
    assert_eq!(
        status.notices[0].message,
        "Please configure your HuggingFace API token to enable AI features"
    );
}

#[tokio::test]
async fn test_insights_end_to_end() {
    let (url, state) = start_service(None).await;
    let mut config = DashboardConfig::default().with_api_base(&url);
    config.inference_token = Some("hf_test".into());
    config.inference_host = url.clone();
    config.model = "test/model".into();

    let fetcher = HttpFetcher::new();
    let endpoints = Endpoints::new(&config.api_base);
    let mut session = DashboardSession::new();
    let data = session.load(&fetcher, &endpoints).await;

    let renderer = InsightRenderer::new(
        InsightClient::from_config(&config),
        Arc::new(MockSpeech::new()),
        PromptLibrary::embedded_only(),
    );
    let request = InsightRequest {
        language: Language::Spanish,
        pdf: true,
        audio: true,
        ..InsightRequest::default()
    };
    let report = renderer
        .render(data.summary.as_ref(), data.spending.as_ref(), &request)
        .await;

    assert!(report.notices.is_empty(), "{:?}", report.notices);
    assert_eq!(
        report.html.as_deref(),
        Some("1. Cocina en casa.<br>2. Revisa tus suscripciones.")
    );

    let sent = state.last_prompt.lock().unwrap().clone().unwrap();
    let prompt = sent["inputs"].as_str().unwrap();
    assert!(prompt.contains("advice in Spanish"));
    assert!(prompt.contains("Rent (€1,000.00), Food (€500.00), Other (€500.00)"));
    assert_eq!(sent["parameters"]["max_new_tokens"], 300);

    let pdf = report.pdf.expect("pdf generated");
    assert_eq!(pdf.file_name, "savings_insights_spanish.pdf");
    assert!(std::fs::read(&pdf.path).unwrap().starts_with(b"%PDF"));

    let audio = report.audio.expect("audio generated");
    assert_eq!(audio.file_name, "savings_insights_es.mp3");

    let _ = std::fs::remove_file(&pdf.path);
    let _ = std::fs::remove_file(&audio.path);
}
