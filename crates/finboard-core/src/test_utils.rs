//! Test utilities for finboard-core
//!
//! A mock analysis service that serves the two summary endpoints over real
//! HTTP, and an in-memory `Fetcher` for tests that don't need a socket.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::error::{Error, Result};
use crate::fetch::{Fetcher, SPENDING_BY_CATEGORY_PATH, TOTAL_SUMMARY_PATH};

/// `{"totalIncome":3000,"totalExpenses":2000,"savings":1000}`
pub fn sample_summary() -> Value {
    json!({"totalIncome": 3000, "totalExpenses": 2000, "savings": 1000})
}

/// `{"Rent":1000,"Food":500,"Other":500}`
pub fn sample_spending() -> Value {
    json!({"Rent": 1000, "Food": 500, "Other": 500})
}

struct MockState {
    summary: RwLock<Value>,
    spending: RwLock<Value>,
    summary_hits: AtomicUsize,
    spending_hits: AtomicUsize,
    failing: AtomicBool,
}

/// Mock analysis service for testing and development
pub struct MockAnalysisServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockAnalysisServer {
    /// Start on an available port, serving the sample payloads
    pub async fn start() -> Self {
        Self::start_with(sample_summary(), sample_spending()).await
    }

    pub async fn start_with(summary: Value, spending: Value) -> Self {
        let state = Arc::new(MockState {
            summary: RwLock::new(summary),
            spending: RwLock::new(spending),
            summary_hits: AtomicUsize::new(0),
            spending_hits: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        });

        let app = Router::new()
            .route(TOTAL_SUMMARY_PATH, get(handle_summary))
            .route(SPENDING_BY_CATEGORY_PATH, get(handle_spending))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_summary(&self, value: Value) {
        *self.state.summary.write().unwrap() = value;
    }

    pub fn set_spending(&self, value: Value) {
        *self.state.spending.write().unwrap() = value;
    }

    /// Answer 503 on both endpoints while set
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    pub fn summary_hits(&self) -> usize {
        self.state.summary_hits.load(Ordering::SeqCst)
    }

    pub fn spending_hits(&self) -> usize {
        self.state.spending_hits.load(Ordering::SeqCst)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockAnalysisServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn respond(state: &MockState, payload: &RwLock<Value>) -> Response {
    if state.failing.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "analysis unavailable").into_response();
    }
    let value = payload.read().unwrap().clone();
    Json(value).into_response()
}

async fn handle_summary(State(state): State<Arc<MockState>>) -> Response {
    state.summary_hits.fetch_add(1, Ordering::SeqCst);
    respond(&state, &state.summary).await
}

async fn handle_spending(State(state): State<Arc<MockState>>) -> Response {
    state.spending_hits.fetch_add(1, Ordering::SeqCst);
    respond(&state, &state.spending).await
}

/// In-memory fetcher keyed by full URL
///
/// Unknown URLs fail like a connection error would.
#[derive(Default)]
pub struct MockFetcher {
    responses: HashMap<String, Value>,
    calls: Mutex<HashMap<String, usize>>,
    failing: AtomicBool,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url: &str, value: Value) -> Self {
        self.responses.insert(url.to_string(), value);
        self
    }

    /// Fetcher answering the sample payloads under `base`
    pub fn with_samples(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self::new()
            .with_response(&format!("{}{}", base, TOTAL_SUMMARY_PATH), sample_summary())
            .with_response(
                &format!("{}{}", base, SPENDING_BY_CATEGORY_PATH),
                sample_spending(),
            )
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Value> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;

        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::InvalidData(format!("connection refused: {}", url)));
        }
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| Error::NotFound(url.to_string()))
    }
}
