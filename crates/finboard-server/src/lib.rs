//! Finboard Web Server
//!
//! Axum-based REST API for the finboard dashboard. Each dashboard tab is an
//! idempotent handler; the response cache and the ledger live in a session
//! picked by the `x-session-id` header.
//!
//! Requests without the header all land in the shared `default` session,
//! ledger included. Clients that need isolation call `POST /api/session`
//! and send the returned id on every request.
//!
//! Security features:
//! - Restrictive CORS policy
//! - Security headers on every response
//! - Sanitized error responses

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use finboard_core::{
    DashboardConfig, Endpoints, Error as CoreError, Fetcher, HttpFetcher, InsightBackend,
    InsightRenderer, Notices,
};

mod handlers;
mod sessions;

pub use sessions::{SessionStore, DEFAULT_SESSION_ID, SESSION_HEADER, SESSION_TIMEOUT};

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Inactivity after which a session is dropped
    pub session_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            session_timeout: SESSION_TIMEOUT,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub config: DashboardConfig,
    pub endpoints: Endpoints,
    pub fetcher: Arc<dyn Fetcher>,
    pub insights: InsightRenderer,
    pub sessions: SessionStore,
}

impl AppState {
    /// Live fetcher and insight backend built from `config`
    pub fn from_config(config: DashboardConfig, server: &ServerConfig) -> Self {
        let fetcher = Arc::new(HttpFetcher::with_timeout(config.fetch_timeout));
        let insights = InsightRenderer::from_config(&config);
        Self::new(config, fetcher, insights, server)
    }

    pub fn new(
        config: DashboardConfig,
        fetcher: Arc<dyn Fetcher>,
        insights: InsightRenderer,
        server: &ServerConfig,
    ) -> Self {
        Self {
            endpoints: Endpoints::new(&config.api_base),
            config,
            fetcher,
            insights,
            sessions: SessionStore::with_timeout(server.session_timeout),
        }
    }
}

/// Generic success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(
    state: Arc<AppState>,
    static_dir: Option<&str>,
    config: &ServerConfig,
) -> Router {
    let api_routes = Router::new()
        // Sessions
        .route(
            "/session",
            post(handlers::create_session).delete(handlers::delete_session),
        )
        // Overview tab
        .route("/overview", get(handlers::get_overview))
        .route("/spending", get(handlers::get_spending))
        .route("/refresh", post(handlers::refresh))
        // AI insights tab
        .route("/insights/status", get(handlers::get_insight_status))
        .route("/insights", post(handlers::generate_insights))
        // Planning tabs
        .route(
            "/budgets",
            get(handlers::get_budgets).post(handlers::set_budgets),
        )
        .route("/forecast", get(handlers::get_forecast))
        .route("/health", get(handlers::get_health))
        // Ledger
        .route("/goals", get(handlers::list_goals).post(handlers::add_goal))
        .route("/debts", get(handlers::list_debts).post(handlers::add_debt))
        .route("/debts/plan", get(handlers::get_payoff_plan))
        .route(
            "/investments",
            get(handlers::list_investments).post(handlers::add_investment),
        )
        .route("/investments/summary", get(handlers::get_portfolio))
        .route("/assets", get(handlers::list_assets).post(handlers::add_asset))
        .route(
            "/liabilities",
            get(handlers::list_liabilities).post(handlers::add_liability),
        )
        .route("/net-worth", get(handlers::get_net_worth));

    let session_header = HeaderName::from_static(SESSION_HEADER);
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];
    let headers = [header::CONTENT_TYPE, header::AUTHORIZATION, session_header];

    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new().allow_methods(methods).allow_headers(headers)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(headers)
    };

    // CSP: same-origin scripts, inline styles, data: images for charts
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' blob: data:; media-src 'self' blob: data:; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    dashboard: DashboardConfig,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(dashboard, &config));

    info!(api = %state.endpoints.base(), "Analysis service");
    check_ai_connection(&state.insights).await;

    let app = create_router(state, static_dir, &config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log inference backend status
async fn check_ai_connection(insights: &InsightRenderer) {
    match insights.client() {
        Some(client) => {
            if client.health_check().await {
                info!(
                    "✅ Inference backend reachable: {} (model: {})",
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "⚠️  Inference backend configured but not responding: {} (model: {})",
                    client.host(),
                    client.model()
                );
            }
        }
        None => {
            info!("ℹ️  AI insights disabled (set HUGGINGFACE_API_TOKEN to enable)");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
    notices: Notices,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
            notices: Notices::new(),
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
            notices: Notices::new(),
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
            notices: Notices::new(),
        }
    }

    pub fn unprocessable(msg: &str) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: msg.to_string(),
            internal: None,
            notices: Notices::new(),
        }
    }

    /// Map a core error to the status the client should see
    ///
    /// User input problems keep their message; everything else is a
    /// sanitized 500.
    pub fn from_core(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::bad_request(&msg),
            CoreError::NotFound(msg) => Self::not_found(&msg),
            CoreError::InvalidData(msg) => Self::unprocessable(&msg),
            other => Self::from(other),
        }
    }

    /// Attach the notices collected before the failure
    pub fn with_notices(mut self, notices: Notices) -> Self {
        self.notices = notices;
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let mut body = serde_json::json!({
            "error": self.message
        });
        if !self.notices.is_empty() {
            body["notices"] = serde_json::json!(self.notices);
        }
        let body = Json(body);

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "An internal error occurred".to_string(),
            internal: Some(err),
            notices: Notices::new(),
        }
    }
}
