//! Finboard Core Library
//!
//! Shared functionality for the finboard personal finance dashboard:
//! - Analysis service fetcher with a time-to-live response cache
//! - Prompt library for savings advice
//! - Pluggable text-generation backends (hosted inference, OpenAI-compatible)
//! - PDF and speech renditions of generated advice
//! - Session ledger (goals, debts, investments, assets, liabilities)
//! - Health check, cash-flow forecast and budget calculators

pub mod ai;
pub mod artifacts;
pub mod budgets;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod forecast;
pub mod health;
pub mod insights;
pub mod ledger;
pub mod models;
pub mod prompts;
pub mod session;

/// Test utilities including a mock analysis service
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{HuggingFaceBackend, InsightBackend, InsightClient, MockBackend, OpenAICompatibleBackend};
pub use artifacts::{Artifact, GoogleTranslateTts, MockSpeech, PdfReport, SpeechSynthesizer};
pub use budgets::{budget_report, BudgetOverrides, BudgetReport, BudgetRow};
pub use cache::{Clock, ManualClock, ResponseCache, SystemClock};
pub use config::{DashboardConfig, InferenceBackend};
pub use dashboard::{load_dashboard, DashboardData, OverviewMetrics, OverviewView, SpendingChart};
pub use error::{Error, Result};
pub use fetch::{Endpoints, Fetcher, HttpFetcher};
pub use forecast::{forecast, Forecast, ForecastRow, ForecastSettings};
pub use health::{health_check, HealthReport, HealthTier};
pub use insights::{
    generate_insight, to_display_html, InsightReport, InsightRenderer, InsightRequest,
    InsightStatus,
};
pub use ledger::{
    Asset, Collection, Debt, Goal, GoalProgress, Holding, Investment, Ledger, Liability, NetWorth,
    PayoffRow, PayoffStrategy, PortfolioSummary,
};
pub use models::{
    format_eur, Language, Notice, NoticeLevel, Notices, SpendingByCategory, SummaryPayload,
};
pub use prompts::{build_prompt, GenerationParams, InsightPrompt, Prompt, PromptId, PromptLibrary};
pub use session::DashboardSession;
