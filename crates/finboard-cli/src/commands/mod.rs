//! CLI command implementations
//!
//! Commands are organized by dashboard tab:
//! - `dashboard` - Overview (metrics and spending chart)
//! - `insights` - AI savings advice with PDF/MP3 export
//! - `planning` - Health check, forecast and budgets
//! - `config` - Effective configuration
//! - `serve` - Web server command

pub mod config;
pub mod dashboard;
pub mod insights;
pub mod planning;
pub mod serve;

pub use config::*;
pub use dashboard::*;
pub use insights::*;
pub use planning::*;
pub use serve::*;

use std::path::Path;

use anyhow::{Context, Result};
use finboard_core::{
    DashboardConfig, DashboardData, DashboardSession, Endpoints, HttpFetcher, Notice, NoticeLevel,
};

/// Load configuration from the secrets file and environment, then apply `--api`
pub fn load_config(secrets: Option<&Path>, api: Option<&str>) -> Result<DashboardConfig> {
    let config = match secrets {
        Some(path) => DashboardConfig::load_from(Some(path))
            .with_context(|| format!("Failed to load secrets from {}", path.display()))?,
        None => DashboardConfig::load().context("Failed to load configuration")?,
    };
    Ok(match api {
        Some(api) => config.with_api_base(api),
        None => config,
    })
}

/// Fetch both analysis payloads once
pub async fn load_data(config: &DashboardConfig) -> DashboardData {
    let fetcher = HttpFetcher::with_timeout(config.fetch_timeout);
    let endpoints = Endpoints::new(&config.api_base);
    let mut session = DashboardSession::new();
    session.load(&fetcher, &endpoints).await
}

pub fn format_notice(notice: &Notice) -> String {
    let icon = match notice.level {
        NoticeLevel::Error => "❌",
        NoticeLevel::Warning => "⚠️ ",
        NoticeLevel::Info => "ℹ️ ",
        NoticeLevel::Success => "✅",
    };
    format!("   {} {}", icon, notice.message)
}

pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        println!("{}", format_notice(notice));
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Truncate a string to `max` characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
