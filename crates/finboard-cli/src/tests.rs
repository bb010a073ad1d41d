//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use clap::Parser;
use finboard_core::test_utils::MockAnalysisServer;
use finboard_core::artifacts::{MP3_MIME, PDF_MIME};
use finboard_core::{
    Artifact, DashboardConfig, ForecastSettings, InferenceBackend, InsightReport, Language,
    Notice, NoticeLevel, OverviewView,
};
use serde_json::json;

use crate::cli::{Cli, Commands};
use crate::commands::{self, truncate};

fn config_for(server: &MockAnalysisServer) -> DashboardConfig {
    DashboardConfig::default().with_api_base(&server.url())
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_insights_args() {
    let cli = Cli::try_parse_from([
        "finboard",
        "insights",
        "--language",
        "es",
        "--pdf",
        "advice.pdf",
    ])
    .unwrap();
    match cli.command {
        Commands::Insights {
            language,
            full,
            pdf,
            audio,
        } => {
            assert_eq!(language, Language::Spanish);
            assert!(!full);
            assert_eq!(pdf.unwrap().to_str(), Some("advice.pdf"));
            assert!(audio.is_none());
        }
        _ => panic!("expected insights"),
    }
}

#[test]
fn test_parse_rejects_unknown_language() {
    assert!(Cli::try_parse_from(["finboard", "insights", "--language", "Klingon"]).is_err());
}

#[test]
fn test_parse_budget_overrides() {
    let cli = Cli::try_parse_from([
        "finboard", "budgets", "--set", "Food=400", "--set", "Eating Out=150.5",
    ])
    .unwrap();
    match cli.command {
        Commands::Budgets { set } => {
            assert_eq!(
                set,
                vec![("Food".to_string(), 400.0), ("Eating Out".to_string(), 150.5)]
            );
        }
        _ => panic!("expected budgets"),
    }

    assert!(Cli::try_parse_from(["finboard", "budgets", "--set", "Food"]).is_err());
}

#[test]
fn test_parse_global_flags() {
    let cli = Cli::try_parse_from([
        "finboard",
        "forecast",
        "--months",
        "12",
        "--api",
        "http://analysis:9000",
        "--json",
    ])
    .unwrap();
    assert_eq!(cli.api.as_deref(), Some("http://analysis:9000"));
    assert!(cli.json);
    match cli.command {
        Commands::Forecast {
            months,
            income_growth,
            ..
        } => {
            assert_eq!(months, 12);
            assert_eq!(income_growth, 0.5);
        }
        _ => panic!("expected forecast"),
    }
}

// ========== Config Tests ==========

#[test]
fn test_load_config_with_api_override() {
    let dir = tempfile::tempdir().unwrap();
    let secrets = dir.path().join("secrets.toml");
    std::fs::write(
        &secrets,
        "analysis_api = \"http://from-file:8080\"\n[inference]\nbackend = \"mock\"\n",
    )
    .unwrap();

    let config = commands::load_config(Some(&secrets), Some("http://from-flag:8080")).unwrap();
    assert_eq!(config.api_base, "http://from-flag:8080");
    assert_eq!(config.secrets_path.as_deref(), Some(secrets.as_path()));
}

#[test]
fn test_load_config_rejects_bad_secrets() {
    let dir = tempfile::tempdir().unwrap();
    let secrets = dir.path().join("secrets.toml");
    std::fs::write(&secrets, "analysis_api = [").unwrap();

    let err = commands::load_config(Some(&secrets), None).unwrap_err();
    assert!(err.to_string().contains("Failed to load secrets"));
}

#[test]
fn test_render_config_masks_token() {
    let mut config = DashboardConfig::default();
    config.inference_token = Some("hf_supersecret".into());
    let out = commands::render_config(&config);
    assert!(out.contains("hf_***"));
    assert!(!out.contains("supersecret"));

    let out = commands::render_config(&DashboardConfig::default());
    assert!(out.contains("(not set)"));
    assert!(out.contains("AI insights disabled"));
}

// ========== Overview Tests ==========

#[tokio::test]
async fn test_overview_rendering() {
    let server = MockAnalysisServer::start().await;
    let data = commands::load_data(&config_for(&server)).await;
    let out = commands::render_overview(&OverviewView::from_data(&data));

    assert!(out.contains("€3,000.00"));
    assert!(out.contains("33.3%"));
    assert!(out.contains("Spending by Category"));
    let rent = out.find("Rent").unwrap();
    let food = out.find("Food").unwrap();
    assert!(rent < food);
    assert!(out.contains(&"█".repeat(30)));
}

#[tokio::test]
async fn test_overview_skips_missing_sections() {
    let server = MockAnalysisServer::start().await;
    server.set_failing(true);
    let data = commands::load_data(&config_for(&server)).await;
    let view = OverviewView::from_data(&data);
    let out = commands::render_overview(&view);

    assert!(!out.contains("Total Income"));
    assert!(!out.contains("Spending by Category"));
    assert_eq!(view.notices.len(), 2);
}

#[tokio::test]
async fn test_cmd_overview() {
    let server = MockAnalysisServer::start().await;
    assert!(commands::cmd_overview(&config_for(&server), false).await.is_ok());
    assert!(commands::cmd_overview(&config_for(&server), true).await.is_ok());
}

// ========== Planning Tests ==========

#[tokio::test]
async fn test_cmd_health() {
    let server = MockAnalysisServer::start().await;
    let result = commands::cmd_health(&config_for(&server), Some(12000.0), Some(300.0), false).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cmd_health_without_income() {
    let server = MockAnalysisServer::start_with(
        json!({"totalIncome": 0, "totalExpenses": 100, "savings": -100}),
        json!({}),
    )
    .await;
    assert!(commands::cmd_health(&config_for(&server), None, None, false)
        .await
        .is_err());
}

#[tokio::test]
async fn test_cmd_forecast_needs_summary() {
    let server = MockAnalysisServer::start().await;
    server.set_failing(true);
    let err = commands::cmd_forecast(&config_for(&server), &ForecastSettings::default(), false)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Please load financial data in the Overview tab first"
    );
}

#[tokio::test]
async fn test_cmd_forecast_rejects_long_period() {
    let server = MockAnalysisServer::start().await;
    let settings = ForecastSettings {
        months: 36,
        ..ForecastSettings::default()
    };
    assert!(commands::cmd_forecast(&config_for(&server), &settings, false)
        .await
        .is_err());
    assert_eq!(server.summary_hits(), 0);
}

#[test]
fn test_render_budgets() {
    let spending = finboard_core::SpendingByCategory::from_pairs([
        ("Rent", 1000.0),
        ("Food", 500.0),
    ])
    .unwrap();
    let mut overrides = finboard_core::BudgetOverrides::new();
    overrides.set("Food", 400.0).unwrap();
    let report = finboard_core::budget_report(&spending, &overrides);

    let out = commands::render_budgets(&report);
    assert!(out.contains("€1,200.00"));
    assert!(out.contains("€400.00  ⚠️"));
    assert!(out.contains("Over budget in: Food"));
}

#[tokio::test]
async fn test_cmd_budgets_rejects_negative_override() {
    let server = MockAnalysisServer::start().await;
    let result =
        commands::cmd_budgets(&config_for(&server), &[("Food".to_string(), -5.0)], false).await;
    assert!(result.is_err());
}

// ========== Insights Tests ==========

#[tokio::test]
async fn test_cmd_insights_saves_pdf() {
    let server = MockAnalysisServer::start().await;
    let mut config = config_for(&server);
    config.backend = InferenceBackend::Mock;

    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("advice.pdf");
    commands::cmd_insights(&config, Language::German, false, Some(&pdf), None)
        .await
        .unwrap();

    let bytes = std::fs::read(&pdf).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_save_artifacts_failures_are_independent() {
    let pdf = Artifact::write_temp("advice.pdf", PDF_MIME, b"%PDF-1.7".to_vec()).unwrap();
    let audio = Artifact::write_temp("advice.mp3", MP3_MIME, b"ID3".to_vec()).unwrap();
    let temp_paths = [pdf.path.clone(), audio.path.clone()];
    let report = InsightReport {
        language: Language::English,
        text: Some("Cook at home.".into()),
        html: None,
        pdf: Some(pdf),
        audio: Some(audio),
        notices: vec![],
    };

    let dir = tempfile::tempdir().unwrap();
    let pdf_dest = dir.path().join("missing").join("advice.pdf");
    let audio_dest = dir.path().join("advice.mp3");
    let notices = commands::save_artifacts(&report, Some(&pdf_dest), Some(&audio_dest));

    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].message.starts_with("Failed to save PDF:"));
    assert_eq!(std::fs::read(&audio_dest).unwrap(), b"ID3");
    assert!(!pdf_dest.exists());
    assert!(temp_paths.iter().all(|p| !p.exists()));
}

#[tokio::test]
async fn test_cmd_insights_unwritable_pdf_destination() {
    let server = MockAnalysisServer::start().await;
    let mut config = config_for(&server);
    config.backend = InferenceBackend::Mock;

    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("missing").join("advice.pdf");
    let result = commands::cmd_insights(&config, Language::English, false, Some(&pdf), None).await;
    assert!(result.is_ok());
    assert!(!pdf.exists());
}

#[tokio::test]
async fn test_cmd_insights_disabled_without_token() {
    let server = MockAnalysisServer::start().await;
    let mut config = config_for(&server);
    config.inference_token = None;
    config.backend = InferenceBackend::HuggingFace;

    let result = commands::cmd_insights(&config, Language::English, false, None, None).await;
    assert!(result.is_ok());
    assert_eq!(server.summary_hits(), 0);
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("Groceries", 20), "Groceries");
    assert_eq!(truncate("Entertainment and leisure", 10), "Enterta...");
    assert_eq!(truncate("Café Übersee", 6), "Caf...");
}

#[test]
fn test_format_notice() {
    assert_eq!(
        commands::format_notice(&Notice::error("Error fetching data: timeout")),
        "   ❌ Error fetching data: timeout"
    );
}
