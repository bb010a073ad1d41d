//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use finboard_core::budgets::parse_budget_assignment;
use finboard_core::Language;

/// finboard - Personal finance dashboard with AI savings advice
#[derive(Parser)]
#[command(name = "finboard")]
#[command(about = "Personal finance dashboard for a financial analysis service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Analysis service base URL (overrides secrets file and FINBOARD_ANALYSIS_API)
    #[arg(long, global = true)]
    pub api: Option<String>,

    /// Secrets file (default: <config dir>/finboard/secrets.toml, or FINBOARD_SECRETS)
    #[arg(long, global = true)]
    pub secrets: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show income, expenses, savings and spending by category
    Overview,

    /// Generate AI savings advice
    Insights {
        /// Language: English, Spanish, French, German (or en, es, fr, de)
        #[arg(short, long, default_value = "English")]
        language: Language,

        /// Ask for the full breakdown instead of three short tips
        #[arg(long)]
        full: bool,

        /// Save the advice as a PDF report at this path
        #[arg(long)]
        pdf: Option<PathBuf>,

        /// Save the advice as MP3 audio at this path
        #[arg(long)]
        audio: Option<PathBuf>,
    },

    /// Score savings rate, expense ratio and debt load
    Health {
        /// Emergency fund (default: three months of expenses)
        #[arg(long)]
        emergency_fund: Option<f64>,

        /// Total monthly debt payments
        #[arg(long)]
        debt_payments: Option<f64>,
    },

    /// Project cash flow with monthly growth rates
    Forecast {
        /// Months to project (1-24)
        #[arg(short, long, default_value = "6")]
        months: u32,

        /// Monthly income growth in percent
        #[arg(long, default_value = "0.5", allow_negative_numbers = true)]
        income_growth: f64,

        /// Monthly expense growth in percent
        #[arg(long, default_value = "0.3", allow_negative_numbers = true)]
        expense_growth: f64,
    },

    /// Compare spending with per-category budgets
    Budgets {
        /// Override a budget, e.g. --set Food=400 (repeatable)
        #[arg(long = "set", value_name = "CATEGORY=AMOUNT", value_parser = parse_budget_assignment)]
        set: Vec<(String, f64)>,
    },

    /// Show the effective configuration
    Config,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Allowed CORS origin (repeatable; default same-origin only)
        #[arg(long = "allow-origin")]
        allowed_origins: Vec<String>,
    },
}
