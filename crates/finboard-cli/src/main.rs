//! finboard CLI - Personal finance dashboard
//!
//! Usage:
//!   finboard overview                   Headline metrics and spending chart
//!   finboard insights --language es     AI savings advice
//!   finboard health --emergency-fund N  Financial health score
//!   finboard serve --port 3000          Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.secrets.as_deref(), cli.api.as_deref())?;

    match cli.command {
        Commands::Overview => commands::cmd_overview(&config, cli.json).await,
        Commands::Insights {
            language,
            full,
            pdf,
            audio,
        } => {
            commands::cmd_insights(&config, language, full, pdf.as_deref(), audio.as_deref())
                .await
        }
        Commands::Health {
            emergency_fund,
            debt_payments,
        } => commands::cmd_health(&config, emergency_fund, debt_payments, cli.json).await,
        Commands::Forecast {
            months,
            income_growth,
            expense_growth,
        } => {
            let settings = finboard_core::ForecastSettings {
                months,
                income_growth,
                expense_growth,
            };
            commands::cmd_forecast(&config, &settings, cli.json).await
        }
        Commands::Budgets { set } => commands::cmd_budgets(&config, &set, cli.json).await,
        Commands::Config => commands::cmd_config(&config),
        Commands::Serve {
            port,
            host,
            static_dir,
            allowed_origins,
        } => commands::cmd_serve(config, &host, port, static_dir.as_deref(), allowed_origins).await,
    }
}
