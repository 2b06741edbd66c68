//! Bookkeeper CLI - Personal finance dashboard
//!
//! Usage:
//!   bookkeeper dashboard --month 4 --year 2024   Fiscal month overview
//!   bookkeeper transactions --unclassified       Transactions without category
//!   bookkeeper categorize 42 3                   Move transaction 42 to category 3
//!   bookkeeper import --file statement.csv       Upload a bank statement
//!   bookkeeper --mock dashboard                  Demo data, no server needed

mod cli;
mod commands;


use anyhow::{Context, Result};
use bookkeeper_core::{ApiClient, ClientConfig, MonthCursor};
use clap::Parser;
use tracing::debug;
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

    let config = load_config(&cli)?;
    let api = if cli.mock {
        debug!("Using in-memory demo backend");
        ApiClient::mock()
    } else {
        ApiClient::from_config(&config).context("Failed to create API client")?
    };

    match cli.command {
        Commands::Dashboard {
            month,
            year,
            offset,
            json,
        } => {
            let cursor = commands::resolve_month(month, year)?.shift(offset);
            commands::cmd_dashboard(api, cursor, config.income_category_id, json).await
        }
        Commands::Categories => commands::cmd_categories(&api).await,
        Commands::Transactions {
            from,
            to,
            category,
            unclassified,
            hidden,
            limit,
        } => {
            let (from, to) = commands::resolve_range(
                &api,
                from.as_deref(),
                to.as_deref(),
                config.income_category_id,
            )
            .await?;
            let filter = if let Some(id) = category {
                commands::TransactionFilter::Category(id)
            } else if unclassified {
                commands::TransactionFilter::Unclassified
            } else if hidden {
                commands::TransactionFilter::Hidden
            } else {
                commands::TransactionFilter::All
            };
            commands::cmd_transactions_list(&api, from, to, filter, limit).await
        }
        Commands::Show { id } => commands::cmd_show(&api, id).await,
        Commands::Categorize { id, category_id } => {
            commands::cmd_categorize(&api, id, category_id).await
        }
        Commands::Hide { id } => commands::cmd_set_hidden(&api, id, true).await,
        Commands::Unhide { id } => commands::cmd_set_hidden(&api, id, false).await,
        Commands::Import { file } => {
            commands::cmd_import(
                api,
                &file,
                MonthCursor::current(),
                config.income_category_id,
            )
            .await
        }
        Commands::FiscalMonth { month, year } => {
            let cursor = commands::resolve_month(month, year)?;
            commands::cmd_fiscal_month(&api, cursor, config.income_category_id).await
        }
        Commands::Status => {
            commands::cmd_status(&api, &config, cli.config.as_deref()).await
        }
    }
}

/// Config file and environment, then command-line overrides
fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let config = ClientConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    Ok(match &cli.api_url {
        Some(url) => config.with_api_url(url),
        None => config,
    })
}
