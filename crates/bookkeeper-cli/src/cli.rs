//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Bookkeeper - Personal finance dashboard
#[derive(Parser)]
#[command(name = "bookkeeper")]
#[command(about = "Terminal dashboard for a Bookkeeper finance backend", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Backend base URL (overrides config file and BOOKKEEPER_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Use the in-memory demo backend instead of a server
    #[arg(long, global = true)]
    pub mock: bool,

    /// Config file (default: <config dir>/bookkeeper/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the dashboard for a fiscal month
    Dashboard {
        /// Month (1-12, defaults to the current month)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        /// Year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,

        /// Months to move from the selected month (negative goes back)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        offset: i32,

        /// Print the dashboard as JSON
        #[arg(long)]
        json: bool,
    },

    /// List categories and their rules
    Categories,

    /// List transactions in a date range
    Transactions {
        /// Start date (YYYY-MM-DD, defaults to the current fiscal month)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Only transactions of this category
        #[arg(long, conflicts_with_all = ["unclassified", "hidden"])]
        category: Option<i64>,

        /// Only transactions without a category
        #[arg(long, conflicts_with = "hidden")]
        unclassified: bool,

        /// Only hidden transactions
        #[arg(long)]
        hidden: bool,

        /// Maximum number of transactions to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Show a single transaction
    Show {
        /// Transaction ID
        id: i64,
    },

    /// Move a transaction to another category
    Categorize {
        /// Transaction ID
        id: i64,

        /// Target category ID
        category_id: i64,
    },

    /// Hide a transaction from lists and sums
    Hide {
        /// Transaction ID
        id: i64,
    },

    /// Show a hidden transaction again
    Unhide {
        /// Transaction ID
        id: i64,
    },

    /// Upload a bank statement CSV
    Import {
        /// CSV file to upload
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show the fiscal month interval
    FiscalMonth {
        /// Month (1-12, defaults to the current month)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        /// Year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
    },

    /// Check backend connectivity and configuration
    Status,
}
