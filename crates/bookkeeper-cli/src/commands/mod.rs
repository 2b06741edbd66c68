//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `dashboard` - Fiscal month overview (category rows, balance, daily list)
//! - `categories` - Category and rule listing
//! - `transactions` - Transaction commands (list, show, categorize, hide, unhide)
//! - `import` - Statement upload
//! - `status` - Backend health, configuration and fiscal month

pub mod categories;
pub mod dashboard;
pub mod import;
pub mod status;
pub mod transactions;

// Re-export command functions for main.rs
pub use categories::*;
pub use dashboard::*;
pub use import::*;
pub use status::*;
pub use transactions::*;

use anyhow::{Context, Result};
use bookkeeper_core::dashboard::colors::hex_to_rgb;
use bookkeeper_core::{ApiClient, CancelHandle, FinanceApi, MonthCursor};
use chrono::NaiveDate;
use tokio::task::JoinHandle;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Signed amount, red for spending and green for income
pub fn format_amount(amount: f64) -> String {
    if amount < 0.0 {
        format!("\x1b[31m-{:.2}\x1b[0m", amount.abs())
    } else {
        format!("\x1b[32m+{:.2}\x1b[0m", amount)
    }
}

/// A colored bullet in a category's display color
pub fn color_dot(hex: &str) -> String {
    match hex_to_rgb(hex) {
        Some((r, g, b)) => format!("\x1b[38;2;{};{};{}m●\x1b[0m", r, g, b),
        None => "●".to_string(),
    }
}

/// Month from flags, defaulting to the current one
pub fn resolve_month(month: Option<u32>, year: Option<i32>) -> Result<MonthCursor> {
    let current = MonthCursor::current();
    let cursor = MonthCursor::new(
        month.unwrap_or(current.month()),
        year.unwrap_or(current.year()),
    )?;
    Ok(cursor)
}

pub fn parse_date(raw: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid {} date '{}' (use YYYY-MM-DD)", flag, raw))
}

/// Date range from `--from`/`--to`; missing ends come from the current
/// fiscal month
pub async fn resolve_range(
    api: &ApiClient,
    from: Option<&str>,
    to: Option<&str>,
    income_category_id: i64,
) -> Result<(NaiveDate, NaiveDate)> {
    let from = from.map(|f| parse_date(f, "--from")).transpose()?;
    let to = to.map(|t| parse_date(t, "--to")).transpose()?;

    let (from, to) = match (from, to) {
        (Some(from), Some(to)) => (from, to),
        (from, to) => {
            let cursor = MonthCursor::current();
            let fiscal_month = api
                .fiscal_month(cursor.month(), cursor.year(), income_category_id)
                .await
                .context("Failed to fetch the current fiscal month")?;
            (
                from.unwrap_or(fiscal_month.start),
                to.unwrap_or(fiscal_month.end),
            )
        }
    };

    if from > to {
        anyhow::bail!("--from ({}) is after --to ({})", from, to);
    }
    Ok((from, to))
}

/// Cancel the dashboard's pending requests on Ctrl-C
pub fn cancel_on_ctrl_c(handle: CancelHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling pending requests");
            handle.cancel();
        }
    })
}
