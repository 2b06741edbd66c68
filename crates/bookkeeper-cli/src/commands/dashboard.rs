//! Dashboard command implementation

use anyhow::{Context, Result};
use bookkeeper_core::dashboard::dated::daily_totals;
use bookkeeper_core::{ApiClient, Dashboard, Error, MonthCursor};
use tracing::warn;

use super::{cancel_on_ctrl_c, color_dot, format_amount, truncate};

pub async fn cmd_dashboard(
    api: ApiClient,
    cursor: MonthCursor,
    income_category_id: i64,
    json: bool,
) -> Result<()> {
    let mut dashboard = Dashboard::new(api, cursor, income_category_id);

    let interrupt = cancel_on_ctrl_c(dashboard.cancel_handle());
    let result = dashboard.load_data().await;
    interrupt.abort();
    check_load(&dashboard, result, "Failed to load dashboard")?;

    if json {
        let snapshot = dashboard.snapshot();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    print_dashboard(&dashboard);
    Ok(())
}

/// Decide whether a load cycle left enough to render.
///
/// Partial failures are reported and rendered; nothing loaded is an error.
pub fn check_load(
    dashboard: &Dashboard,
    result: bookkeeper_core::Result<()>,
    context: &'static str,
) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(Error::Cancelled) => anyhow::bail!("Interrupted"),
        Err(e) if dashboard.category_transactions().is_empty() => Err(e).context(context),
        Err(e) => {
            warn!("Some dashboard data failed to load: {}", e);
            Ok(())
        }
    }
}

/// One block per 5% of income, at most 20
fn share_bar(percentage: f64) -> String {
    let blocks = (percentage / 5.0).round().clamp(0.0, 20.0) as usize;
    "█".repeat(blocks)
}

pub fn print_dashboard(dashboard: &Dashboard) {
    let (start, end) = dashboard.interval();
    let overview = dashboard.balance_overview();

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│        💰 Bookkeeper Dashboard          │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}  ({} → {})", dashboard.cursor(), start, end);
    if dashboard.has_error() {
        println!("  ⚠️  Some data failed to load, figures may be incomplete");
    }
    println!();
    println!("  Income:    {:>14}", format_amount(overview.income));
    println!("  Expenses:  {:>14}", format_amount(-overview.expenses));
    println!(
        "  Balance:   {:>14}  ({:.1}% of income left)",
        format_amount(overview.balance),
        overview.savings_rate()
    );

    println!();
    println!("  📂 Categories");
    println!("   ─────────────────────────────────────────────────────────────");
    for row in dashboard.category_transactions() {
        let status = if row.loaded {
            format!("{:>3} tx", row.transaction_list.total)
        } else {
            "failed".to_string()
        };
        println!(
            "   {} {:<24} {:>14}  {}",
            color_dot(dashboard.color_for(row.category_id())),
            truncate(row.name(), 24),
            format_amount(row.sum),
            status
        );
    }

    if !overview.expense_shares.is_empty() {
        println!();
        println!("  💸 Share of Income");
        println!("   ─────────────────────────────────────────────────────────────");
        for share in &overview.expense_shares {
            println!(
                "   {} {:<24} {:>6.1}%  {}",
                color_dot(dashboard.color_for(share.category_id)),
                truncate(&share.name, 24),
                share.percentage,
                share_bar(share.percentage)
            );
        }
    }

    let dated = dashboard.dated_transactions();
    println!();
    println!("  📅 By Booking Date");
    println!("   ─────────────────────────────────────────────────────────────");
    if dated.is_empty() {
        println!("   No transactions in this period.");
    }
    for ((date, total), transactions) in daily_totals(&dated).into_iter().zip(dated.values()) {
        println!("   {}  {:>14}", date.format("%a %d.%m.%Y"), format_amount(total));
        for t in transactions {
            println!(
                "      {} [{:>4}] {:<32} {:>14}",
                color_dot(dashboard.color_for(t.category_id())),
                t.id,
                truncate(t.label(), 32),
                format_amount(t.amount)
            );
        }
    }
    println!();

    let unclassified = dashboard
        .category_transactions()
        .iter()
        .find(|r| r.is_unclassified())
        .map(|r| r.transaction_list.total)
        .unwrap_or(0);
    if unclassified > 0 {
        println!(
            "  {} unclassified. Run 'bookkeeper transactions --unclassified' to review.",
            unclassified
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_bar() {
        assert_eq!(share_bar(0.0), "");
        assert_eq!(share_bar(30.6), "██████");
        assert_eq!(share_bar(250.0).chars().count(), 20);
    }
}
