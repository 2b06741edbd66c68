//! Statement upload command

use std::path::Path;

use anyhow::Result;
use bookkeeper_core::{ApiClient, Dashboard, MonthCursor};

use super::{cancel_on_ctrl_c, check_load, format_amount};

/// Upload a statement and show the refreshed month
pub async fn cmd_import(
    api: ApiClient,
    file: &Path,
    cursor: MonthCursor,
    income_category_id: i64,
) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }

    println!("📥 Uploading {}...", file.display());

    let mut dashboard = Dashboard::new(api, cursor, income_category_id);
    let interrupt = cancel_on_ctrl_c(dashboard.cancel_handle());
    let result = dashboard.import_csv(file).await;
    interrupt.abort();
    check_load(&dashboard, result, "Failed to import statement")?;

    let (start, end) = dashboard.interval();
    let overview = dashboard.balance_overview();
    let unclassified = dashboard
        .category_transactions()
        .iter()
        .find(|r| r.is_unclassified())
        .map(|r| r.transaction_list.total)
        .unwrap_or(0);

    println!();
    println!("✅ Upload complete");
    println!("   {} ({} → {})", dashboard.cursor(), start, end);
    println!("   Transactions: {}", dashboard.transactions().len());
    println!("   Balance:      {}", format_amount(overview.balance));
    if unclassified > 0 {
        println!("   🏷️  Unclassified: {}", unclassified);
        println!();
        println!("   Assign them with 'bookkeeper categorize <id> <category-id>'.");
    }

    Ok(())
}
