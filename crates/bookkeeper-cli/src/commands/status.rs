//! Status-related command implementations (status, fiscal month)

use std::path::Path;

use anyhow::{Context, Result};
use bookkeeper_core::config::default_config_path;
use bookkeeper_core::{ApiClient, ClientConfig, FinanceApi, MonthCursor};

/// `config_path` is the `--config` file, if one was given
pub async fn cmd_status(
    api: &ApiClient,
    config: &ClientConfig,
    config_path: Option<&Path>,
) -> Result<()> {
    println!();
    println!("📊 Bookkeeper Status");
    println!("   ─────────────────────────────────────────────────────────────");

    println!("   Backend: {}", api.base_url());
    if matches!(api, ApiClient::Mock(_)) {
        println!("   Mode: demo data (--mock)");
    }
    println!("   Timeout: {}s", config.timeout.as_secs());
    println!("   Income category: {}", config.income_category_id);
    println!("   Config: {}", describe_config_path(config_path));

    println!();
    if api.health_check().await {
        println!("   ✅ Backend reachable");
        match api.list_categories().await {
            Ok(categories) => println!("   Categories: {}", categories.len()),
            Err(e) => println!("   ⚠️  Could not list categories: {}", e),
        }
    } else {
        println!("   ❌ Backend not reachable");
        println!("      Check --api-url or BOOKKEEPER_API_URL");
    }

    println!();
    Ok(())
}

/// The config file in effect: the `--config` path, else the default location
pub fn describe_config_path(config_path: Option<&Path>) -> String {
    match config_path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) if path.exists() => path.display().to_string(),
        Some(path) => format!("{} (not present, using defaults)", path.display()),
        None => "(no config directory)".to_string(),
    }
}

pub async fn cmd_fiscal_month(
    api: &ApiClient,
    cursor: MonthCursor,
    income_category_id: i64,
) -> Result<()> {
    let fiscal_month = api
        .fiscal_month(cursor.month(), cursor.year(), income_category_id)
        .await
        .with_context(|| format!("Failed to fetch fiscal month for {}", cursor))?;

    let days = (fiscal_month.end - fiscal_month.start).num_days() + 1;
    println!(
        "📅 {}: {} → {} ({} days)",
        cursor, fiscal_month.start, fiscal_month.end, days
    );
    if fiscal_month.start == cursor.first_day() {
        println!("   Starts on the 1st (no early income booking found)");
    }
    Ok(())
}
