//! Category listing

use anyhow::{Context, Result};
use bookkeeper_core::dashboard::DEFAULT_COLOR;
use bookkeeper_core::{ApiClient, FinanceApi};

use super::{color_dot, truncate};

pub async fn cmd_categories(api: &ApiClient) -> Result<()> {
    let categories = api
        .list_categories()
        .await
        .context("Failed to fetch categories")?;

    if categories.is_empty() {
        println!("No categories defined on the backend.");
        return Ok(());
    }

    println!();
    println!("📂 Categories");
    println!("   ─────────────────────────────────────────────────────────────");

    for category in &categories {
        let color = category.color.as_deref().unwrap_or(DEFAULT_COLOR);
        let description = category
            .description
            .as_deref()
            .map(|d| format!(" - {}", truncate(d, 40)))
            .unwrap_or_default();
        println!(
            "   {} [{:>3}] {}{}",
            color_dot(color),
            category.id,
            category.name,
            description
        );

        for rule in &category.rules {
            println!(
                "            rule {}: /{}/ on {}",
                rule.id, rule.regex, rule.mapping_field
            );
        }
    }

    println!();
    println!("   Categories without a color get one on the dashboard.");
    Ok(())
}
