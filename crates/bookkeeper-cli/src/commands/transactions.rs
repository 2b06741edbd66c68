//! Transaction command implementations

use anyhow::{Context, Result};
use bookkeeper_core::{ApiClient, FinanceApi, Transaction};
use chrono::NaiveDate;

use super::{format_amount, truncate};

/// Which listing endpoint to query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionFilter {
    All,
    Category(i64),
    Unclassified,
    Hidden,
}

impl TransactionFilter {
    fn title(&self) -> String {
        match self {
            TransactionFilter::All => "Transactions".to_string(),
            TransactionFilter::Category(id) => format!("Transactions in category {}", id),
            TransactionFilter::Unclassified => "Unclassified Transactions".to_string(),
            TransactionFilter::Hidden => "Hidden Transactions".to_string(),
        }
    }
}

pub async fn cmd_transactions_list(
    api: &ApiClient,
    from: NaiveDate,
    to: NaiveDate,
    filter: TransactionFilter,
    limit: usize,
) -> Result<()> {
    let list = match filter {
        TransactionFilter::All => api.list_transactions(from, to).await,
        TransactionFilter::Category(id) => api.list_transactions_for_category(from, to, id).await,
        TransactionFilter::Unclassified => api.list_unclassified(from, to).await,
        TransactionFilter::Hidden => api.list_hidden(from, to).await,
    }
    .context("Failed to fetch transactions")?;

    if list.is_empty() {
        println!("No transactions between {} and {}.", from, to);
        return Ok(());
    }

    println!();
    println!("📝 {} ({} → {})", filter.title(), from, to);
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in list.items.iter().take(limit) {
        let category = tx
            .category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("-");
        println!(
            "   [{:>4}] {} │ {:>14} │ {:<30} │ {}",
            tx.id,
            tx.booking_date,
            format_amount(tx.amount),
            truncate(tx.label(), 30),
            truncate(category, 16)
        );
    }

    println!("   ─────────────────────────────────────────────────────────────");
    println!("   {} transactions, sum {}", list.total, format_amount(list.sum));
    if list.items.len() > limit {
        println!("   ({} not shown, raise --limit)", list.items.len() - limit);
    }

    if filter == TransactionFilter::Hidden {
        println!();
        println!("   Use 'bookkeeper unhide <id>' to restore a transaction.");
    }

    Ok(())
}

pub async fn cmd_show(api: &ApiClient, id: i64) -> Result<()> {
    let tx = api
        .get_transaction(id)
        .await
        .with_context(|| format!("Failed to fetch transaction {}", id))?;
    print_transaction(&tx);
    Ok(())
}

pub async fn cmd_categorize(api: &ApiClient, id: i64, category_id: i64) -> Result<()> {
    let tx = api
        .set_category(id, category_id)
        .await
        .with_context(|| format!("Failed to move transaction {} to category {}", id, category_id))?;

    let name = tx
        .category
        .as_ref()
        .map(|c| c.name.clone())
        .unwrap_or_else(|| category_id.to_string());
    println!("✓ Moved [{}] {} to {}", tx.id, truncate(tx.label(), 40), name);
    Ok(())
}

pub async fn cmd_set_hidden(api: &ApiClient, id: i64, hidden: bool) -> Result<()> {
    let tx = api
        .set_hidden(id, hidden)
        .await
        .with_context(|| format!("Failed to update transaction {}", id))?;

    if tx.hidden {
        println!("✓ Hidden [{}] {}", tx.id, truncate(tx.label(), 40));
        println!("  Use 'bookkeeper unhide {}' to restore it.", tx.id);
    } else {
        println!("✓ Restored [{}] {}", tx.id, truncate(tx.label(), 40));
    }
    Ok(())
}

fn print_transaction(tx: &Transaction) {
    println!();
    println!("🧾 Transaction {}", tx.id);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Booking date:  {}", tx.booking_date);
    println!("   Value date:    {}", tx.value_date);
    println!("   Recipient:     {}", tx.recipient.as_deref().unwrap_or("-"));
    println!("   Booking text:  {}", tx.booking_text);
    if let Some(purpose) = tx.purpose.as_deref() {
        println!("   Purpose:       {}", purpose);
    }
    println!("   Amount:        {}", format_amount(tx.amount));
    println!("   Balance after: {:.2}", tx.balance);
    match &tx.category {
        Some(category) => println!("   Category:      {} (#{})", category.name, category.id),
        None => println!("   Category:      (unclassified)"),
    }
    if tx.hidden {
        println!("   🙈 Hidden");
    }
    println!();
}
