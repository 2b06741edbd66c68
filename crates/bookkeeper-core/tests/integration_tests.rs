//! Integration tests for bookkeeper-core
//!
//! These tests exercise the dashboard workflow through the public API:
//! load → upload statement → re-categorize → hide → navigate months.

use std::path::PathBuf;

use bookkeeper_core::{
    api::ING_HEADER,
    dashboard::{self, CATEGORY_PALETTE, DEFAULT_COLOR},
    fiscal, ApiClient, ClientConfig, Dashboard, Error, FinanceApi, MockBackend, MonthCursor,
};
use chrono::NaiveDate;

fn april() -> MonthCursor {
    MonthCursor::new(4, 2024).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// ING export with two bookings inside the April 2024 fiscal month:
/// a grocery purchase matched by the Groceries rule and an unmatched one
fn ing_statement() -> String {
    format!(
        "Umsatzanzeige;Datei erstellt am: 30.04.2024\n\
         \n\
         {}\n\
         09.04.2024;09.04.2024;REWE Markt GmbH;Lastschrift;Einkauf;1.812,40;EUR;-31,15;EUR\n\
         13.04.2024;13.04.2024;Buchhandlung Lehmann;Kartenzahlung;;1.781,25;EUR;-18,90;EUR\n",
        ING_HEADER
    )
}

fn write_statement(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("Umsatzanzeige_2024-04.csv");
    std::fs::write(&path, ing_statement()).expect("Failed to write statement");
    path
}

fn unclassified_total(dashboard: &Dashboard<ApiClient>) -> i64 {
    dashboard
        .category_transactions()
        .iter()
        .find(|r| r.is_unclassified())
        .map(|r| r.transaction_list.total)
        .unwrap_or_default()
}

// =============================================================================
// Dashboard Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_full_dashboard_workflow() {
    let backend = MockBackend::with_demo_data_for(april());
    let mut dashboard = Dashboard::new(ApiClient::Mock(backend.clone()), april(), 1);

    // Initial load
    dashboard.load_data().await.expect("Initial load failed");
    assert_eq!(dashboard.interval(), (date(2024, 3, 27), date(2024, 4, 26)));
    let visible = dashboard.transactions().len();
    assert_eq!(unclassified_total(&dashboard), 1);

    // Upload a statement: one row lands in Groceries, one is unclassified
    let dir = tempfile::tempdir().unwrap();
    let path = write_statement(&dir);
    dashboard.import_csv(&path).await.expect("Upload failed");
    assert_eq!(dashboard.transactions().len(), visible + 2);
    assert_eq!(unclassified_total(&dashboard), 2);

    // Uploading the same statement again adds nothing
    dashboard.import_csv(&path).await.expect("Re-upload failed");
    assert_eq!(dashboard.transactions().len(), visible + 2);

    // Re-categorize the bookshop purchase
    let bookshop = dashboard
        .transactions()
        .iter()
        .find(|t| t.label() == "Buchhandlung Lehmann")
        .expect("Uploaded transaction missing")
        .clone();
    let updated = dashboard.set_category(bookshop.id, 4).await.unwrap();
    assert_eq!(updated.category_id(), Some(4));
    assert_eq!(unclassified_total(&dashboard), 1);

    // Hide it: gone from the rows and the raw list, still on the backend
    dashboard.set_hidden(bookshop.id, true).await.unwrap();
    assert_eq!(dashboard.transactions().len(), visible + 1);
    let hidden = backend
        .list_hidden(date(2024, 4, 1), date(2024, 4, 30))
        .await
        .unwrap();
    assert!(hidden.items.iter().any(|t| t.id == bookshop.id));

    // Sums stay consistent with the raw list
    let row_total: f64 = dashboard
        .category_transactions()
        .iter()
        .map(|r| r.sum)
        .sum();
    let raw_total: f64 = dashboard.transactions().iter().map(|t| t.amount).sum();
    assert!((row_total - raw_total).abs() < 1e-6);
}

#[tokio::test]
async fn test_month_navigation_moves_fiscal_interval() {
    let backend = MockBackend::with_demo_data_for(april());
    let mut dashboard = Dashboard::new(ApiClient::Mock(backend), april(), 1);
    dashboard.load_data().await.unwrap();

    dashboard.move_month(-1).await.unwrap();
    assert_eq!(dashboard.interval(), (date(2024, 2, 27), date(2024, 3, 26)));

    // No salary booked after May: July falls back to the calendar month
    dashboard.show_month(MonthCursor::new(7, 2024).unwrap()).await.unwrap();
    let calendar = fiscal::calendar_month(MonthCursor::new(7, 2024).unwrap());
    assert_eq!(dashboard.interval(), (calendar.start, calendar.end));
    assert!(dashboard.transactions().is_empty());
    assert!(dashboard
        .category_transactions()
        .iter()
        .all(|r| r.sum == 0.0 && r.loaded));
}

#[tokio::test]
async fn test_colors_are_consistent_across_views() {
    let backend = MockBackend::with_demo_data_for(april());
    let mut dashboard = Dashboard::new(ApiClient::Mock(backend), april(), 1);
    dashboard.load_data().await.unwrap();

    let overview = dashboard.balance_overview();
    for share in &overview.expense_shares {
        let expected = dashboard.color_for(share.category_id).to_string();
        match share.category_id {
            Some(_) => {
                assert_eq!(share.color.as_deref(), Some(expected.as_str()));
                assert!(CATEGORY_PALETTE.contains(&expected.as_str()));
            }
            None => assert_eq!(expected, DEFAULT_COLOR),
        }
    }

    // Transactions in the grouped view resolve to the same colors
    for transactions in dashboard.dated_transactions().values() {
        for t in transactions {
            let color = dashboard.color_for(t.category_id());
            assert_eq!(color, dashboard::category_color(dashboard.categories(), t.category_id()));
        }
    }
}

#[tokio::test]
async fn test_backend_outage_sets_error_flag() {
    let backend = MockBackend::with_demo_data_for(april());
    backend.fail("categories");
    let mut dashboard = Dashboard::new(ApiClient::Mock(backend.clone()), april(), 1);

    let result = dashboard.load_data().await;
    assert!(matches!(result, Err(Error::Api { status: 500, .. })));
    assert!(dashboard.has_error());
    assert!(dashboard.is_loaded());

    // Recovery on the next cycle clears the flag
    backend.clear_failures();
    dashboard.load_data().await.unwrap();
    assert!(!dashboard.has_error());
    assert_eq!(dashboard.category_transactions().len(), 6);
}

#[tokio::test]
async fn test_snapshot_matches_state() {
    let backend = MockBackend::with_demo_data_for(april());
    let mut dashboard = Dashboard::new(ApiClient::Mock(backend), april(), 1);
    dashboard.load_data().await.unwrap();

    let snapshot = dashboard.snapshot();
    assert_eq!((snapshot.month, snapshot.year), (4, 2024));
    assert_eq!(snapshot.end, "2024-04-26");
    assert_eq!(snapshot.rows.len(), dashboard.category_transactions().len());
    let day_count: usize = snapshot.days.iter().map(|d| d.transactions.len()).sum();
    assert_eq!(day_count, dashboard.transactions().len());

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["overview"]["income"], 3100.0);
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_config_file_and_client() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "api_url = \"http://finance.local:9000/\"\ntimeout_secs = 5\nincome_category_id = 7\n",
    )
    .unwrap();

    let config = ClientConfig::load(Some(&path)).expect("Failed to load config");
    assert_eq!(config.income_category_id, 7);
    assert_eq!(config.timeout.as_secs(), 5);

    let client = ApiClient::from_config(&config).unwrap();
    assert!(client.base_url().starts_with("http://finance.local:9000"));
    assert!(!client.base_url().ends_with('/'));
}

#[test]
fn test_invalid_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "timeout_secs = \"soon\"").unwrap();
    assert!(matches!(ClientConfig::load(Some(&path)), Err(Error::Config(_))));
}
