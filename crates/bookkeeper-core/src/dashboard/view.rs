//! Dashboard controller
//!
//! Sequences the API calls of a load cycle and keeps the resulting state:
//!
//! 1. fiscal month for the selected calendar month
//! 2. categories, then one transaction request per category plus the
//!    unclassified bucket, all in flight together
//! 3. the raw transaction list for the date-grouped view
//!
//! Edits (category change, hide) re-run steps 2 and 3; uploads and month
//! navigation re-run the whole cycle. Each step empties the view it feeds
//! before fetching, so a failed or cancelled step leaves that view empty
//! rather than showing data from another interval. Failures set a generic
//! error flag; nothing is retried.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, FinanceApi};
use crate::error::{Error, Result};
use crate::fiscal;
use crate::models::{Category, CategoryTransactions, Transaction, TransactionPatch};
use crate::period::MonthCursor;

use super::aggregate;
use super::balance::BalanceOverview;
use super::colors::{category_color, CATEGORY_PALETTE};
use super::dated;

/// Cancels every pending and future request of one dashboard
#[derive(Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

pub struct Dashboard<A: FinanceApi = ApiClient> {
    api: A,
    income_category_id: i64,
    cursor: MonthCursor,
    start: NaiveDate,
    end: NaiveDate,
    loaded: bool,
    error: bool,
    categories: Vec<Category>,
    category_transactions: Vec<CategoryTransactions>,
    transactions: Vec<Transaction>,
    cancel: CancelHandle,
    cancel_rx: watch::Receiver<bool>,
}

impl<A: FinanceApi> Dashboard<A> {
    pub fn new(api: A, cursor: MonthCursor, income_category_id: i64) -> Self {
        let (tx, cancel_rx) = watch::channel(false);
        let calendar = fiscal::calendar_month(cursor);
        Self {
            api,
            income_category_id,
            cursor,
            start: calendar.start,
            end: calendar.end,
            loaded: false,
            error: false,
            categories: Vec::new(),
            category_transactions: Vec::new(),
            transactions: Vec::new(),
            cancel: CancelHandle { tx: Arc::new(tx) },
            cancel_rx,
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    pub fn cursor(&self) -> MonthCursor {
        self.cursor
    }

    /// Inclusive date range of the current fiscal month
    pub fn interval(&self) -> (NaiveDate, NaiveDate) {
        (self.start, self.end)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Rows ordered by absolute sum, unclassified bucket included
    pub fn category_transactions(&self) -> &[CategoryTransactions] {
        &self.category_transactions
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn balance_overview(&self) -> BalanceOverview {
        BalanceOverview::from_rows(&self.category_transactions)
    }

    pub fn dated_transactions(&self) -> BTreeMap<NaiveDate, Vec<Transaction>> {
        dated::group_by_booking_date(&self.transactions)
    }

    /// Display color for a category id
    pub fn color_for(&self, category_id: Option<i64>) -> &str {
        category_color(&self.categories, category_id)
    }

    /// Run a request unless the dashboard was cancelled in the meantime
    async fn guarded<T, F>(&self, request: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let mut cancelled = self.cancel_rx.clone();
        if *cancelled.borrow() {
            return Err(Error::Cancelled);
        }
        tokio::select! {
            result = request => result,
            _ = cancelled.wait_for(|c| *c) => Err(Error::Cancelled),
        }
    }

    /// Set the error flag for real failures; cancellation leaves state alone
    fn record_failure(&mut self, what: &str, err: Error) -> Error {
        if err.is_cancelled() {
            debug!("{} cancelled", what);
        } else {
            warn!("{} failed: {}", what, err);
            self.loaded = true;
            self.error = true;
        }
        err
    }

    /// Full reload: fiscal month, category rows and the raw list
    pub async fn load_data(&mut self) -> Result<()> {
        self.loaded = false;
        self.error = false;
        self.category_transactions.clear();
        self.transactions.clear();
        // calendar month until the fiscal month is known
        let calendar = fiscal::calendar_month(self.cursor);
        self.start = calendar.start;
        self.end = calendar.end;

        let request = self.api.fiscal_month(
            self.cursor.month(),
            self.cursor.year(),
            self.income_category_id,
        );
        let fiscal_month = match self.guarded(request).await {
            Ok(fiscal_month) => fiscal_month,
            Err(e) => return Err(self.record_failure("Fiscal month request", e)),
        };
        self.start = fiscal_month.start;
        self.end = fiscal_month.end;
        info!(
            "Loading {} ({} to {})",
            self.cursor, self.start, self.end
        );

        let categories = self.load_categories().await;
        if matches!(categories, Err(Error::Cancelled)) {
            return categories;
        }
        let transactions = self.load_transactions().await;
        categories.and(transactions)
    }

    /// Refetch categories and the per-category transaction lists
    pub async fn load_categories(&mut self) -> Result<()> {
        self.category_transactions.clear();

        let mut categories = match self.guarded(self.api.list_categories()).await {
            Ok(categories) => categories,
            Err(e) => return Err(self.record_failure("Category request", e)),
        };
        aggregate::carry_colors(&mut categories, &self.categories);
        self.categories = categories;

        let (from, to) = (self.start, self.end);
        let mut rows = aggregate::pending_rows(&self.categories);
        let targets: Vec<Option<i64>> = rows.iter().map(|r| r.category_id()).collect();
        debug!("Fetching {} category lists", targets.len());

        let api = &self.api;
        let requests = targets.iter().map(|target| async move {
            match *target {
                Some(id) => api.list_transactions_for_category(from, to, id).await,
                None => api.list_unclassified(from, to).await,
            }
        });
        let results = match self.guarded(async { Ok::<_, Error>(join_all(requests).await) }).await {
            Ok(results) => results,
            Err(e) => return Err(self.record_failure("Category transactions", e)),
        };

        let mut first_error = None;
        for (row, result) in rows.iter_mut().zip(results) {
            match result {
                Ok(list) => row.complete(list),
                Err(e) => {
                    warn!("Transactions for {} failed: {}", row.name(), e);
                    first_error.get_or_insert(e);
                }
            }
        }

        let complete = aggregate::all_loaded(&rows);
        aggregate::emit(&mut rows, &mut self.categories, CATEGORY_PALETTE);
        self.category_transactions = rows;
        self.loaded = true;

        if complete {
            return Ok(());
        }
        self.error = true;
        Err(first_error
            .unwrap_or_else(|| Error::InvalidData("Category transactions incomplete".into())))
    }

    /// Refetch the raw transaction list for the current interval
    pub async fn load_transactions(&mut self) -> Result<()> {
        self.transactions.clear();
        let request = self.api.list_transactions(self.start, self.end);
        match self.guarded(request).await {
            Ok(list) => {
                self.transactions = list.items;
                Ok(())
            }
            Err(e) => Err(self.record_failure("Transaction request", e)),
        }
    }

    /// Upload a statement, then reload everything
    pub async fn import_csv(&mut self, path: &Path) -> Result<()> {
        let contents = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "statement.csv".to_string());

        info!("Uploading {} ({} bytes)", file_name, contents.len());
        if let Err(e) = self
            .guarded(self.api.upload_csv(&file_name, contents))
            .await
        {
            return Err(self.record_failure("CSV upload", e));
        }
        self.load_data().await
    }

    /// Step `count` months forward (negative: back) and reload
    pub async fn move_month(&mut self, count: i32) -> Result<()> {
        self.cursor = self.cursor.shift(count);
        self.load_data().await
    }

    /// Jump to a month and reload
    pub async fn show_month(&mut self, cursor: MonthCursor) -> Result<()> {
        self.cursor = cursor;
        self.load_data().await
    }

    /// Move a transaction to another category and refresh the rows
    pub async fn set_category(&mut self, transaction_id: i64, category_id: i64) -> Result<Transaction> {
        self.apply_patch(transaction_id, TransactionPatch::category(category_id))
            .await
    }

    /// Hide or unhide a transaction and refresh the rows
    pub async fn set_hidden(&mut self, transaction_id: i64, hidden: bool) -> Result<Transaction> {
        self.apply_patch(transaction_id, TransactionPatch::hidden(hidden))
            .await
    }

    /// Patch, then refresh both views. A failed refresh only sets the
    /// error flag: the update itself went through and is returned.
    async fn apply_patch(&mut self, transaction_id: i64, patch: TransactionPatch) -> Result<Transaction> {
        let updated = match self
            .guarded(self.api.patch_transaction(transaction_id, &patch))
            .await
        {
            Ok(updated) => updated,
            Err(e) => return Err(self.record_failure("Transaction update", e)),
        };

        let categories = self.load_categories().await;
        if matches!(categories, Err(Error::Cancelled)) {
            return Err(Error::Cancelled);
        }
        let transactions = self.load_transactions().await;
        if let Err(e) = transactions.and(categories) {
            if e.is_cancelled() {
                return Err(e);
            }
            warn!("Transaction {} updated, refresh incomplete: {}", transaction_id, e);
        }
        Ok(updated)
    }

    /// Serializable view of the current state
    pub fn snapshot(&self) -> DashboardSnapshot {
        let overview = self.balance_overview();
        let rows = self
            .category_transactions
            .iter()
            .map(|row| RowSnapshot {
                name: row.name().to_string(),
                category_id: row.category_id(),
                color: self.color_for(row.category_id()).to_string(),
                sum: row.sum,
                count: row.transaction_list.total,
                loaded: row.loaded,
            })
            .collect();
        let days = self
            .dated_transactions()
            .into_iter()
            .map(|(date, transactions)| DaySnapshot {
                date: dated::date_key(date),
                transactions,
            })
            .collect();

        DashboardSnapshot {
            month: self.cursor.month(),
            year: self.cursor.year(),
            start: dated::date_key(self.start),
            end: dated::date_key(self.end),
            loaded: self.loaded,
            error: self.error,
            overview,
            rows,
            days,
        }
    }
}

impl<A: FinanceApi> Drop for Dashboard<A> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RowSnapshot {
    pub name: String,
    pub category_id: Option<i64>,
    pub color: String,
    pub sum: f64,
    pub count: i64,
    pub loaded: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySnapshot {
    pub date: String,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub month: u32,
    pub year: i32,
    pub start: String,
    pub end: String,
    pub loaded: bool,
    pub error: bool,
    pub overview: BalanceOverview,
    pub rows: Vec<RowSnapshot>,
    pub days: Vec<DaySnapshot>,
}
