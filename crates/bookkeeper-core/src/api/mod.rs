//! Bookkeeper REST API access
//!
//! This module provides a backend-agnostic interface to the finance API.
//!
//! # Architecture
//!
//! - `FinanceApi` trait: every call the dashboard makes against the backend
//! - `ApiClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `HttpBackend` (reqwest), `MockBackend` (in-memory)
//!
//! # Usage
//!
//! ```rust,ignore
//! let api = ApiClient::from_config(&ClientConfig::load(None)?)?;
//! let categories = api.list_categories().await?;
//! ```
//!
//! # Endpoints
//!
//! - `GET /api/v1/categories`
//! - `GET /api/v1/transactions?from&to[&category]`
//! - `GET /api/v1/transactions/unclassified?from&to`
//! - `GET /api/v1/transactions/hidden?from&to`
//! - `GET /api/v1/transaction/{id}`
//! - `PATCH /api/v1/transaction/{id}`
//! - `POST /api/v1/transactions/csv` (multipart field `file`)
//! - `GET /api/v1/interval/fiscal-month?month&year&income_category_id`

mod http;
mod mock;

pub use http::HttpBackend;
pub use mock::{MockBackend, ING_HEADER};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::models::{Category, FiscalMonth, Transaction, TransactionList, TransactionPatch};

/// Date format used in query strings
pub const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn query_date(date: NaiveDate) -> String {
    date.format(QUERY_DATE_FORMAT).to_string()
}

/// Trait defining every call made against the Bookkeeper backend
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait FinanceApi: Send + Sync {
    /// List all categories
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// List visible transactions booked within `[from, to]`
    async fn list_transactions(&self, from: NaiveDate, to: NaiveDate) -> Result<TransactionList>;

    /// List visible transactions of one category booked within `[from, to]`
    async fn list_transactions_for_category(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        category_id: i64,
    ) -> Result<TransactionList>;

    /// List visible transactions without a category
    async fn list_unclassified(&self, from: NaiveDate, to: NaiveDate) -> Result<TransactionList>;

    /// List hidden transactions
    async fn list_hidden(&self, from: NaiveDate, to: NaiveDate) -> Result<TransactionList>;

    /// Fetch a single transaction
    async fn get_transaction(&self, id: i64) -> Result<Transaction>;

    /// Apply a partial update and return the updated transaction
    async fn patch_transaction(&self, id: i64, patch: &TransactionPatch) -> Result<Transaction>;

    /// Upload a bank statement for import
    async fn upload_csv(&self, file_name: &str, contents: Vec<u8>) -> Result<()>;

    /// Fiscal month interval for a calendar month (1-12)
    async fn fiscal_month(
        &self,
        month: u32,
        year: i32,
        income_category_id: i64,
    ) -> Result<FiscalMonth>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Backend location (for logging)
    fn base_url(&self) -> &str;
}

/// Concrete API client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum ApiClient {
    /// Bookkeeper REST API over HTTP
    Http(HttpBackend),
    /// In-memory backend for tests and offline demos
    Mock(MockBackend),
}

impl ApiClient {
    /// Create an HTTP client from configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(ApiClient::Http(HttpBackend::from_config(config)?))
    }

    /// Create a mock client seeded with demo data
    pub fn mock() -> Self {
        ApiClient::Mock(MockBackend::with_demo_data())
    }

    /// Move a transaction to a category
    pub async fn set_category(&self, id: i64, category_id: i64) -> Result<Transaction> {
        self.patch_transaction(id, &TransactionPatch::category(category_id))
            .await
    }

    /// Hide or unhide a transaction
    pub async fn set_hidden(&self, id: i64, hidden: bool) -> Result<Transaction> {
        self.patch_transaction(id, &TransactionPatch::hidden(hidden))
            .await
    }
}

#[async_trait]
impl FinanceApi for ApiClient {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        match self {
            ApiClient::Http(b) => b.list_categories().await,
            ApiClient::Mock(b) => b.list_categories().await,
        }
    }

    async fn list_transactions(&self, from: NaiveDate, to: NaiveDate) -> Result<TransactionList> {
        match self {
            ApiClient::Http(b) => b.list_transactions(from, to).await,
            ApiClient::Mock(b) => b.list_transactions(from, to).await,
        }
    }

    async fn list_transactions_for_category(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        category_id: i64,
    ) -> Result<TransactionList> {
        match self {
            ApiClient::Http(b) => b.list_transactions_for_category(from, to, category_id).await,
            ApiClient::Mock(b) => b.list_transactions_for_category(from, to, category_id).await,
        }
    }

    async fn list_unclassified(&self, from: NaiveDate, to: NaiveDate) -> Result<TransactionList> {
        match self {
            ApiClient::Http(b) => b.list_unclassified(from, to).await,
            ApiClient::Mock(b) => b.list_unclassified(from, to).await,
        }
    }

    async fn list_hidden(&self, from: NaiveDate, to: NaiveDate) -> Result<TransactionList> {
        match self {
            ApiClient::Http(b) => b.list_hidden(from, to).await,
            ApiClient::Mock(b) => b.list_hidden(from, to).await,
        }
    }

    async fn get_transaction(&self, id: i64) -> Result<Transaction> {
        match self {
            ApiClient::Http(b) => b.get_transaction(id).await,
            ApiClient::Mock(b) => b.get_transaction(id).await,
        }
    }

    async fn patch_transaction(&self, id: i64, patch: &TransactionPatch) -> Result<Transaction> {
        match self {
            ApiClient::Http(b) => b.patch_transaction(id, patch).await,
            ApiClient::Mock(b) => b.patch_transaction(id, patch).await,
        }
    }

    async fn upload_csv(&self, file_name: &str, contents: Vec<u8>) -> Result<()> {
        match self {
            ApiClient::Http(b) => b.upload_csv(file_name, contents).await,
            ApiClient::Mock(b) => b.upload_csv(file_name, contents).await,
        }
    }

    async fn fiscal_month(
        &self,
        month: u32,
        year: i32,
        income_category_id: i64,
    ) -> Result<FiscalMonth> {
        match self {
            ApiClient::Http(b) => b.fiscal_month(month, year, income_category_id).await,
            ApiClient::Mock(b) => b.fiscal_month(month, year, income_category_id).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            ApiClient::Http(b) => b.health_check().await,
            ApiClient::Mock(b) => b.health_check().await,
        }
    }

    fn base_url(&self) -> &str {
        match self {
            ApiClient::Http(b) => b.base_url(),
            ApiClient::Mock(b) => b.base_url(),
        }
    }
}
