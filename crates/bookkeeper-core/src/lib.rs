//! Bookkeeper Core Library
//!
//! Client side of the Bookkeeper personal finance dashboard:
//! - REST API access with pluggable backends (HTTP, in-memory mock)
//! - Client configuration (defaults, config file, environment)
//! - Month navigation and fiscal month handling
//! - Dashboard aggregation: category rows, colors, balance overview,
//!   transactions grouped by booking date

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fiscal;
pub mod models;
pub mod period;

/// Test utilities including a mock Bookkeeper API server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use api::{ApiClient, FinanceApi, HttpBackend, MockBackend};
pub use config::ClientConfig;
pub use dashboard::{BalanceOverview, CancelHandle, Dashboard, DashboardSnapshot};
pub use error::{Error, Result};
pub use models::{
    Category, CategoryRule, CategoryTransactions, FiscalMonth, MappingField, Transaction,
    TransactionList, TransactionPatch,
};
pub use period::MonthCursor;
