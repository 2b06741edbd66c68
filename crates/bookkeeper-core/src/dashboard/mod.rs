//! Dashboard view-model
//!
//! Everything the dashboard shows is derived on the client from a few API
//! calls per load cycle:
//! - `aggregate`: per-category rows, ordering, and color assignment
//! - `balance`: income/expense totals and per-category shares of income
//! - `dated`: the raw transaction list bucketed by booking date
//! - `colors`: palette and color lookup
//! - `view`: the `Dashboard` controller that sequences the calls

pub mod aggregate;
pub mod balance;
pub mod colors;
pub mod dated;
mod view;

pub use balance::{BalanceOverview, ExpenseShare};
pub use colors::{category_color, CATEGORY_PALETTE, DEFAULT_COLOR};
pub use view::{CancelHandle, Dashboard, DashboardSnapshot, DaySnapshot, RowSnapshot};
