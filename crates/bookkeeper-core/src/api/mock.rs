//! Mock backend for testing
//!
//! Keeps categories and transactions in memory and answers every API call
//! the way the Bookkeeper backend does: hidden transactions are left out of
//! the regular listings, uploaded statements are categorized with the
//! category rules, and fiscal months follow the income bookings.
//!
//! Failures and latency can be injected per operation for tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::fiscal;
use crate::models::{
    Category, CategoryRule, FiscalMonth, MappingField, Transaction, TransactionList,
    TransactionPatch,
};
use crate::period::MonthCursor;

use super::FinanceApi;

/// Header row of an ING statement export
pub const ING_HEADER: &str =
    "Buchung;Valuta;Auftraggeber/Empfänger;Buchungstext;Verwendungszweck;Saldo;Währung;Betrag;Währung";

const ING_FIELDS: usize = 9;
const ING_DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Default)]
struct Store {
    categories: Vec<Category>,
    transactions: Vec<Transaction>,
    next_id: i64,
}

impl Store {
    fn visible_in(&self, from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = &Transaction> {
        self.transactions
            .iter()
            .filter(move |t| !t.hidden && t.booking_date >= from && t.booking_date <= to)
    }

    fn category_for(&self, transaction: &Transaction) -> Result<Option<Category>> {
        for category in &self.categories {
            if category.matches(transaction)? {
                return Ok(Some(strip_rules(category)));
            }
        }
        Ok(None)
    }

    fn contains(&self, transaction: &Transaction) -> bool {
        self.transactions.iter().any(|t| {
            t.booking_date == transaction.booking_date
                && t.value_date == transaction.value_date
                && t.recipient == transaction.recipient
                && t.booking_text == transaction.booking_text
                && t.purpose == transaction.purpose
                && t.balance == transaction.balance
                && t.amount == transaction.amount
        })
    }

    fn insert(&mut self, mut transaction: Transaction) -> i64 {
        self.next_id += 1;
        transaction.id = self.next_id;
        self.transactions.push(transaction);
        self.next_id
    }
}

/// Transactions embed their category without its rules
fn strip_rules(category: &Category) -> Category {
    Category {
        rules: Vec::new(),
        ..category.clone()
    }
}

fn sorted_list<'a>(items: impl Iterator<Item = &'a Transaction>) -> TransactionList {
    let mut items: Vec<Transaction> = items.cloned().collect();
    items.sort_by(|a, b| a.booking_date.cmp(&b.booking_date).then(a.id.cmp(&b.id)));
    TransactionList::from_items(items)
}

/// In-memory Bookkeeper backend
///
/// Clones share the same store, so a test can keep a handle for assertions
/// while the dashboard owns another.
#[derive(Clone)]
pub struct MockBackend {
    store: Arc<RwLock<Store>>,
    failures: Arc<RwLock<HashSet<String>>>,
    delay: Arc<RwLock<Option<Duration>>>,
    operation_delays: Arc<RwLock<HashMap<String, Duration>>>,
    /// Whether health_check should return true
    pub healthy: bool,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create an empty, healthy backend
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(Store::default())),
            failures: Arc::new(RwLock::new(HashSet::new())),
            delay: Arc::new(RwLock::new(None)),
            operation_delays: Arc::new(RwLock::new(HashMap::new())),
            healthy: true,
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Backend seeded with demo data around the current month
    pub fn with_demo_data() -> Self {
        Self::with_demo_data_for(MonthCursor::current())
    }

    /// Backend seeded with demo data for the months around `cursor`
    pub fn with_demo_data_for(cursor: MonthCursor) -> Self {
        let backend = Self::new();
        for category in demo_categories() {
            backend.add_category(category);
        }

        let mut balance = 2500.0;
        for offset in -2..=1 {
            let month = cursor.shift(offset);
            for (day, recipient, text, amount, category_id, hidden) in demo_month() {
                let Some(date) = demo_date(month, day) else {
                    continue;
                };
                balance += amount;
                let category = category_id.and_then(|id| backend.category(id));
                backend.add_transaction(Transaction {
                    id: 0,
                    booking_date: date,
                    value_date: date,
                    recipient: Some(recipient.to_string()),
                    booking_text: text.to_string(),
                    purpose: None,
                    balance: (balance * 100.0_f64).round() / 100.0,
                    amount,
                    category,
                    hidden,
                });
            }
        }
        backend
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Store>> {
        self.store
            .read()
            .map_err(|_| Error::InvalidData("Failed to acquire mock store lock".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Store>> {
        self.store
            .write()
            .map_err(|_| Error::InvalidData("Failed to acquire mock store lock".into()))
    }

    /// Add a category, keeping its id
    pub fn add_category(&self, category: Category) {
        if let Ok(mut store) = self.store.write() {
            store.categories.push(category);
        }
    }

    /// Add a transaction, assigning the next id
    pub fn add_transaction(&self, transaction: Transaction) -> i64 {
        match self.store.write() {
            Ok(mut store) => store.insert(transaction),
            Err(_) => 0,
        }
    }

    /// Category by id (without rules)
    pub fn category(&self, id: i64) -> Option<Category> {
        let store = self.store.read().ok()?;
        store.categories.iter().find(|c| c.id == id).map(strip_rules)
    }

    /// Snapshot of all stored transactions, hidden ones included
    pub fn transactions(&self) -> Vec<Transaction> {
        self.store
            .read()
            .map(|s| s.transactions.clone())
            .unwrap_or_default()
    }

    /// Make an operation fail with a 500 until cleared.
    ///
    /// Operation keys: `categories`, `transactions`, `category:<id>`,
    /// `unclassified`, `hidden`, `get`, `patch`, `csv`, `fiscal_month`.
    pub fn fail(&self, operation: &str) {
        if let Ok(mut failures) = self.failures.write() {
            failures.insert(operation.to_string());
        }
    }

    pub fn clear_failures(&self) {
        if let Ok(mut failures) = self.failures.write() {
            failures.clear();
        }
    }

    /// Delay every response by `delay`
    pub fn set_delay(&self, delay: Option<Duration>) {
        if let Ok(mut current) = self.delay.write() {
            *current = delay;
        }
    }

    /// Delay one operation (same keys as [`fail`](Self::fail)); takes
    /// precedence over [`set_delay`](Self::set_delay)
    pub fn set_operation_delay(&self, operation: &str, delay: Option<Duration>) {
        if let Ok(mut delays) = self.operation_delays.write() {
            match delay {
                Some(delay) => delays.insert(operation.to_string(), delay),
                None => delays.remove(operation),
            };
        }
    }

    async fn simulate(&self, operation: &str) -> Result<()> {
        let delay = self
            .operation_delays
            .read()
            .ok()
            .and_then(|d| d.get(operation).copied())
            .or_else(|| self.delay.read().ok().and_then(|d| *d));
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .failures
            .read()
            .map(|f| f.contains(operation))
            .unwrap_or(false);
        if failing {
            debug!("Mock failure injected for {}", operation);
            return Err(Error::Api {
                status: 500,
                message: format!("simulated failure: {}", operation),
            });
        }
        Ok(())
    }

    /// Import statement rows in the ING layout; returns the number imported
    pub fn import_statement(&self, contents: &[u8]) -> Result<usize> {
        let parsed = parse_ing_statement(contents)?;
        let mut store = self.write()?;

        let mut imported = 0;
        for mut transaction in parsed {
            if store.contains(&transaction) {
                continue;
            }
            transaction.category = store.category_for(&transaction)?;
            store.insert(transaction);
            imported += 1;
        }
        info!("Mock import: {} new transactions", imported);
        Ok(imported)
    }
}

#[async_trait]
impl FinanceApi for MockBackend {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.simulate("categories").await?;
        Ok(self.read()?.categories.clone())
    }

    async fn list_transactions(&self, from: NaiveDate, to: NaiveDate) -> Result<TransactionList> {
        self.simulate("transactions").await?;
        Ok(sorted_list(self.read()?.visible_in(from, to)))
    }

    async fn list_transactions_for_category(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        category_id: i64,
    ) -> Result<TransactionList> {
        self.simulate(&format!("category:{}", category_id)).await?;
        let store = self.read()?;
        Ok(sorted_list(
            store
                .visible_in(from, to)
                .filter(|t| t.category_id() == Some(category_id)),
        ))
    }

    async fn list_unclassified(&self, from: NaiveDate, to: NaiveDate) -> Result<TransactionList> {
        self.simulate("unclassified").await?;
        let store = self.read()?;
        Ok(sorted_list(
            store.visible_in(from, to).filter(|t| t.category.is_none()),
        ))
    }

    async fn list_hidden(&self, from: NaiveDate, to: NaiveDate) -> Result<TransactionList> {
        self.simulate("hidden").await?;
        let store = self.read()?;
        Ok(sorted_list(store.transactions.iter().filter(|t| {
            t.hidden && t.booking_date >= from && t.booking_date <= to
        })))
    }

    async fn get_transaction(&self, id: i64) -> Result<Transaction> {
        self.simulate("get").await?;
        self.read()?
            .transactions
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Transaction {}", id)))
    }

    async fn patch_transaction(&self, id: i64, patch: &TransactionPatch) -> Result<Transaction> {
        self.simulate("patch").await?;
        if patch.is_empty() {
            return Err(Error::InvalidData(
                "Patch must set a category or the hidden flag".into(),
            ));
        }

        let mut store = self.write()?;
        let category = match patch.category_id {
            Some(category_id) => Some(
                store
                    .categories
                    .iter()
                    .find(|c| c.id == category_id)
                    .map(strip_rules)
                    .ok_or_else(|| Error::NotFound(format!("Category {}", category_id)))?,
            ),
            None => None,
        };

        let transaction = store
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("Transaction {}", id)))?;
        if category.is_some() {
            transaction.category = category;
        }
        if let Some(hidden) = patch.hidden {
            transaction.hidden = hidden;
        }
        Ok(transaction.clone())
    }

    async fn upload_csv(&self, file_name: &str, contents: Vec<u8>) -> Result<()> {
        self.simulate("csv").await?;
        debug!("Mock upload of {} ({} bytes)", file_name, contents.len());
        self.import_statement(&contents)?;
        Ok(())
    }

    async fn fiscal_month(
        &self,
        month: u32,
        year: i32,
        income_category_id: i64,
    ) -> Result<FiscalMonth> {
        self.simulate("fiscal_month").await?;
        let cursor = MonthCursor::new(month, year)?;
        let (from, to) = fiscal::income_window(cursor);

        let store = self.read()?;
        let income = sorted_list(
            store
                .transactions
                .iter()
                .filter(|t| t.booking_date >= from && t.booking_date <= to)
                .filter(|t| t.category_id() == Some(income_category_id)),
        );
        Ok(fiscal::fiscal_month(cursor, &income.items))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn base_url(&self) -> &str {
        "mock://bookkeeper"
    }
}

/// Parse an ING statement export.
///
/// ING exports are Windows-1252; a UTF-8 byte order mark switches to UTF-8.
/// Preamble lines with a different field count are skipped; the first row
/// with the full field count is the header.
pub fn parse_ing_statement(contents: &[u8]) -> Result<Vec<Transaction>> {
    let (text, encoding, _) = encoding_rs::WINDOWS_1252.decode(contents);
    debug!("Decoding statement as {}", encoding.name());

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut transactions = Vec::new();
    let mut skipped_header = false;
    for record in reader.records() {
        let record = record?;
        if record.len() != ING_FIELDS {
            continue;
        }
        if !skipped_header {
            skipped_header = true;
            continue;
        }

        let field = |i: usize| record[i].trim().to_string();
        let optional = |i: usize| Some(field(i)).filter(|s| !s.is_empty());

        let booking_text = field(3);
        if booking_text.is_empty() {
            return Err(Error::InvalidData(format!(
                "Booking text is empty in row dated {}",
                field(0)
            )));
        }

        transactions.push(Transaction {
            id: 0,
            booking_date: parse_ing_date(&field(0))?,
            value_date: parse_ing_date(&field(1))?,
            recipient: optional(2),
            booking_text,
            purpose: optional(4),
            balance: parse_ing_number(&field(5))?,
            amount: parse_ing_number(&field(7))?,
            category: None,
            hidden: false,
        });
    }
    Ok(transactions)
}

fn parse_ing_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, ING_DATE_FORMAT)
        .map_err(|e| Error::InvalidData(format!("Invalid date '{}': {}", raw, e)))
}

/// German number format: `.` groups thousands, `,` separates decimals
fn parse_ing_number(raw: &str) -> Result<f64> {
    raw.replace('.', "")
        .replace(',', ".")
        .parse()
        .map_err(|_| Error::InvalidData(format!("Invalid amount '{}'", raw)))
}

fn demo_categories() -> Vec<Category> {
    let rule = |id: i64, category_id: i64, field: MappingField, regex: &str| CategoryRule {
        id,
        category_id,
        description: None,
        regex: regex.to_string(),
        mapping_field: field,
    };

    let mut salary = Category::new(1, "Salary").with_color("#22c55e");
    salary.description = Some("Monthly income".into());
    salary.rules = vec![rule(1, 1, MappingField::BookingText, "^gehalt")];

    let mut rent = Category::new(2, "Rent");
    rent.rules = vec![rule(2, 2, MappingField::Purpose, "miete")];

    let mut groceries = Category::new(3, "Groceries");
    groceries.rules = vec![rule(3, 3, MappingField::Recipient, "rewe|edeka|aldi")];

    let dining = Category::new(4, "Dining");
    let transport = Category::new(5, "Transport");

    vec![salary, rent, groceries, dining, transport]
}

type DemoRow = (u32, &'static str, &'static str, f64, Option<i64>, bool);

fn demo_month() -> Vec<DemoRow> {
    vec![
        (1, "Hausverwaltung", "Dauerauftrag", -950.0, Some(2), false),
        (3, "REWE Markt", "Lastschrift", -64.37, Some(3), false),
        (8, "Deutsche Bahn", "Lastschrift", -39.9, Some(5), false),
        (10, "EDEKA", "Lastschrift", -48.12, Some(3), false),
        (12, "Trattoria Roma", "Kartenzahlung", -41.5, Some(4), false),
        (15, "PayPal", "Lastschrift", -120.0, None, true),
        (17, "ALDI SUED", "Lastschrift", -23.85, Some(3), false),
        (20, "Amazon", "Lastschrift", -29.99, None, false),
        (27, "ACME GmbH", "Gehalt", 3100.0, Some(1), false),
    ]
}

fn demo_date(month: MonthCursor, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(month.year(), month.month(), day)
}
