//! Domain models for Bookkeeper
//!
//! These mirror the JSON bodies of the Bookkeeper REST API. Field names
//! follow the backend's camelCase wire format.

use chrono::NaiveDate;
use regex::RegexBuilder;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// A spending or income category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Display color (hex); assigned from the palette when the backend has none
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_empty")]
    pub rules: Vec<CategoryRule>,
}

impl Category {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: None,
            color: None,
            rules: Vec::new(),
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    /// True if any of the category's rules matches the transaction
    pub fn matches(&self, transaction: &Transaction) -> Result<bool> {
        for rule in &self.rules {
            if rule.matches(transaction)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Transaction field a category rule is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingField {
    Recipient,
    BookingText,
    Purpose,
}

impl MappingField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recipient => "recipient",
            Self::BookingText => "booking_text",
            Self::Purpose => "purpose",
        }
    }
}

impl std::str::FromStr for MappingField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "recipient" => Ok(Self::Recipient),
            "booking_text" | "bookingtext" => Ok(Self::BookingText),
            "purpose" => Ok(Self::Purpose),
            _ => Err(format!("Unknown mapping field: {}", s)),
        }
    }
}

impl std::fmt::Display for MappingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pattern that assigns transactions to a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRule {
    pub id: i64,
    #[serde(rename = "categoryID")]
    pub category_id: i64,
    #[serde(default)]
    pub description: Option<String>,
    pub regex: String,
    pub mapping_field: MappingField,
}

impl CategoryRule {
    /// Case-insensitive match of the pattern against the mapped field.
    /// A missing optional field never matches.
    pub fn matches(&self, transaction: &Transaction) -> Result<bool> {
        let value = match self.mapping_field {
            MappingField::Recipient => transaction.recipient.as_deref(),
            MappingField::BookingText => Some(transaction.booking_text.as_str()),
            MappingField::Purpose => transaction.purpose.as_deref(),
        };
        let Some(value) = value else {
            return Ok(false);
        };
        let regex = RegexBuilder::new(&self.regex)
            .case_insensitive(true)
            .build()?;
        Ok(regex.is_match(value))
    }
}

/// A booked bank transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    #[serde(with = "flexible_date")]
    pub booking_date: NaiveDate,
    #[serde(rename = "valutaDate", alias = "valueDate", with = "flexible_date")]
    pub value_date: NaiveDate,
    #[serde(default)]
    pub recipient: Option<String>,
    pub booking_text: String,
    #[serde(default)]
    pub purpose: Option<String>,
    pub balance: f64,
    /// Signed amount: positive is income, negative is spending
    pub amount: f64,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub hidden: bool,
}

impl Transaction {
    pub fn category_id(&self) -> Option<i64> {
        self.category.as_ref().map(|c| c.id)
    }

    /// Best label for display: recipient, falling back to booking text
    pub fn label(&self) -> &str {
        self.recipient
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or(&self.booking_text)
    }
}

/// A page of transactions with server-side totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionList {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<Transaction>,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub sum: f64,
}

impl TransactionList {
    /// Build a list, computing count and sum of amounts
    pub fn from_items(items: Vec<Transaction>) -> Self {
        let sum = items.iter().map(|t| t.amount).sum();
        Self {
            total: items.len() as i64,
            sum,
            items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Partial update for a transaction (PATCH body)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPatch {
    #[serde(rename = "categoryID", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

impl TransactionPatch {
    pub fn category(category_id: i64) -> Self {
        Self {
            category_id: Some(category_id),
            hidden: None,
        }
    }

    pub fn hidden(hidden: bool) -> Self {
        Self {
            category_id: None,
            hidden: Some(hidden),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.category_id.is_none() && self.hidden.is_none()
    }
}

/// Reporting interval bounded by income bookings rather than calendar days
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiscalMonth {
    /// Calendar month the interval belongs to (1-12)
    pub month: u32,
    pub year: i32,
    #[serde(with = "flexible_date")]
    pub start: NaiveDate,
    #[serde(with = "flexible_date")]
    pub end: NaiveDate,
}

/// Transactions of one category within the current interval
///
/// `category` is `None` for the unclassified bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTransactions {
    pub category: Option<Category>,
    pub transaction_list: TransactionList,
    pub sum: f64,
    /// Set once the fetch for this row has completed
    pub loaded: bool,
}

impl CategoryTransactions {
    /// Row whose fetch is still pending
    pub fn pending(category: Option<Category>) -> Self {
        Self {
            category,
            transaction_list: TransactionList::default(),
            sum: 0.0,
            loaded: false,
        }
    }

    pub fn complete(&mut self, list: TransactionList) {
        self.sum = list.sum;
        self.transaction_list = list;
        self.loaded = true;
    }

    pub fn is_unclassified(&self) -> bool {
        self.category.is_none()
    }

    pub fn category_id(&self) -> Option<i64> {
        self.category.as_ref().map(|c| c.id)
    }

    pub fn name(&self) -> &str {
        self.category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("Unclassified")
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Dates as `YYYY-MM-DD`, also accepting the backend's RFC 3339 timestamps
pub mod flexible_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveDate, String> {
        if let Ok(date) = NaiveDate::parse_from_str(raw, FORMAT) {
            return Ok(date);
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.date_naive())
            .map_err(|e| format!("Invalid date '{}': {}", raw, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(recipient: Option<&str>, booking_text: &str, purpose: Option<&str>) -> Transaction {
        Transaction {
            id: 1,
            booking_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            value_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            recipient: recipient.map(String::from),
            booking_text: booking_text.to_string(),
            purpose: purpose.map(String::from),
            balance: 0.0,
            amount: -10.0,
            category: None,
            hidden: false,
        }
    }

    fn rule(field: MappingField, regex: &str) -> CategoryRule {
        CategoryRule {
            id: 1,
            category_id: 2,
            description: None,
            regex: regex.to_string(),
            mapping_field: field,
        }
    }

    #[test]
    fn test_transaction_deserializes_backend_payload() {
        let json = r##"{
            "id": 42,
            "bookingDate": "2024-03-05T00:00:00Z",
            "valutaDate": "2024-03-06T00:00:00Z",
            "recipient": null,
            "bookingText": "Lastschrift",
            "purpose": "Miete",
            "balance": 1200.5,
            "amount": -800,
            "category": {"id": 3, "name": "Rent", "description": null, "color": "#ff0000"},
            "hidden": false
        }"##;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.id, 42);
        assert_eq!(tx.booking_date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(tx.value_date, NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
        assert_eq!(tx.recipient, None);
        assert_eq!(tx.category_id(), Some(3));
        assert_eq!(tx.label(), "Lastschrift");
    }

    #[test]
    fn test_transaction_accepts_value_date_alias() {
        let json = r#"{"id":1,"bookingDate":"2024-01-02","valueDate":"2024-01-03",
            "bookingText":"x","balance":0,"amount":1}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.value_date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert!(!tx.hidden);
    }

    #[test]
    fn test_transaction_list_null_items() {
        let list: TransactionList =
            serde_json::from_str(r#"{"items":null,"total":0,"sum":0}"#).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_transaction_list_from_items() {
        let mut a = tx(None, "a", None);
        a.amount = 100.0;
        let mut b = tx(None, "b", None);
        b.amount = -30.5;
        let list = TransactionList::from_items(vec![a, b]);
        assert_eq!(list.total, 2);
        assert!((list.sum - 69.5).abs() < 1e-9);
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let json = serde_json::to_string(&TransactionPatch::hidden(true)).unwrap();
        assert_eq!(json, r#"{"hidden":true}"#);
        let json = serde_json::to_string(&TransactionPatch::category(7)).unwrap();
        assert_eq!(json, r#"{"categoryID":7}"#);
        assert!(TransactionPatch::default().is_empty());
    }

    #[test]
    fn test_rule_matches_case_insensitive() {
        let t = tx(Some("REWE Markt GmbH"), "Lastschrift", None);
        assert!(rule(MappingField::Recipient, "rewe").matches(&t).unwrap());
        assert!(!rule(MappingField::BookingText, "rewe").matches(&t).unwrap());
    }

    #[test]
    fn test_rule_missing_field_never_matches() {
        let t = tx(None, "Gutschrift", None);
        assert!(!rule(MappingField::Purpose, ".*").matches(&t).unwrap());
        assert!(!rule(MappingField::Recipient, ".*").matches(&t).unwrap());
    }

    #[test]
    fn test_rule_invalid_regex_is_error() {
        let t = tx(Some("x"), "y", None);
        assert!(rule(MappingField::Recipient, "(").matches(&t).is_err());
    }

    #[test]
    fn test_category_matches_any_rule() {
        let mut category = Category::new(2, "Groceries");
        category.rules = vec![
            rule(MappingField::Purpose, "nope"),
            rule(MappingField::BookingText, "^kartenzahlung"),
        ];
        let t = tx(None, "Kartenzahlung", Some("EDEKA"));
        assert!(category.matches(&t).unwrap());
    }

    #[test]
    fn test_mapping_field_round_trip_str() {
        for field in [
            MappingField::Recipient,
            MappingField::BookingText,
            MappingField::Purpose,
        ] {
            assert_eq!(field.as_str().parse::<MappingField>().unwrap(), field);
        }
        assert!("amount".parse::<MappingField>().is_err());
    }

    #[test]
    fn test_category_rules_omitted_when_empty() {
        let json = serde_json::to_string(&Category::new(1, "Salary")).unwrap();
        assert!(!json.contains("rules"));
        let parsed: Category =
            serde_json::from_str(r#"{"id":1,"name":"Salary","rules":null}"#).unwrap();
        assert!(parsed.rules.is_empty());
    }

    #[test]
    fn test_category_transactions_pending_then_complete() {
        let mut row = CategoryTransactions::pending(None);
        assert!(!row.loaded);
        assert!(row.is_unclassified());
        assert_eq!(row.name(), "Unclassified");
        row.complete(TransactionList::from_items(vec![tx(None, "a", None)]));
        assert!(row.loaded);
        assert!((row.sum + 10.0).abs() < 1e-9);
    }
}
