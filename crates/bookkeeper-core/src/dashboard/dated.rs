//! Transaction list grouped by booking date

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::Transaction;

/// Bucket transactions by booking date. Buckets iterate in date order and
/// keep the input order within a day.
pub fn group_by_booking_date(transactions: &[Transaction]) -> BTreeMap<NaiveDate, Vec<Transaction>> {
    let mut dated: BTreeMap<NaiveDate, Vec<Transaction>> = BTreeMap::new();
    for transaction in transactions {
        dated
            .entry(transaction.booking_date)
            .or_default()
            .push(transaction.clone());
    }
    dated
}

/// Bucket key as displayed (`YYYY-MM-DD`)
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Net amount booked on each day
pub fn daily_totals(dated: &BTreeMap<NaiveDate, Vec<Transaction>>) -> Vec<(NaiveDate, f64)> {
    dated
        .iter()
        .map(|(date, items)| (*date, items.iter().map(|t| t.amount).sum()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: i64, day: u32, amount: f64) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2024, 4, day).unwrap();
        Transaction {
            id,
            booking_date: date,
            value_date: date,
            recipient: None,
            booking_text: format!("tx {}", id),
            purpose: None,
            balance: 0.0,
            amount,
            category: None,
            hidden: false,
        }
    }

    #[test]
    fn test_groups_by_day_keeping_order() {
        let txs = vec![tx(1, 5, -1.0), tx(2, 3, -2.0), tx(3, 5, -3.0), tx(4, 3, 10.0)];
        let dated = group_by_booking_date(&txs);

        let keys: Vec<String> = dated.keys().map(|d| date_key(*d)).collect();
        assert_eq!(keys, vec!["2024-04-03", "2024-04-05"]);

        let fifth = &dated[&NaiveDate::from_ymd_opt(2024, 4, 5).unwrap()];
        assert_eq!(fifth.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_booking_date(&[]).is_empty());
    }

    #[test]
    fn test_daily_totals() {
        let dated = group_by_booking_date(&[tx(1, 3, -2.0), tx(2, 3, 10.0), tx(3, 4, -1.5)]);
        let totals = daily_totals(&dated);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].1, 8.0);
        assert_eq!(totals[1].1, -1.5);
    }
}
