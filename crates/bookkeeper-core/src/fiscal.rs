//! Fiscal month boundaries
//!
//! A fiscal month starts on the booking date of the first income that lands
//! close to the first of the calendar month (salary paid a few days early
//! still opens the next month). It ends the day before the following fiscal
//! month starts. The backend owns this computation; the mock backend uses
//! this module so offline data behaves the same way.

use chrono::{Days, NaiveDate};

use crate::models::{FiscalMonth, Transaction};
use crate::period::MonthCursor;

/// Incomes booked this many days (or more) before the 1st are ignored
pub const EARLY_INCOME_CUTOFF_DAYS: i64 = 15;

/// Range of income bookings needed to compute the fiscal month:
/// first day of the previous month through the last day of the next month
pub fn income_window(cursor: MonthCursor) -> (NaiveDate, NaiveDate) {
    (cursor.previous().first_day(), cursor.next().last_day())
}

/// Start of the fiscal month; `income` must be sorted by booking date
pub fn fiscal_start(cursor: MonthCursor, income: &[Transaction]) -> NaiveDate {
    let start_of_month = cursor.first_day();

    income
        .iter()
        .map(|t| t.booking_date)
        .find(|date| {
            let distance = (*date - start_of_month).num_days();
            !(distance < 0 && distance.abs() >= EARLY_INCOME_CUTOFF_DAYS)
        })
        .unwrap_or(start_of_month)
}

/// Fiscal month for `cursor` given the surrounding income bookings
pub fn fiscal_month(cursor: MonthCursor, income: &[Transaction]) -> FiscalMonth {
    let start = fiscal_start(cursor, income);
    let next_start = fiscal_start(cursor.next(), income);
    let end = next_start
        .checked_sub_days(Days::new(1))
        .unwrap_or(next_start);

    FiscalMonth {
        month: cursor.month(),
        year: cursor.year(),
        start,
        end,
    }
}

/// Calendar-aligned fallback when no income information is available
pub fn calendar_month(cursor: MonthCursor) -> FiscalMonth {
    FiscalMonth {
        month: cursor.month(),
        year: cursor.year(),
        start: cursor.first_day(),
        end: cursor.last_day(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn income(y: i32, m: u32, d: u32) -> Transaction {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        Transaction {
            id: 0,
            booking_date: date,
            value_date: date,
            recipient: Some("Employer".into()),
            booking_text: "Gehalt".into(),
            purpose: None,
            balance: 0.0,
            amount: 3000.0,
            category: None,
            hidden: false,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_no_income_falls_back_to_calendar() {
        let cursor = MonthCursor::new(4, 2024).unwrap();
        let fm = fiscal_month(cursor, &[]);
        assert_eq!(fm.start, date(2024, 4, 1));
        assert_eq!(fm.end, date(2024, 4, 30));
        assert_eq!(fm, calendar_month(cursor));
    }

    #[test]
    fn test_early_salary_opens_month() {
        let cursor = MonthCursor::new(4, 2024).unwrap();
        let incomes = vec![income(2024, 3, 28), income(2024, 4, 29)];
        let fm = fiscal_month(cursor, &incomes);
        assert_eq!(fm.start, date(2024, 3, 28));
        // next month starts with the April 29 salary
        assert_eq!(fm.end, date(2024, 4, 28));
    }

    #[test]
    fn test_income_fifteen_days_early_is_ignored() {
        let cursor = MonthCursor::new(4, 2024).unwrap();
        // March 17 is exactly 15 days before April 1
        let incomes = vec![income(2024, 3, 17), income(2024, 4, 3)];
        assert_eq!(fiscal_start(cursor, &incomes), date(2024, 4, 3));

        // 14 days early still counts
        let incomes = vec![income(2024, 3, 18)];
        assert_eq!(fiscal_start(cursor, &incomes), date(2024, 3, 18));
    }

    #[test]
    fn test_income_window() {
        let (from, to) = income_window(MonthCursor::new(1, 2024).unwrap());
        assert_eq!(from, date(2023, 12, 1));
        assert_eq!(to, date(2024, 2, 29));
    }

    #[test]
    fn test_december_rolls_into_january() {
        let cursor = MonthCursor::new(12, 2023).unwrap();
        let incomes = vec![income(2023, 11, 30), income(2023, 12, 29)];
        let fm = fiscal_month(cursor, &incomes);
        assert_eq!(fm.start, date(2023, 11, 30));
        assert_eq!(fm.end, date(2023, 12, 28));
        assert_eq!((fm.month, fm.year), (12, 2023));
    }
}
