//! Month navigation for the dashboard

use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{Error, Result};

/// The calendar month the dashboard is looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MonthCursor {
    /// 1-12
    month: u32,
    year: i32,
}

impl MonthCursor {
    pub fn new(month: u32, year: i32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidData(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }
        Ok(Self { month, year })
    }

    /// Month containing today's date (UTC)
    pub fn current() -> Self {
        Self::containing(Utc::now().date_naive())
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            year: date.year(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Move by `count` months, carrying into neighbouring years
    pub fn shift(&self, count: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + count;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn next(&self) -> Self {
        self.shift(1)
    }

    pub fn previous(&self) -> Self {
        self.shift(-1)
    }

    pub fn first_day(&self) -> NaiveDate {
        // month is validated to 1-12, so day 1 always exists
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap_or_default()
    }
}

impl std::fmt::Display for MonthCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.first_day().format("%B %Y"))
    }
}
