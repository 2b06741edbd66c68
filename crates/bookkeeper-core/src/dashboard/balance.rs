//! Balance overview: income against expense categories

use serde::Serialize;

use crate::models::CategoryTransactions;

/// Sum of all rows with a positive balance
pub fn income_sum(rows: &[CategoryTransactions]) -> f64 {
    rows.iter().filter(|r| r.sum > 0.0).map(|r| r.sum).sum()
}

/// Rows with a negative balance, in row order
pub fn expense_rows(rows: &[CategoryTransactions]) -> Vec<&CategoryTransactions> {
    rows.iter().filter(|r| r.sum < 0.0).collect()
}

/// Total spending as a positive number
pub fn expense_sum(rows: &[CategoryTransactions]) -> f64 {
    expense_rows(rows).iter().map(|r| r.sum).sum::<f64>().abs()
}

/// Share of income consumed by `row`, in percent. Zero when there is no income.
pub fn expense_percentage(row: &CategoryTransactions, rows: &[CategoryTransactions]) -> f64 {
    percentage_of(row.sum, income_sum(rows))
}

fn percentage_of(amount: f64, income: f64) -> f64 {
    if income > 0.0 {
        amount.abs() / income * 100.0
    } else {
        0.0
    }
}

/// One expense category in the overview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseShare {
    pub name: String,
    pub category_id: Option<i64>,
    pub color: Option<String>,
    /// Positive amount spent
    pub amount: f64,
    pub percentage: f64,
}

/// Snapshot of the balance overview for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceOverview {
    pub income: f64,
    pub expenses: f64,
    /// income - expenses
    pub balance: f64,
    pub expense_shares: Vec<ExpenseShare>,
}

impl BalanceOverview {
    pub fn from_rows(rows: &[CategoryTransactions]) -> Self {
        let income = income_sum(rows);
        let expenses = expense_sum(rows);
        let expense_shares = expense_rows(rows)
            .into_iter()
            .map(|row| ExpenseShare {
                name: row.name().to_string(),
                category_id: row.category_id(),
                color: row.category.as_ref().and_then(|c| c.color.clone()),
                amount: row.sum.abs(),
                percentage: percentage_of(row.sum, income),
            })
            .collect();

        Self {
            income,
            expenses,
            balance: income - expenses,
            expense_shares,
        }
    }

    /// Share of income not yet spent, in percent (negative when overspent)
    pub fn savings_rate(&self) -> f64 {
        if self.income > 0.0 {
            self.balance / self.income * 100.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, TransactionList};

    fn row(category: Option<Category>, sum: f64) -> CategoryTransactions {
        let mut row = CategoryTransactions::pending(category);
        row.complete(TransactionList {
            items: Vec::new(),
            total: 0,
            sum,
        });
        row
    }

    fn rows() -> Vec<CategoryTransactions> {
        vec![
            row(Some(Category::new(1, "Salary")), 3000.0),
            row(Some(Category::new(2, "Rent").with_color("#6366f1")), -900.0),
            row(Some(Category::new(3, "Refunds")), 200.0),
            row(None, -300.0),
            row(Some(Category::new(4, "Empty")), 0.0),
        ]
    }

    #[test]
    fn test_income_and_expense_sums() {
        let rows = rows();
        assert_eq!(income_sum(&rows), 3200.0);
        assert_eq!(expense_sum(&rows), 1200.0);
        assert_eq!(expense_rows(&rows).len(), 2);
    }

    #[test]
    fn test_expense_percentage_uses_absolute_sum() {
        let rows = rows();
        let rent = &rows[1];
        assert!((expense_percentage(rent, &rows) - 28.125).abs() < 1e-9);
    }

    #[test]
    fn test_zero_income_gives_zero_percent() {
        let rows = vec![row(None, -50.0)];
        assert_eq!(expense_percentage(&rows[0], &rows), 0.0);
        let overview = BalanceOverview::from_rows(&rows);
        assert_eq!(overview.savings_rate(), 0.0);
        assert_eq!(overview.balance, -50.0);
    }

    #[test]
    fn test_overview_snapshot() {
        let overview = BalanceOverview::from_rows(&rows());
        assert_eq!(overview.income, 3200.0);
        assert_eq!(overview.expenses, 1200.0);
        assert_eq!(overview.balance, 2000.0);
        assert_eq!(overview.expense_shares.len(), 2);
        assert_eq!(overview.expense_shares[0].name, "Rent");
        assert_eq!(overview.expense_shares[0].color.as_deref(), Some("#6366f1"));
        assert_eq!(overview.expense_shares[1].name, "Unclassified");
        assert_eq!(overview.expense_shares[1].amount, 300.0);
        assert!((overview.savings_rate() - 62.5).abs() < 1e-9);
    }
}
