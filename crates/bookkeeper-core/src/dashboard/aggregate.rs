//! Category breakdown rows
//!
//! One row per category plus a trailing unclassified bucket. Rows are
//! ordered by the magnitude of their sum and categories without a color get
//! one from the palette.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use crate::models::{Category, CategoryTransactions};

/// Pending rows for a load cycle: one per category, then the unclassified
/// bucket. A repeated category id keeps only its first row.
pub fn pending_rows(categories: &[Category]) -> Vec<CategoryTransactions> {
    let mut seen = HashSet::new();
    let mut rows: Vec<CategoryTransactions> = categories
        .iter()
        .filter(|c| seen.insert(c.id))
        .map(|c| CategoryTransactions::pending(Some(c.clone())))
        .collect();
    rows.push(CategoryTransactions::pending(None));
    rows
}

/// Order rows by absolute sum, largest first. Ties keep fetch order.
pub fn sort_rows(rows: &mut [CategoryTransactions]) {
    rows.sort_by(|a, b| {
        b.sum
            .abs()
            .partial_cmp(&a.sum.abs())
            .unwrap_or(Ordering::Equal)
    });
}

/// Give uncolored categories a palette color in row order.
///
/// Each new color is the first palette entry no category uses yet; once
/// the palette is exhausted it wraps by the number of colors handed out.
/// The color is also written to the matching entry of `categories`.
/// Colors already present are never replaced.
pub fn assign_colors(
    rows: &mut [CategoryTransactions],
    categories: &mut [Category],
    palette: &[&str],
) {
    if palette.is_empty() {
        return;
    }

    let mut used: HashSet<String> = categories.iter().filter_map(|c| c.color.clone()).collect();
    let mut assigned = 0;
    for row in rows.iter_mut() {
        let Some(category) = row.category.as_mut() else {
            continue;
        };
        if category.color.is_some() {
            continue;
        }

        // a category that already got a color in `categories` keeps it
        let existing = categories
            .iter()
            .find(|c| c.id == category.id)
            .and_then(|c| c.color.clone());
        let color = match existing {
            Some(color) => color,
            None => {
                let color = match palette.iter().find(|p| !used.contains(**p)) {
                    Some(free) => free.to_string(),
                    None => {
                        let reused = palette[assigned % palette.len()];
                        debug!("Palette exhausted, reusing {} for {}", reused, category.name);
                        reused.to_string()
                    }
                };
                assigned += 1;
                used.insert(color.clone());
                color
            }
        };

        if let Some(entry) = categories.iter_mut().find(|c| c.id == category.id) {
            entry.color = Some(color.clone());
        }
        category.color = Some(color);
    }
}

/// Keep colors handed out in an earlier cycle for refetched categories
/// the backend still returns uncolored
pub fn carry_colors(categories: &mut [Category], previous: &[Category]) {
    for category in categories.iter_mut().filter(|c| c.color.is_none()) {
        category.color = previous
            .iter()
            .find(|p| p.id == category.id)
            .and_then(|p| p.color.clone());
    }
}

/// Sort rows and assign colors
pub fn emit(rows: &mut [CategoryTransactions], categories: &mut [Category], palette: &[&str]) {
    sort_rows(rows);
    assign_colors(rows, categories, palette);
}

/// True once every row's fetch has completed
pub fn all_loaded(rows: &[CategoryTransactions]) -> bool {
    rows.iter().all(|r| r.loaded)
}
