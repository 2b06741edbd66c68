//! Category display colors

use crate::models::Category;

/// Color for transactions without a (colored) category
pub const DEFAULT_COLOR: &str = "#64748b";

/// Palette handed out to categories the backend did not color, in order
pub const CATEGORY_PALETTE: &[&str] = &[
    "#6366f1", "#f59e0b", "#10b981", "#ef4444", "#8b5cf6", "#06b6d4", "#ec4899", "#84cc16",
    "#f97316", "#14b8a6", "#a855f7", "#d946ef",
];

/// Color of category `id`, or [`DEFAULT_COLOR`] when the id is missing,
/// unknown, or the category has no color yet
pub fn category_color(categories: &[Category], id: Option<i64>) -> &str {
    id.and_then(|id| categories.iter().find(|c| c.id == id))
        .and_then(|c| c.color.as_deref())
        .unwrap_or(DEFAULT_COLOR)
}

/// Parse `#rrggbb` into RGB components
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_color_lookup() {
        let categories = vec![
            Category::new(1, "Salary").with_color("#22c55e"),
            Category::new(2, "Rent"),
        ];
        assert_eq!(category_color(&categories, Some(1)), "#22c55e");
        assert_eq!(category_color(&categories, Some(2)), DEFAULT_COLOR);
        assert_eq!(category_color(&categories, Some(3)), DEFAULT_COLOR);
        assert_eq!(category_color(&categories, None), DEFAULT_COLOR);
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#64748b"), Some((0x64, 0x74, 0x8b)));
        assert_eq!(hex_to_rgb("64748b"), None);
        assert_eq!(hex_to_rgb("#fff"), None);
        assert_eq!(hex_to_rgb("#zzzzzz"), None);
    }

    #[test]
    fn test_palette_entries_are_valid() {
        assert!(CATEGORY_PALETTE.iter().all(|c| hex_to_rgb(c).is_some()));
    }
}
