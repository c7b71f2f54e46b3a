//! Text to typed-value conversions for scraped fields

use crate::error::{CatalogError, Result};
use crate::models::FieldKind;

const CURRENCY_MARKER: &str = "IDR";
const PROMO_KEYWORD: &str = "Earn";
const THOUSANDS_SEPARATOR: char = ',';
const WISHLIST_SUFFIX: &str = "Wishlist";

/// Collapses every whitespace run to a single space and trims both ends.
pub fn normalize_title(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `"IDR 12,000 Earn 120 points"` -> `12000`
pub fn normalize_price(text: &str) -> Result<i64> {
    let stripped = text.replace(CURRENCY_MARKER, "");
    let amount = stripped
        .split(PROMO_KEYWORD)
        .next()
        .unwrap_or_default()
        .trim()
        .replace(THOUSANDS_SEPARATOR, "");

    parse_count(FieldKind::Price, &amount, text)
}

/// `"57 Wishlist"` -> `57`
pub fn normalize_wishlist(text: &str) -> Result<i64> {
    let count = text.split(WISHLIST_SUFFIX).next().unwrap_or_default().trim();

    parse_count(FieldKind::Wishlist, count, text)
}

fn parse_count(field: FieldKind, digits: &str, original: &str) -> Result<i64> {
    match digits.trim().parse::<i64>() {
        Ok(value) if value >= 0 => Ok(value),
        _ => Err(CatalogError::MalformedField {
            field,
            text: original.to_string(),
        }),
    }
}
