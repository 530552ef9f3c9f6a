//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the content hash for style.css, computed at build time.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// Formats an amount as dollars with two decimals.
///
/// Usage in templates: `{{ order.total_amount|money }}`
#[askama::filter_fn]
pub fn money(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_money(&value))
}

/// Formats a mean rating with one decimal.
///
/// Usage in templates: `{{ product.rating|stars }}`
#[askama::filter_fn]
pub fn stars(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format!("{value:.1}"))
}

fn format_money(value: &impl Display) -> String {
    format!("${value:.2}")
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_format_money_pads_cents() {
        assert_eq!(format_money(&Decimal::new(25, 0)), "$25.00");
        assert_eq!(format_money(&Decimal::new(2_999, 2)), "$29.99");
    }
}
