//! Brazilian (pt-BR) number parsing and formatting.
//!
//! Form fields arrive as display strings such as `"R$ 1.234,56"` or `"17,5"`.
//! They must be converted here before reaching any calculator, and results
//! are converted back with [`format_brl`] and [`format_percent`].

use rust_decimal::Decimal;
use thiserror::Error;

use crate::calculations::common::round_half_up;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Normalizes pt-BR input for decimal parsing.
///
/// Strips the currency symbol, a trailing `%` and all whitespace. With a comma
/// present, dots are thousands separators and the comma is the decimal mark.
/// Without one, dots are thousands separators only when they split the digits
/// into groups of three (`"1.234"`); otherwise a single dot is a decimal point
/// (`"17.5"`).
fn normalize_decimal_input(s: &str) -> String {
    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix("R$").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed);
    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();

    if compact.contains(',') {
        compact.replace('.', "").replacen(',', ".", 1)
    } else if has_thousands_groups(&compact) {
        compact.replace('.', "")
    } else {
        compact
    }
}

fn has_thousands_groups(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let mut groups = digits.split('.');
    let head = groups.next().unwrap_or_default();
    let tail: Vec<&str> = groups.collect();

    !tail.is_empty()
        && (1..=3).contains(&head.len())
        && !head.starts_with('0')
        && tail
            .iter()
            .all(|group| group.len() == 3 && group.chars().all(|c| c.is_ascii_digit()))
}

/// Parses a pt-BR formatted string into a [`Decimal`].
///
/// Empty or whitespace-only input is treated as 0.
/// Returns an error when the input is non-empty but not parseable.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use icms_core::locale::parse_decimal;
///
/// assert_eq!(parse_decimal("1.234,56").unwrap(), dec!(1234.56));
/// assert_eq!(parse_decimal("R$ 99,90").unwrap(), dec!(99.90));
/// assert_eq!(parse_decimal("17,5%").unwrap(), dec!(17.5));
/// assert_eq!(parse_decimal("").unwrap(), dec!(0));
/// ```
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| ParseDecimalError {
        input: s.to_string(),
        source: e,
    })
}

/// Parses a pt-BR formatted string, coercing anything unparseable to 0.
///
/// Logs a warning on parse failure; the calculators then see the field as
/// not filled in yet.
pub fn parse_or_zero(s: &str) -> Decimal {
    parse_decimal(s).unwrap_or_else(|e| {
        tracing::warn!(input = %s, "unparseable number treated as zero: {}", e);
        Decimal::ZERO
    })
}

/// Parses a monetary amount with [`parse_or_zero`], clamping negatives to 0.
///
/// Goods, freight, expenses, IPI, cost and sale price cannot be negative.
pub fn parse_amount(s: &str) -> Decimal {
    let value = parse_or_zero(s);
    if value < Decimal::ZERO {
        tracing::warn!(input = %s, "negative amount treated as zero");
        return Decimal::ZERO;
    }
    value
}

/// Formats an amount as pt-BR currency without the symbol: `"1.234,56"`.
///
/// The value is rounded to cents first.
pub fn format_brl(value: Decimal) -> String {
    let rounded = round_half_up(value);
    let negative = rounded < Decimal::ZERO;
    let text = format!("{:.2}", rounded.abs());
    let (integer, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped},{cents}")
}

/// Formats a percentage with a decimal comma and no trailing zeros: `"17,5%"`.
pub fn format_percent(value: Decimal) -> String {
    format!("{}%", value.normalize().to_string().replace('.', ","))
}
