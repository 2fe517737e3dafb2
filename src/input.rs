//! Typed input boundary
//!
//! Raw strings from the command line are parsed and validated here, so the
//! calculator only ever sees positive decimals and real dates.

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::CalculatorError;

/// Plain unsigned decimal: digits with at most one dot, no sign or exponent
fn numeric_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d*\.?\d*$").expect("numeric pattern is valid"))
}

fn parse_unsigned(field: &str, raw: &str) -> Result<Decimal, CalculatorError> {
    let value = raw.trim();
    if value.is_empty() || value == "." || !numeric_pattern().is_match(value) {
        return Err(CalculatorError::InvalidInput(format!(
            "{} must be a plain number like 1234.56 (got '{}')",
            field, raw
        )));
    }
    // "12." and ".5" are valid keystroke states; give the decimal parser "12" and "0.5"
    let canonical = format!("0{}", value.trim_end_matches('.'));
    Decimal::from_str(&canonical).map_err(|e| {
        CalculatorError::InvalidInput(format!("{} '{}' is not a valid number: {}", field, raw, e))
    })
}

/// Parse a USD price; must be strictly positive
pub fn parse_price(field: &str, raw: &str) -> Result<Decimal, CalculatorError> {
    let value = parse_unsigned(field, raw)?;
    if value.is_zero() {
        return Err(CalculatorError::InvalidInput(format!(
            "{} must be greater than zero",
            field
        )));
    }
    Ok(value)
}

/// Parse an exchange rate in UAH per USD; must be strictly positive
pub fn parse_rate(field: &str, raw: &str) -> Result<Decimal, CalculatorError> {
    parse_price(field, raw)
}

/// Parse a percentage ("18", "1.5") into a fraction (0.18, 0.015)
pub fn parse_percent(field: &str, raw: &str) -> Result<Decimal, CalculatorError> {
    let value = parse_unsigned(field, raw.trim().trim_end_matches('%'))?;
    if value > Decimal::ONE_HUNDRED {
        return Err(CalculatorError::InvalidInput(format!(
            "{} cannot exceed 100% (got {}%)",
            field, value
        )));
    }
    Ok(value / Decimal::ONE_HUNDRED)
}

/// Parse a trade date: `YYYY-MM-DD`, or `DD.MM.YYYY` as the NBU prints them.
///
/// Dates after `today` are rejected, as no official rate exists for them.
pub fn parse_date(field: &str, raw: &str, today: NaiveDate) -> Result<NaiveDate, CalculatorError> {
    let value = raw.trim();
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d.%m.%Y"))
        .map_err(|_| {
            CalculatorError::InvalidInput(format!(
                "invalid {} '{}'. Use YYYY-MM-DD or DD.MM.YYYY",
                field, raw
            ))
        })?;

    if date > today {
        return Err(CalculatorError::InvalidInput(format!(
            "{} {} is in the future (today is {})",
            field, date, today
        )));
    }
    Ok(date)
}

/// A sale cannot be dated before its purchase
pub fn validate_date_order(buy: NaiveDate, sell: NaiveDate) -> Result<(), CalculatorError> {
    if sell < buy {
        return Err(CalculatorError::InvalidInput(format!(
            "sell date {} is before buy date {}",
            sell, buy
        )));
    }
    Ok(())
}
