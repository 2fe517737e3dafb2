//! Presentation-time rounding and formatting
//!
//! Calculations keep full precision; everything shown to the user goes
//! through here. Amounts are rounded to 2 decimal places and exchange rates
//! to 4, midpoint away from zero.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places shown for USD and UAH amounts
pub const AMOUNT_DP: u32 = 2;
/// Decimal places shown for exchange rates
pub const RATE_DP: u32 = 4;

/// Currency suffix options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol {
    Usd,
    Uah,
    /// No suffix (table cells already labeled with the currency)
    None,
}

impl CurrencySymbol {
    fn suffix(self) -> &'static str {
        match self {
            CurrencySymbol::Usd => " USD",
            CurrencySymbol::Uah => " UAH",
            CurrencySymbol::None => "",
        }
    }
}

/// Round for display, midpoint away from zero
pub fn round_display(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to the displayed amount precision, keeping trailing zeros ("200.00")
pub fn display_amount(value: Decimal) -> String {
    fixed(value, AMOUNT_DP)
}

/// Round to the displayed rate precision ("36.5686")
pub fn display_rate(value: Decimal) -> String {
    fixed(value, RATE_DP)
}

fn fixed(value: Decimal, dp: u32) -> String {
    let mut rounded = round_display(value, dp);
    rounded.rescale(dp);
    // -0.00 reads as a loss
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.to_string()
}

/// Core formatting function with full control over output.
///
/// Uses `,` as thousands separator and `.` as decimal separator.
///
/// # Examples
/// ```
/// use nbu_pnl::utils::{format_money_with_width, CurrencySymbol};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(
///     format_money_with_width(dec!(7313.72), 0, CurrencySymbol::Uah),
///     "7,313.72 UAH"
/// );
///
/// assert_eq!(
///     format_money_with_width(dec!(1234), 12, CurrencySymbol::None),
///     "    1,234.00"
/// );
/// ```
pub fn format_money_with_width(value: Decimal, width: usize, symbol: CurrencySymbol) -> String {
    let formatted = display_amount(value);
    let (sign, digits) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };
    let (integer_part, decimal_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let result = format!(
        "{}{}.{}{}",
        sign,
        with_separators,
        decimal_part,
        symbol.suffix()
    );

    if width > 0 && result.len() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

/// "1,234.56 USD"
///
/// # Examples
/// ```
/// use nbu_pnl::utils::format_usd;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_usd(dec!(160.995)), "161.00 USD");
/// assert_eq!(format_usd(dec!(-100)), "-100.00 USD");
/// ```
pub fn format_usd(value: Decimal) -> String {
    format_money_with_width(value, 0, CurrencySymbol::Usd)
}

/// "43,882.32 UAH"
pub fn format_uah(value: Decimal) -> String {
    format_money_with_width(value, 0, CurrencySymbol::Uah)
}

/// Percent with two decimals from a fraction: 0.015 -> "1.50"
pub fn format_percent(fraction: Decimal) -> String {
    match fraction.checked_mul(Decimal::ONE_HUNDRED) {
        Some(pct) => display_amount(pct),
        None => fraction.to_string(),
    }
}
