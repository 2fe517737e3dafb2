use rust_decimal::Decimal;
use serde::Serialize;

use super::{checked, CalculationInput};
use crate::error::CalculatorError;

/// Break-even ("no-loss") sell price and the intermediate terms of its solve
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoLossPrice {
    pub combined_tax_rate: Decimal,
    pub sell_rate_after_tax: Decimal,
    pub buy_cost_uah: Decimal,
    pub buy_cost_uah_after_tax: Decimal,
    pub break_even_sell_price_usd: Decimal,
    /// False when selling at the break-even price produces no taxable UAH gain
    pub taxed: bool,
}

/// Solve for the USD sell price whose after-tax proceeds equal the USD cost.
///
/// With `c` the combined rate, `b`/`s` the buy/sell rates and `p` the buy
/// price, the break-even price `x` satisfies
///
/// ```text
/// (x·s − (x·s − p·b)·c) / s = p
/// x = (p·s − c·p·b) / (s − c·s)
/// ```
///
/// That solve assumes the UAH gain at `x` is taxable. When the hryvnia has
/// not weakened since the buy (`s <= b`) selling at `p` already yields no
/// taxable gain, so the break-even price is `p` itself.
pub fn compute_no_loss_sell_price(
    input: &CalculationInput,
) -> Result<NoLossPrice, CalculatorError> {
    input.validate_common()?;

    let combined_tax_rate = input.tax.combined()?;
    if combined_tax_rate >= Decimal::ONE {
        let combined = match combined_tax_rate.checked_mul(Decimal::ONE_HUNDRED) {
            Some(pct) => pct.normalize().to_string(),
            None => format!("more than {}", Decimal::MAX),
        };
        return Err(CalculatorError::DegenerateTaxConfiguration { combined });
    }

    let buy_cost_uah = checked(input.buy_price_usd.checked_mul(input.buy_rate), "buy cost")?;
    let sell_rate_after_tax = checked(
        combined_tax_rate.checked_mul(input.sell_rate),
        "sell rate after tax",
    )?;
    let buy_cost_uah_after_tax = checked(
        combined_tax_rate.checked_mul(buy_cost_uah),
        "buy cost after tax",
    )?;

    if input.sell_rate <= input.buy_rate {
        return Ok(NoLossPrice {
            combined_tax_rate,
            sell_rate_after_tax,
            buy_cost_uah,
            buy_cost_uah_after_tax,
            break_even_sell_price_usd: input.buy_price_usd,
            taxed: false,
        });
    }

    let numerator = checked(
        input
            .buy_price_usd
            .checked_mul(input.sell_rate)
            .and_then(|v| v.checked_sub(buy_cost_uah_after_tax)),
        "break-even numerator",
    )?;
    let denominator = input.sell_rate - sell_rate_after_tax;
    // combined < 1 and sell rate > 0 keep this strictly positive
    let break_even_sell_price_usd = checked(
        numerator.checked_div(denominator),
        "break-even sell price",
    )?;

    Ok(NoLossPrice {
        combined_tax_rate,
        sell_rate_after_tax,
        buy_cost_uah,
        buy_cost_uah_after_tax,
        break_even_sell_price_usd,
        taxed: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::{compute_profit_loss, LevyPreset, TaxRates};
    use rust_decimal_macros::dec;

    fn legacy() -> TaxRates {
        TaxRates::with_levy(LevyPreset::Legacy)
    }

    #[test]
    fn test_break_even_when_hryvnia_weakens() {
        let input = CalculationInput::no_loss(dec!(36.5686), dec!(40), dec!(1000), legacy());
        let result = compute_no_loss_sell_price(&input).unwrap();

        assert_eq!(result.combined_tax_rate, dec!(0.195));
        assert_eq!(result.sell_rate_after_tax, dec!(7.8));
        assert_eq!(result.buy_cost_uah, dec!(36568.6));
        assert!(result.taxed);
        // (40000 - 7130.877) / 32.2
        assert_eq!(
            result.break_even_sell_price_usd.round_dp(2),
            dec!(1020.78)
        );
    }

    #[test]
    fn test_break_even_round_trips_through_profit_loss() {
        let input = CalculationInput::no_loss(dec!(36.5686), dec!(40), dec!(1000), legacy());
        let price = compute_no_loss_sell_price(&input)
            .unwrap()
            .break_even_sell_price_usd;

        let trade = CalculationInput::standard(
            input.buy_rate,
            input.sell_rate,
            input.buy_price_usd,
            price,
            input.tax,
        );
        let result = compute_profit_loss(&trade).unwrap();
        assert!(result.profit_loss_after_tax_usd.abs() < dec!(0.000001));
    }

    #[test]
    fn test_strengthened_hryvnia_breaks_even_at_buy_price() {
        let input = CalculationInput::no_loss(dec!(41), dec!(39), dec!(1000), legacy());
        let result = compute_no_loss_sell_price(&input).unwrap();

        assert!(!result.taxed);
        assert_eq!(result.break_even_sell_price_usd, dec!(1000));
    }

    #[test]
    fn test_unchanged_rate_breaks_even_at_buy_price() {
        let input = CalculationInput::no_loss(dec!(40), dec!(40), dec!(1000), legacy());
        let result = compute_no_loss_sell_price(&input).unwrap();
        assert_eq!(result.break_even_sell_price_usd, dec!(1000));
    }

    #[test]
    fn test_full_tax_is_degenerate() {
        let rates = TaxRates::new(dec!(0.95), dec!(0.05));
        let input = CalculationInput::no_loss(dec!(36.5686), dec!(40), dec!(1000), rates);
        let err = compute_no_loss_sell_price(&input).unwrap_err();
        assert_eq!(
            err,
            CalculatorError::DegenerateTaxConfiguration {
                combined: "100".to_string()
            }
        );
    }

    #[test]
    fn test_tax_above_full_is_degenerate() {
        let rates = TaxRates::new(dec!(1), dec!(0.05));
        let input = CalculationInput::no_loss(dec!(36.5686), dec!(40), dec!(1000), rates);
        assert!(matches!(
            compute_no_loss_sell_price(&input),
            Err(CalculatorError::DegenerateTaxConfiguration { .. })
        ));
    }

    #[test]
    fn test_huge_tax_rate_is_degenerate() {
        let rates = TaxRates::new(Decimal::MAX / dec!(50), Decimal::ZERO);
        let input = CalculationInput::no_loss(dec!(36.5686), dec!(40), dec!(1000), rates);
        match compute_no_loss_sell_price(&input) {
            Err(CalculatorError::DegenerateTaxConfiguration { combined }) => {
                assert!(combined.starts_with("more than "));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_overflowing_combined_rate_is_invalid_input() {
        let rates = TaxRates::new(Decimal::MAX, Decimal::MAX);
        let input = CalculationInput::no_loss(dec!(36.5686), dec!(40), dec!(1000), rates);
        assert!(matches!(
            compute_no_loss_sell_price(&input),
            Err(CalculatorError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_zero_tax_breaks_even_at_buy_price() {
        let rates = TaxRates::new(Decimal::ZERO, Decimal::ZERO);
        let input = CalculationInput::no_loss(dec!(36.5686), dec!(40), dec!(1000), rates);
        let result = compute_no_loss_sell_price(&input).unwrap();
        assert_eq!(result.break_even_sell_price_usd, dec!(1000));
    }
}
