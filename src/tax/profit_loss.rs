use rust_decimal::Decimal;
use serde::Serialize;

use super::{checked, require_positive, CalculationInput};
use crate::error::CalculatorError;

/// Realized profit/loss of a USD trade, in both currencies.
///
/// All values are unrounded; presentation rounds them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfitLoss {
    pub buy_cost_uah: Decimal,
    pub sell_proceeds_uah: Decimal,
    pub profit_loss_uah: Decimal,
    pub profit_loss_usd: Decimal,
    pub income_tax_uah: Decimal,
    pub military_tax_uah: Decimal,
    pub total_tax_uah: Decimal,
    pub tax_usd: Decimal,
    pub profit_loss_after_tax_usd: Decimal,
}

impl ProfitLoss {
    pub fn is_taxed(&self) -> bool {
        self.total_tax_uah > Decimal::ZERO
    }
}

/// Compute gross and after-tax profit/loss for a buy/sell pair.
///
/// Tax is levied on the UAH gain only when it is strictly positive. A USD
/// gain can still be a UAH loss (and vice versa) when the hryvnia moved
/// between the two dates.
pub fn compute_profit_loss(input: &CalculationInput) -> Result<ProfitLoss, CalculatorError> {
    input.validate_common()?;
    let sell_price_usd = input.sell_price_usd.ok_or_else(|| {
        CalculatorError::InvalidInput("sell price is required for a profit/loss calculation".into())
    })?;
    require_positive("sell price", sell_price_usd)?;

    let buy_cost_uah = checked(input.buy_price_usd.checked_mul(input.buy_rate), "buy cost")?;
    let sell_proceeds_uah = checked(sell_price_usd.checked_mul(input.sell_rate), "sell proceeds")?;
    let profit_loss_uah = checked(
        sell_proceeds_uah.checked_sub(buy_cost_uah),
        "profit/loss in UAH",
    )?;
    let profit_loss_usd = checked(
        sell_price_usd.checked_sub(input.buy_price_usd),
        "profit/loss in USD",
    )?;

    if profit_loss_uah <= Decimal::ZERO {
        return Ok(ProfitLoss {
            buy_cost_uah,
            sell_proceeds_uah,
            profit_loss_uah,
            profit_loss_usd,
            income_tax_uah: Decimal::ZERO,
            military_tax_uah: Decimal::ZERO,
            total_tax_uah: Decimal::ZERO,
            tax_usd: Decimal::ZERO,
            profit_loss_after_tax_usd: profit_loss_usd,
        });
    }

    let income_tax_uah = checked(profit_loss_uah.checked_mul(input.tax.income), "income tax")?;
    let military_tax_uah = checked(
        profit_loss_uah.checked_mul(input.tax.military),
        "military tax",
    )?;
    let total_tax_uah = checked(income_tax_uah.checked_add(military_tax_uah), "total tax")?;
    let tax_usd = checked(total_tax_uah.checked_div(input.sell_rate), "tax in USD")?;
    let profit_loss_after_tax_usd = checked(
        profit_loss_usd.checked_sub(tax_usd),
        "after-tax profit/loss",
    )?;

    Ok(ProfitLoss {
        buy_cost_uah,
        sell_proceeds_uah,
        profit_loss_uah,
        profit_loss_usd,
        income_tax_uah,
        military_tax_uah,
        total_tax_uah,
        tax_usd,
        profit_loss_after_tax_usd,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::{LevyPreset, TaxRates};
    use rust_decimal_macros::dec;

    fn legacy() -> TaxRates {
        TaxRates::with_levy(LevyPreset::Legacy)
    }

    #[test]
    fn test_profit_same_rate() {
        let input = CalculationInput::standard(
            dec!(36.5686),
            dec!(36.5686),
            dec!(1000),
            dec!(1200),
            legacy(),
        );
        let result = compute_profit_loss(&input).unwrap();

        assert_eq!(result.buy_cost_uah, dec!(36568.6));
        assert_eq!(result.sell_proceeds_uah, dec!(43882.32));
        assert_eq!(result.profit_loss_usd, dec!(200));
        assert_eq!(result.profit_loss_uah, dec!(7313.72));
        assert_eq!(result.income_tax_uah, dec!(1316.4696));
        assert_eq!(result.military_tax_uah, dec!(109.7058));
        assert_eq!(result.total_tax_uah, dec!(1426.1754));
        assert_eq!(result.tax_usd, dec!(39));
        assert_eq!(result.profit_loss_after_tax_usd, dec!(161));
        assert!(result.is_taxed());
    }

    #[test]
    fn test_loss_is_not_taxed() {
        let input = CalculationInput::standard(
            dec!(36.5686),
            dec!(36.5686),
            dec!(1000),
            dec!(900),
            legacy(),
        );
        let result = compute_profit_loss(&input).unwrap();

        assert!(result.profit_loss_uah < Decimal::ZERO);
        assert_eq!(result.total_tax_uah, Decimal::ZERO);
        assert_eq!(result.income_tax_uah, Decimal::ZERO);
        assert_eq!(result.military_tax_uah, Decimal::ZERO);
        assert_eq!(result.tax_usd, Decimal::ZERO);
        assert_eq!(result.profit_loss_after_tax_usd, dec!(-100));
        assert!(!result.is_taxed());
    }

    #[test]
    fn test_exact_break_even_is_not_taxed() {
        // 1000 * 40 == 1250 * 32
        let input =
            CalculationInput::standard(dec!(40), dec!(32), dec!(1000), dec!(1250), legacy());
        let result = compute_profit_loss(&input).unwrap();

        assert_eq!(result.profit_loss_uah, Decimal::ZERO);
        assert_eq!(result.total_tax_uah, Decimal::ZERO);
        assert_eq!(result.profit_loss_after_tax_usd, dec!(250));
    }

    #[test]
    fn test_currency_gain_taxed_even_with_usd_loss() {
        // Price fell in USD but the hryvnia devalued more
        let input =
            CalculationInput::standard(dec!(27), dec!(41), dec!(1000), dec!(950), legacy());
        let result = compute_profit_loss(&input).unwrap();

        assert_eq!(result.profit_loss_usd, dec!(-50));
        assert_eq!(result.profit_loss_uah, dec!(11950));
        assert!(result.is_taxed());
        assert!(result.profit_loss_after_tax_usd < dec!(-50));
    }

    #[test]
    fn test_missing_sell_price_rejected() {
        let input = CalculationInput::no_loss(dec!(40), dec!(40), dec!(1000), legacy());
        assert!(matches!(
            compute_profit_loss(&input),
            Err(CalculatorError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_non_positive_inputs_rejected() {
        let cases = [
            (dec!(0), dec!(40), dec!(1000), dec!(1100)),
            (dec!(40), dec!(-1), dec!(1000), dec!(1100)),
            (dec!(40), dec!(40), dec!(0), dec!(1100)),
            (dec!(40), dec!(40), dec!(1000), dec!(0)),
        ];
        for (buy_rate, sell_rate, buy, sell) in cases {
            let input = CalculationInput::standard(buy_rate, sell_rate, buy, sell, legacy());
            assert!(
                matches!(compute_profit_loss(&input), Err(CalculatorError::InvalidInput(_))),
                "expected rejection for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_overflow_reported_not_panicking() {
        let input =
            CalculationInput::standard(Decimal::MAX, dec!(40), dec!(1000), dec!(1100), legacy());
        assert!(matches!(
            compute_profit_loss(&input),
            Err(CalculatorError::InvalidInput(_))
        ));
    }
}
