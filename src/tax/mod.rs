// Tax module - Ukrainian capital gains tax on USD trades (income tax + military levy)

pub mod no_loss;
pub mod profit_loss;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CalculatorError;

pub use no_loss::{compute_no_loss_sell_price, NoLossPrice};
pub use profit_loss::{compute_profit_loss, ProfitLoss};

/// Personal income tax rate on investment gains (18%)
pub const DEFAULT_INCOME_TAX_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

/// Military levy presets.
///
/// The levy was raised from 1.5% to 5% in December 2024; which one applies
/// depends on when the gain was realized, so it is chosen explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevyPreset {
    /// 5% levy
    #[default]
    Current,
    /// 1.5% levy
    Legacy,
}

impl LevyPreset {
    pub fn rate(self) -> Decimal {
        match self {
            LevyPreset::Current => Decimal::from_parts(5, 0, 0, false, 2),
            LevyPreset::Legacy => Decimal::from_parts(15, 0, 0, false, 3),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LevyPreset::Current => "current",
            LevyPreset::Legacy => "legacy",
        }
    }
}

impl fmt::Display for LevyPreset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LevyPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "current" | "5" => Ok(LevyPreset::Current),
            "legacy" | "1.5" => Ok(LevyPreset::Legacy),
            other => Err(format!(
                "unknown levy preset '{}' (expected 'current' or 'legacy')",
                other
            )),
        }
    }
}

/// Tax rates applied to a UAH gain, as fractions (0.18 = 18%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaxRates {
    pub income: Decimal,
    pub military: Decimal,
}

impl Default for TaxRates {
    fn default() -> Self {
        Self::with_levy(LevyPreset::default())
    }
}

impl TaxRates {
    pub fn new(income: Decimal, military: Decimal) -> Self {
        Self { income, military }
    }

    pub fn with_levy(preset: LevyPreset) -> Self {
        Self {
            income: DEFAULT_INCOME_TAX_RATE,
            military: preset.rate(),
        }
    }

    /// Income tax plus military levy
    pub fn combined(&self) -> Result<Decimal, CalculatorError> {
        checked(self.income.checked_add(self.military), "combined tax rate")
    }

    fn validate(&self) -> Result<(), CalculatorError> {
        if self.income.is_sign_negative() || self.military.is_sign_negative() {
            return Err(CalculatorError::InvalidInput(
                "tax rates cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Which quantity the calculation solves for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Realized profit/loss for a known sell price
    Standard,
    /// Break-even sell price for a known buy
    NoLoss,
}

/// Immutable inputs of a single calculation.
///
/// Rates are UAH per 1 USD on the buy and sell dates. `sell_price_usd` is
/// only present in [`Mode::Standard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculationInput {
    pub buy_rate: Decimal,
    pub sell_rate: Decimal,
    pub buy_price_usd: Decimal,
    pub sell_price_usd: Option<Decimal>,
    pub tax: TaxRates,
    pub mode: Mode,
}

impl CalculationInput {
    pub fn standard(
        buy_rate: Decimal,
        sell_rate: Decimal,
        buy_price_usd: Decimal,
        sell_price_usd: Decimal,
        tax: TaxRates,
    ) -> Self {
        Self {
            buy_rate,
            sell_rate,
            buy_price_usd,
            sell_price_usd: Some(sell_price_usd),
            tax,
            mode: Mode::Standard,
        }
    }

    pub fn no_loss(
        buy_rate: Decimal,
        sell_rate: Decimal,
        buy_price_usd: Decimal,
        tax: TaxRates,
    ) -> Self {
        Self {
            buy_rate,
            sell_rate,
            buy_price_usd,
            sell_price_usd: None,
            tax,
            mode: Mode::NoLoss,
        }
    }

    /// Check the fields every mode depends on
    fn validate_common(&self) -> Result<(), CalculatorError> {
        require_positive("buy rate", self.buy_rate)?;
        require_positive("sell rate", self.sell_rate)?;
        require_positive("buy price", self.buy_price_usd)?;
        self.tax.validate()
    }
}

/// Outcome of [`calculate`], one variant per [`Mode`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalculationResult {
    ProfitLoss(ProfitLoss),
    NoLoss(NoLossPrice),
}

/// Run the calculation selected by `input.mode`
pub fn calculate(input: &CalculationInput) -> Result<CalculationResult, CalculatorError> {
    match input.mode {
        Mode::Standard => compute_profit_loss(input).map(CalculationResult::ProfitLoss),
        Mode::NoLoss => compute_no_loss_sell_price(input).map(CalculationResult::NoLoss),
    }
}

pub(crate) fn require_positive(field: &str, value: Decimal) -> Result<(), CalculatorError> {
    if value <= Decimal::ZERO {
        return Err(CalculatorError::InvalidInput(format!(
            "{} must be positive (got {})",
            field, value
        )));
    }
    Ok(())
}

/// Decimal arithmetic that reports overflow instead of panicking
pub(crate) fn checked(value: Option<Decimal>, what: &str) -> Result<Decimal, CalculatorError> {
    value.ok_or_else(|| CalculatorError::InvalidInput(format!("{} is out of range", what)))
}
