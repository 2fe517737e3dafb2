//! Report structures
//!
//! A report bundles a calculation result with the inputs it was computed
//! from, ready for rendering as a table or JSON.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::rates::RateQuote;
use crate::tax::{NoLossPrice, ProfitLoss, TaxRates};
use crate::utils::{display_amount, display_rate, format_percent, round_display, AMOUNT_DP};

/// How the trade ended up after tax, judged on the displayed (rounded) value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Profit,
    Loss,
    BrokeEven,
}

impl Verdict {
    pub fn from_after_tax(value: Decimal) -> Self {
        let shown = round_display(value, AMOUNT_DP);
        if shown > Decimal::ZERO {
            Verdict::Profit
        } else if shown < Decimal::ZERO {
            Verdict::Loss
        } else {
            Verdict::BrokeEven
        }
    }
}

/// Standard-mode report
#[derive(Debug, Clone)]
pub struct TradeReport {
    pub buy_date: NaiveDate,
    pub sell_date: NaiveDate,
    pub buy_quote: RateQuote,
    pub sell_quote: RateQuote,
    pub buy_price_usd: Decimal,
    pub sell_price_usd: Decimal,
    pub tax: TaxRates,
    pub result: ProfitLoss,
}

impl TradeReport {
    pub fn verdict(&self) -> Verdict {
        Verdict::from_after_tax(self.result.profit_loss_after_tax_usd)
    }

    /// Flat, display-rounded view used for JSON output
    pub fn to_view(&self) -> TradeView {
        let r = &self.result;
        TradeView {
            buy_date: self.buy_date,
            sell_date: self.sell_date,
            buy_rate: display_rate(self.buy_quote.rate),
            buy_rate_date: self.buy_quote.as_of,
            sell_rate: display_rate(self.sell_quote.rate),
            sell_rate_date: self.sell_quote.as_of,
            buy_price_usd: display_amount(self.buy_price_usd),
            sell_price_usd: display_amount(self.sell_price_usd),
            buy_cost_uah: display_amount(r.buy_cost_uah),
            sell_proceeds_uah: display_amount(r.sell_proceeds_uah),
            profit_loss_usd: display_amount(r.profit_loss_usd),
            profit_loss_uah: display_amount(r.profit_loss_uah),
            tax_rate_income: format_percent(self.tax.income),
            tax_rate_military: format_percent(self.tax.military),
            tax_uah_income: display_amount(r.income_tax_uah),
            tax_uah_military: display_amount(r.military_tax_uah),
            tax_uah: display_amount(r.total_tax_uah),
            tax_usd: display_amount(r.tax_usd),
            profit_loss_after_tax_usd: display_amount(r.profit_loss_after_tax_usd),
            verdict: self.verdict(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TradeView {
    pub buy_date: NaiveDate,
    pub sell_date: NaiveDate,
    pub buy_rate: String,
    pub buy_rate_date: NaiveDate,
    pub sell_rate: String,
    pub sell_rate_date: NaiveDate,
    pub buy_price_usd: String,
    pub sell_price_usd: String,
    pub buy_cost_uah: String,
    pub sell_proceeds_uah: String,
    pub profit_loss_usd: String,
    pub profit_loss_uah: String,
    pub tax_rate_income: String,
    pub tax_rate_military: String,
    pub tax_uah_income: String,
    pub tax_uah_military: String,
    pub tax_uah: String,
    pub tax_usd: String,
    pub profit_loss_after_tax_usd: String,
    pub verdict: Verdict,
}

/// No-loss-mode report
#[derive(Debug, Clone)]
pub struct NoLossReport {
    pub buy_date: NaiveDate,
    pub buy_quote: RateQuote,
    /// Date of the sell rate actually used (the latest one when none was asked for)
    pub sell_quote: RateQuote,
    pub buy_price_usd: Decimal,
    pub tax: TaxRates,
    pub result: NoLossPrice,
}

impl NoLossReport {
    pub fn to_view(&self) -> NoLossView {
        NoLossView {
            buy_date: self.buy_date,
            buy_rate: display_rate(self.buy_quote.rate),
            buy_price_usd: display_amount(self.buy_price_usd),
            sell_date: self.sell_quote.as_of,
            sell_rate: display_rate(self.sell_quote.rate),
            tax_rate_income: format_percent(self.tax.income),
            tax_rate_military: format_percent(self.tax.military),
            sell_price_no_loss: display_amount(self.result.break_even_sell_price_usd),
            taxed_at_break_even: self.result.taxed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NoLossView {
    pub buy_date: NaiveDate,
    pub buy_rate: String,
    pub buy_price_usd: String,
    pub sell_date: NaiveDate,
    pub sell_rate: String,
    pub tax_rate_income: String,
    pub tax_rate_military: String,
    pub sell_price_no_loss: String,
    pub taxed_at_break_even: bool,
}
