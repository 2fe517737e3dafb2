//! Internal command representation
//!
//! Clap arguments are raw strings; the runner validates them into these
//! typed commands before anything touches the network.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::TaxOverrides;

/// One leg of a trade: the date, and optionally a rate the user already knows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    pub date: Option<NaiveDate>,
    pub manual_rate: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeRequest {
    pub buy: Leg,
    pub sell: Leg,
    pub buy_price_usd: Decimal,
    pub sell_price_usd: Decimal,
    pub tax: TaxOverrides,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoLossRequest {
    pub buy: Leg,
    /// `date: None` means the latest published rate
    pub sell: Leg,
    pub buy_price_usd: Decimal,
    pub tax: TaxOverrides,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Calc(TradeRequest),
    NoLoss(NoLossRequest),
    Rate { date: Option<NaiveDate> },
    ConfigShow,
}
