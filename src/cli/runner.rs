use anyhow::{anyhow, Result};
use chrono::NaiveDate;

use crate::cli::{Commands, ConfigCommands, TaxArgs};
use crate::commands::{Command, Leg, NoLossRequest, TradeRequest};
use crate::config::TaxOverrides;
use crate::input;
use crate::tax::LevyPreset;

/// Convert clap `Commands` into a validated internal `Command`.
///
/// All string parsing happens here, so a malformed price or date fails
/// before any rate is fetched. `today` bounds the accepted dates.
pub fn to_internal_command(c: &Commands, today: NaiveDate) -> Result<Command> {
    match c {
        Commands::Calc {
            buy_date,
            buy_price,
            sell_date,
            sell_price,
            buy_rate,
            sell_rate,
            tax,
        } => {
            let buy_date = input::parse_date("buy date", buy_date, today)?;
            let sell_date = input::parse_date("sell date", sell_date, today)?;
            input::validate_date_order(buy_date, sell_date)?;

            Ok(Command::Calc(TradeRequest {
                buy: Leg {
                    date: Some(buy_date),
                    manual_rate: parse_optional_rate("buy rate", buy_rate.as_deref())?,
                },
                sell: Leg {
                    date: Some(sell_date),
                    manual_rate: parse_optional_rate("sell rate", sell_rate.as_deref())?,
                },
                buy_price_usd: input::parse_price("buy price", buy_price)?,
                sell_price_usd: input::parse_price("sell price", sell_price)?,
                tax: parse_tax_args(tax)?,
            }))
        }

        Commands::NoLoss {
            buy_date,
            buy_price,
            sell_date,
            buy_rate,
            sell_rate,
            tax,
        } => {
            let buy_date = input::parse_date("buy date", buy_date, today)?;
            let sell_date = match sell_date.as_deref() {
                Some(raw) => {
                    let date = input::parse_date("sell date", raw, today)?;
                    input::validate_date_order(buy_date, date)?;
                    Some(date)
                }
                None => None,
            };

            Ok(Command::NoLoss(NoLossRequest {
                buy: Leg {
                    date: Some(buy_date),
                    manual_rate: parse_optional_rate("buy rate", buy_rate.as_deref())?,
                },
                sell: Leg {
                    date: sell_date,
                    manual_rate: parse_optional_rate("sell rate", sell_rate.as_deref())?,
                },
                buy_price_usd: input::parse_price("buy price", buy_price)?,
                tax: parse_tax_args(tax)?,
            }))
        }

        Commands::Rate { date } => {
            let date = match date.as_deref() {
                Some(raw) => Some(input::parse_date("date", raw, today)?),
                None => None,
            };
            Ok(Command::Rate { date })
        }

        Commands::Config { action } => match action {
            ConfigCommands::Show => Ok(Command::ConfigShow),
        },
    }
}

fn parse_optional_rate(field: &str, raw: Option<&str>) -> Result<Option<rust_decimal::Decimal>> {
    match raw {
        Some(r) => Ok(Some(input::parse_rate(field, r)?)),
        None => Ok(None),
    }
}

fn parse_tax_args(args: &TaxArgs) -> Result<TaxOverrides> {
    let income = match args.income_tax.as_deref() {
        Some(raw) => Some(input::parse_percent("income tax", raw)?),
        None => None,
    };
    let military = match args.military_tax.as_deref() {
        Some(raw) => Some(input::parse_percent("military tax", raw)?),
        None => None,
    };
    let levy = match args.levy.as_deref() {
        Some(raw) => Some(raw.parse::<LevyPreset>().map_err(|e| anyhow!(e))?),
        None => None,
    };
    Ok(TaxOverrides {
        income,
        military,
        levy,
    })
}
