//! Command dispatcher
//!
//! Resolves the exchange rates a command needs, runs the calculator and
//! prints the result. The two legs of a trade are fetched concurrently and
//! the calculator only runs once both have succeeded.

use anyhow::{anyhow, Context, Result};
use chrono::Duration;
use tracing::info;

use crate::cli::formatters;
use crate::commands::{Command, Leg, NoLossRequest, TradeRequest};
use crate::config::Config;
use crate::rates::{CachedRateProvider, FixedRate, NbuClient, RateProvider, RateQuery, RateQuote};
use crate::reports::{NoLossReport, TradeReport};
use crate::tax::{compute_no_loss_sell_price, compute_profit_loss, CalculationInput};

/// Currency the NBU rate is looked up for
pub const CURRENCY: &str = "USD";

/// Build the rate provider described by the configuration
pub fn build_provider(config: &Config) -> Result<CachedRateProvider<NbuClient>> {
    let client = NbuClient::new(
        &config.nbu.base_url,
        std::time::Duration::from_secs(config.nbu.timeout_secs),
    )
    .context("failed to build NBU client")?;
    let latest_ttl = Duration::try_seconds(config.nbu.latest_ttl_secs)
        .ok_or_else(|| anyhow!("latest rate TTL {}s is out of range", config.nbu.latest_ttl_secs))?;
    Ok(CachedRateProvider::new(client, latest_ttl))
}

/// Route a parsed command to its handler
pub async fn dispatch_command(command: Command, config: &Config, json_output: bool) -> Result<()> {
    let provider = build_provider(config)?;
    dispatch_with_provider(command, config, &provider, json_output).await
}

/// Run a command against an explicit rate provider
pub async fn dispatch_with_provider(
    command: Command,
    config: &Config,
    provider: &dyn RateProvider,
    json_output: bool,
) -> Result<()> {
    match command {
        Command::Calc(request) => {
            let report = run_trade(request, config, provider).await?;
            if json_output {
                println!("{}", formatters::format_trade_json(&report));
            } else {
                print!("{}", formatters::format_trade_table(&report));
            }
            Ok(())
        }
        Command::NoLoss(request) => {
            let report = run_no_loss(request, config, provider).await?;
            if json_output {
                println!("{}", formatters::format_no_loss_json(&report));
            } else {
                print!("{}", formatters::format_no_loss_table(&report));
            }
            Ok(())
        }
        Command::Rate { date } => {
            let query = date.map(RateQuery::On).unwrap_or(RateQuery::Latest);
            let quote = provider
                .lookup_rate(CURRENCY, query)
                .await
                .context("failed to fetch exchange rate")?;
            if json_output {
                println!("{}", formatters::format_rate_json(&quote));
            } else {
                print!("{}", formatters::format_rate_table(&quote));
            }
            Ok(())
        }
        Command::ConfigShow => {
            if json_output {
                println!("{}", formatters::format_config_json(config));
            } else {
                print!("{}", formatters::format_config_table(config));
            }
            Ok(())
        }
    }
}

/// Rate for one leg: the user's manual rate, or a lookup
async fn resolve_leg(provider: &dyn RateProvider, leg: Leg, name: &str) -> Result<RateQuote> {
    let query = leg.date.map(RateQuery::On).unwrap_or(RateQuery::Latest);
    let quote = match leg.manual_rate {
        Some(rate) => FixedRate::new(rate).lookup_rate(CURRENCY, query).await,
        None => provider.lookup_rate(CURRENCY, query).await,
    };
    quote.with_context(|| format!("failed to fetch {} date rate", name))
}

async fn resolve_legs(
    provider: &dyn RateProvider,
    buy: Leg,
    sell: Leg,
) -> Result<(RateQuote, RateQuote)> {
    tokio::try_join!(
        resolve_leg(provider, buy, "buy"),
        resolve_leg(provider, sell, "sell")
    )
}

/// Standard mode: fetch both rates, then compute profit/loss
pub async fn run_trade(
    request: TradeRequest,
    config: &Config,
    provider: &dyn RateProvider,
) -> Result<TradeReport> {
    let (buy_quote, sell_quote) = resolve_legs(provider, request.buy, request.sell).await?;
    info!(
        "Rates: buy {} on {}, sell {} on {}",
        buy_quote.rate, buy_quote.as_of, sell_quote.rate, sell_quote.as_of
    );

    let tax = config.tax_rates(request.tax);
    let input = CalculationInput::standard(
        buy_quote.rate,
        sell_quote.rate,
        request.buy_price_usd,
        request.sell_price_usd,
        tax,
    );
    let result = compute_profit_loss(&input)?;

    Ok(TradeReport {
        buy_date: request.buy.date.unwrap_or(buy_quote.as_of),
        sell_date: request.sell.date.unwrap_or(sell_quote.as_of),
        buy_quote,
        sell_quote,
        buy_price_usd: request.buy_price_usd,
        sell_price_usd: request.sell_price_usd,
        tax,
        result,
    })
}

/// No-loss mode: fetch the buy rate and the sell (or latest) rate, then solve
pub async fn run_no_loss(
    request: NoLossRequest,
    config: &Config,
    provider: &dyn RateProvider,
) -> Result<NoLossReport> {
    let (buy_quote, sell_quote) = resolve_legs(provider, request.buy, request.sell).await?;
    info!(
        "Rates: buy {} on {}, sell {} on {}",
        buy_quote.rate, buy_quote.as_of, sell_quote.rate, sell_quote.as_of
    );

    let tax = config.tax_rates(request.tax);
    let input = CalculationInput::no_loss(
        buy_quote.rate,
        sell_quote.rate,
        request.buy_price_usd,
        tax,
    );
    let result = compute_no_loss_sell_price(&input)?;

    Ok(NoLossReport {
        buy_date: request.buy.date.unwrap_or(buy_quote.as_of),
        buy_quote,
        sell_quote,
        buy_price_usd: request.buy_price_usd,
        tax,
        result,
    })
}
