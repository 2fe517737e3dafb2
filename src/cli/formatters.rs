//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of calculation from presentation.

use colored::Colorize;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::config::{Config, NbuConfig};
use crate::rates::RateQuote;
use crate::reports::{NoLossReport, TradeReport, Verdict};
use crate::tax::LevyPreset;
use crate::utils::{
    display_amount, display_rate, format_percent, format_uah, format_usd, round_display, AMOUNT_DP,
};

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "Item")]
    label: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn row(label: impl Into<String>, value: impl Into<String>) -> Row {
    Row {
        label: label.into(),
        value: value.into(),
    }
}

fn render(rows: Vec<Row>) -> String {
    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());
    table.to_string()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format a trade report for terminal table output
pub fn format_trade_table(report: &TradeReport) -> String {
    let r = &report.result;
    let mut output = format!("\n{} Profit/Loss\n\n", "📊".cyan().bold());

    let rows = vec![
        row("Buy Date", report.buy_date.to_string()),
        row(
            "Buy Exchange Rate (UAH/USD)",
            display_rate(report.buy_quote.rate),
        ),
        row("Buy Price", format_usd(report.buy_price_usd)),
        row("Buy Cost", format_uah(r.buy_cost_uah)),
        row("Sell Date", report.sell_date.to_string()),
        row(
            "Sell Exchange Rate (UAH/USD)",
            display_rate(report.sell_quote.rate),
        ),
        row("Sell Price", format_usd(report.sell_price_usd)),
        row("Sell Proceeds", format_uah(r.sell_proceeds_uah)),
        row("Profit/Loss", format_usd(r.profit_loss_usd)),
        row("Profit/Loss in UAH", format_uah(r.profit_loss_uah)),
        row(
            format!(
                "Total tax in UAH ({}% + {}%)",
                format_percent(report.tax.income),
                format_percent(report.tax.military)
            ),
            format_uah(r.total_tax_uah),
        ),
        row("Income Tax", format_uah(r.income_tax_uah)),
        row("Military Tax", format_uah(r.military_tax_uah)),
        row("Tax in USD", format_usd(r.tax_usd)),
        row(
            "Income after taxes",
            format_usd(r.profit_loss_after_tax_usd),
        ),
    ];
    output.push_str(&render(rows));

    output.push_str(&format!("\n\n{}\n", format_verdict(report)));
    output
}

/// One-line summary: profit, loss or break-even after tax
pub fn format_verdict(report: &TradeReport) -> String {
    let after_tax = report.result.profit_loss_after_tax_usd;
    match report.verdict() {
        Verdict::Profit => format!(
            "You made a profit of ${} USD.",
            display_amount(after_tax)
        )
        .green()
        .bold()
        .to_string(),
        Verdict::Loss => format!(
            "You incurred a loss of ${} USD.",
            display_amount(round_display(after_tax, AMOUNT_DP).abs())
        )
        .red()
        .bold()
        .to_string(),
        Verdict::BrokeEven => "You broke even.".blue().bold().to_string(),
    }
}

/// Format a trade report for JSON output
pub fn format_trade_json(report: &TradeReport) -> String {
    to_json(&report.to_view())
}

/// Format a no-loss report for terminal table output
pub fn format_no_loss_table(report: &NoLossReport) -> String {
    let mut output = format!("\n{} No Loss Sell Price\n\n", "📊".cyan().bold());

    let rows = vec![
        row("Buy Date", report.buy_date.to_string()),
        row(
            "Buy Exchange Rate (UAH/USD)",
            display_rate(report.buy_quote.rate),
        ),
        row("Buy Price", format_usd(report.buy_price_usd)),
        row("Sell Date (Rate Used)", report.sell_quote.as_of.to_string()),
        row(
            "Sell Exchange Rate (UAH/USD)",
            display_rate(report.sell_quote.rate),
        ),
        row(
            "Tax Rate",
            format!(
                "{}% + {}%",
                format_percent(report.tax.income),
                format_percent(report.tax.military)
            ),
        ),
        row(
            "No Loss Sell Price",
            format_usd(report.result.break_even_sell_price_usd),
        ),
    ];
    output.push_str(&render(rows));
    output.push('\n');

    if !report.result.taxed {
        output.push_str(&format!(
            "\n{} The hryvnia has not weakened since the purchase; selling at the buy price leaves no taxable gain.\n",
            "ℹ".blue().bold()
        ));
    }
    output
}

/// Format a no-loss report for JSON output
pub fn format_no_loss_json(report: &NoLossReport) -> String {
    to_json(&report.to_view())
}

/// Format a single rate quote
pub fn format_rate_table(quote: &RateQuote) -> String {
    let rows = vec![
        row("Currency", quote.currency.clone()),
        row("Date", quote.as_of.to_string()),
        row("Rate (UAH)", display_rate(quote.rate)),
    ];
    format!("{}\n", render(rows))
}

pub fn format_rate_json(quote: &RateQuote) -> String {
    #[derive(Serialize)]
    struct JsonRate<'a> {
        currency: &'a str,
        date: String,
        rate: String,
    }

    to_json(&JsonRate {
        currency: &quote.currency,
        date: quote.as_of.to_string(),
        rate: display_rate(quote.rate),
    })
}

/// Format the effective configuration
pub fn format_config_table(config: &Config) -> String {
    let source = config
        .source
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(defaults)".to_string());

    let rows = vec![
        row("Config File", source),
        row("Income Tax", format!("{}%", format_percent(config.tax.income))),
        row(
            "Military Tax",
            format!("{}%", format_percent(config.tax.military)),
        ),
        row("Levy Preset", config.levy.to_string()),
        row("NBU API", config.nbu.base_url.clone()),
        row("Timeout", format!("{}s", config.nbu.timeout_secs)),
        row("Latest Rate TTL", format!("{}s", config.nbu.latest_ttl_secs)),
    ];
    format!("{}\n", render(rows))
}

/// Rates are shown in percent, like the table and the `calc` JSON
pub fn format_config_json(config: &Config) -> String {
    #[derive(Serialize)]
    struct JsonConfig<'a> {
        source: Option<String>,
        income_tax: String,
        military_tax: String,
        levy: LevyPreset,
        nbu: &'a NbuConfig,
    }

    to_json(&JsonConfig {
        source: config.source.as_ref().map(|p| p.display().to_string()),
        income_tax: format_percent(config.tax.income),
        military_tax: format_percent(config.tax.military),
        levy: config.levy,
        nbu: &config.nbu,
    })
}
