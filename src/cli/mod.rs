use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;
pub mod runner;

#[derive(Parser, Debug)]
#[command(name = "nbu-pnl")]
#[command(
    version,
    about = "Profit/loss and tax calculator for USD trades at official NBU rates"
)]
#[command(
    long_about = "Convert a USD purchase and sale to hryvnia at the National Bank of Ukraine rates for each date, compute personal income tax and military levy on the UAH gain, and show the after-tax result in USD. Can also solve for the no-loss sell price."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Path to a TOML config file (defaults to $NBU_PNL_CONFIG or the user config dir)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Tax rate flags shared by the calculation commands
#[derive(Args, Debug, Clone, Default)]
pub struct TaxArgs {
    /// Income tax rate in percent (default 18)
    #[arg(long = "income-tax", value_name = "PCT")]
    pub income_tax: Option<String>,

    /// Military levy rate in percent; overrides --levy
    #[arg(long = "military-tax", value_name = "PCT")]
    pub military_tax: Option<String>,

    /// Military levy preset: current (5%) or legacy (1.5%)
    #[arg(long = "levy", value_name = "PRESET")]
    pub levy: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Calculate profit/loss and tax for a completed trade
    Calc {
        /// Purchase date (YYYY-MM-DD or DD.MM.YYYY)
        #[arg(long)]
        buy_date: String,

        /// Purchase price in USD
        #[arg(long)]
        buy_price: String,

        /// Sale date (YYYY-MM-DD or DD.MM.YYYY)
        #[arg(long)]
        sell_date: String,

        /// Sale price in USD
        #[arg(long)]
        sell_price: String,

        /// Use this UAH/USD rate for the purchase instead of fetching it
        #[arg(long, value_name = "RATE")]
        buy_rate: Option<String>,

        /// Use this UAH/USD rate for the sale instead of fetching it
        #[arg(long, value_name = "RATE")]
        sell_rate: Option<String>,

        #[command(flatten)]
        tax: TaxArgs,
    },

    /// Calculate the sell price at which the trade breaks even after tax
    NoLoss {
        /// Purchase date (YYYY-MM-DD or DD.MM.YYYY)
        #[arg(long)]
        buy_date: String,

        /// Purchase price in USD
        #[arg(long)]
        buy_price: String,

        /// Sale date whose rate to use (defaults to the latest published rate)
        #[arg(long)]
        sell_date: Option<String>,

        /// Use this UAH/USD rate for the purchase instead of fetching it
        #[arg(long, value_name = "RATE")]
        buy_rate: Option<String>,

        /// Use this UAH/USD rate for the sale instead of fetching it
        #[arg(long, value_name = "RATE")]
        sell_rate: Option<String>,

        #[command(flatten)]
        tax: TaxArgs,
    },

    /// Show the official NBU USD rate for a date
    Rate {
        /// Date (YYYY-MM-DD or DD.MM.YYYY); latest if omitted
        #[arg(long)]
        date: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
}
