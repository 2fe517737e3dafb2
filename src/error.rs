//! Error handling for nbu-pnl
//!
//! Each concern owns a `thiserror` enum so callers can match on the exact
//! failure; the binary layer wraps them in `anyhow` for context chaining.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors surfaced by the profit/loss calculator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalculatorError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("degenerate tax configuration: combined tax rate {combined}% cannot equal or exceed 100%")]
    DegenerateTaxConfiguration { combined: String },
}

/// Errors surfaced by an exchange rate lookup
#[derive(Error, Debug)]
pub enum RateError {
    #[error("no {currency} exchange rate available for {}", display_date(.date))]
    NotFound {
        currency: String,
        date: Option<NaiveDate>,
    },

    #[error("rate service returned error status: {status}")]
    Http { status: u16 },

    #[error("failed to reach rate service")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode rate service response: {0}")]
    Decode(String),
}

fn display_date(date: &Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => "the latest date".to_string(),
    }
}

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid tax rate: {0}")]
    InvalidRate(String),

    #[error("invalid setting {field}: {message}")]
    InvalidSetting { field: String, message: String },
}

/// Result type alias for application-level operations
pub type Result<T> = anyhow::Result<T>;
