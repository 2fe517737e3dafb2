//! nbu-pnl - profit/loss calculator for USD trades taxed in Ukraine
//!
//! This library converts USD purchase and sale prices to hryvnia at the
//! official National Bank of Ukraine rates, computes income tax and military
//! levy on the UAH gain, and solves for the no-loss sell price.

pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod input;
pub mod rates;
pub mod reports;
pub mod tax;
pub mod utils;
