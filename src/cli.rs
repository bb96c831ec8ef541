use clap::{Parser, Subcommand};

use crate::models::Strategy;
use crate::{
    DEFAULT_MAX_DTE, DEFAULT_MAX_OTM, DEFAULT_MIN_DTE, DEFAULT_MIN_OTM, DEFAULT_TICKER,
};

/// Options-selling screener: scan an equity's option chain for
/// cash-secured-put and covered-call candidates ranked by annualized
/// premium return.
#[derive(Parser)]
#[command(name = "wheel_scan", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Screen one ticker and print the ranked opportunity table
    Screen {
        /// Ticker symbol (case-insensitive)
        #[arg(default_value = DEFAULT_TICKER)]
        ticker: String,

        /// Minimum days to expiration, inclusive
        #[arg(long, default_value_t = DEFAULT_MIN_DTE, value_parser = clap::value_parser!(i64).range(1..=90))]
        min_dte: i64,

        /// Maximum days to expiration, inclusive
        #[arg(long, default_value_t = DEFAULT_MAX_DTE, value_parser = clap::value_parser!(i64).range(1..=90))]
        max_dte: i64,

        /// Minimum out-of-the-money fraction (0.05 = 5% from spot)
        #[arg(long, default_value_t = DEFAULT_MIN_OTM)]
        min_otm: f64,

        /// Maximum out-of-the-money fraction
        #[arg(long, default_value_t = DEFAULT_MAX_OTM)]
        max_otm: f64,

        /// Selling strategy to screen
        #[arg(long, value_enum, default_value = "cash-secured-put")]
        strategy: Strategy,

        /// Also export the ranked table as a timestamped CSV file
        #[arg(long)]
        csv: bool,
    },

    /// Serve the browser dashboard
    Dashboard {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },

    /// Run a quick end-to-end smoke test of both strategies
    Smoke {
        /// Ticker used for the smoke run
        #[arg(default_value = "AAPL")]
        ticker: String,
    },

    /// Check environment and deployment readiness
    Doctor,
}
