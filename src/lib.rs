//! Screens an equity's option chain for cash-secured-put and covered-call
//! candidates, ranked by annualized premium return.

pub mod cache;
pub mod cli;
pub mod dashboard;
pub mod doctor;
pub mod errors;
pub mod models;
pub mod others;
pub mod requests;
pub mod screen;
pub mod screener;
pub mod smoke;

pub const DEFAULT_TICKER: &str = "DPST";
pub const DEFAULT_MIN_DTE: i64 = 30;
pub const DEFAULT_MAX_DTE: i64 = 45;
pub const DEFAULT_MIN_OTM: f64 = 0.05;
pub const DEFAULT_MAX_OTM: f64 = 0.15;
pub const DTE_LOWER_LIMIT: i64 = 1;
pub const DTE_UPPER_LIMIT: i64 = 90;
pub const OTM_LOWER_LIMIT: f64 = 0.01;
pub const OTM_UPPER_LIMIT: f64 = 0.30;
pub const QUOTE_CACHE_TTL_SECS: u64 = 300;
pub const CONTRACT_MULTIPLIER: f64 = 100.0;
pub const DAYS_PER_YEAR: f64 = 365.0;
