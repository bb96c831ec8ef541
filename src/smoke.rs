use anyhow::Result;

use crate::cache::QuoteCache;
use crate::models::{ScreeningRequest, Strategy};
use crate::others::{format_currency, format_percent};
use crate::requests::YahooFinance;
use crate::screener::run_screen;
use crate::{DEFAULT_MAX_DTE, DEFAULT_MAX_OTM, DEFAULT_MIN_DTE, DEFAULT_MIN_OTM};

/// Entry point for the `smoke` subcommand: exercise the whole pipeline for
/// both strategies against live data and report the best hit of each.
pub async fn run(ticker: &str) -> Result<()> {
    println!(
        "Smoke test: {} | DTE {}-{} | OTM {:.0}%-{:.0}%",
        ticker.to_uppercase(),
        DEFAULT_MIN_DTE,
        DEFAULT_MAX_DTE,
        DEFAULT_MIN_OTM * 100.0,
        DEFAULT_MAX_OTM * 100.0,
    );

    let provider = YahooFinance::new()?;
    // Shared across both runs so the second strategy reuses the cached quote.
    let mut cache = QuoteCache::new();

    for strategy in [Strategy::CashSecuredPut, Strategy::CoveredCall] {
        let request = ScreeningRequest::new(
            ticker,
            DEFAULT_MIN_DTE,
            DEFAULT_MAX_DTE,
            DEFAULT_MIN_OTM,
            DEFAULT_MAX_OTM,
            strategy,
        );
        let outcome = run_screen(&provider, &mut cache, &request).await?;
        match outcome.opportunities.first() {
            Some(best) => println!(
                "  {strategy}: {} opportunities, best {} strike {} premium {} annualized {}",
                outcome.opportunities.len(),
                best.contract_symbol,
                format_currency(best.strike),
                format_currency(best.premium),
                format_percent(best.annualized_return),
            ),
            None => println!(
                "  {strategy}: no opportunities (spot {})",
                format_currency(outcome.spot)
            ),
        }
    }

    println!("Smoke test complete.");
    Ok(())
}
