use anyhow::Result;

use crate::others::format_currency;
use crate::requests::{MarketData, YahooFinance};

const PROBE_TICKER: &str = "SPY";

/// Entry point for the `doctor` subcommand: probe every external surface
/// the screener depends on and report OK/FAIL per check. Exits non-zero
/// when any check fails.
pub async fn run() -> Result<()> {
    println!("Checking deployment readiness (probe ticker {PROBE_TICKER})");
    let provider = YahooFinance::new()?;
    let mut failures = 0usize;

    match provider.fetch_quote(PROBE_TICKER).await {
        Ok(price) => println!(
            "  OK   price sources reachable ({} = {})",
            PROBE_TICKER,
            format_currency(price)
        ),
        Err(error) => {
            failures += 1;
            println!("  FAIL price sources: {error:#}");
        }
    }

    match provider.fetch_expirations(PROBE_TICKER).await {
        Ok(dates) if !dates.is_empty() => {
            println!("  OK   options endpoint reachable ({} expirations)", dates.len());
            match provider.fetch_chain(PROBE_TICKER, dates[0]).await {
                Ok(chain) => println!(
                    "  OK   chain retrieval ({} puts, {} calls for {})",
                    chain.puts.len(),
                    chain.calls.len(),
                    chain.expiration
                ),
                Err(error) => {
                    failures += 1;
                    println!("  FAIL chain retrieval: {error:#}");
                }
            }
        }
        Ok(_) => {
            failures += 1;
            println!("  FAIL options endpoint returned no expirations");
        }
        Err(error) => {
            failures += 1;
            println!("  FAIL options endpoint: {error:#}");
        }
    }

    match csv_write_probe() {
        Ok(()) => println!("  OK   working directory writable for CSV export"),
        Err(error) => {
            failures += 1;
            println!("  FAIL working directory not writable: {error:#}");
        }
    }

    if failures == 0 {
        println!("All checks passed.");
        Ok(())
    } else {
        anyhow::bail!("{failures} check(s) failed")
    }
}

fn csv_write_probe() -> Result<()> {
    let probe = ".wheel_scan-doctor.tmp";
    std::fs::write(probe, b"ok")?;
    std::fs::remove_file(probe)?;
    Ok(())
}
