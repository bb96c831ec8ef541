use std::time::Duration;

use anyhow::Result;
use indicatif::ProgressBar;

use crate::cache::QuoteCache;
use crate::models::{ScreenedOpportunity, ScreeningRequest, Strategy};
use crate::others::{create_csv_file, format_currency, format_percent};
use crate::requests::YahooFinance;
use crate::screener::run_screen;

pub struct ScreenArgs {
    pub ticker: String,
    pub min_dte: i64,
    pub max_dte: i64,
    pub min_otm: f64,
    pub max_otm: f64,
    pub strategy: Strategy,
    pub csv: bool,
}

/// Entry point for the `screen` subcommand.
pub async fn run(args: &ScreenArgs) -> Result<()> {
    let request = ScreeningRequest::new(
        &args.ticker,
        args.min_dte,
        args.max_dte,
        args.min_otm,
        args.max_otm,
        args.strategy,
    );
    if let Err(errors) = request.validate() {
        for error in &errors {
            eprintln!("  - {error}");
        }
        anyhow::bail!("screening request is invalid ({} problems)", errors.len());
    }

    let provider = YahooFinance::new()?;
    let mut cache = QuoteCache::new();

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("Screening {}...", request.ticker));
    spinner.enable_steady_tick(Duration::from_millis(120));
    let outcome = run_screen(&provider, &mut cache, &request).await;
    spinner.finish_and_clear();
    let outcome = outcome?;

    println!(
        "{} @ {}  |  {}  |  DTE {}-{}  |  OTM {:.0}%-{:.0}%",
        outcome.ticker,
        format_currency(outcome.spot),
        request.strategy,
        request.min_dte,
        request.max_dte,
        request.min_otm * 100.0,
        request.max_otm * 100.0,
    );

    if outcome.opportunities.is_empty() {
        println!(
            "No opportunities found in the {}-{} day window. Try widening the bands.",
            request.min_dte, request.max_dte
        );
        return Ok(());
    }

    println!("Found {} opportunities", outcome.opportunities.len());
    println!();
    print_table(&outcome.opportunities);

    if args.csv {
        let prefix = format!("{}-{}", outcome.ticker, request.strategy.slug());
        if let Some(filename) = create_csv_file(&outcome.opportunities, &prefix)? {
            println!();
            println!("Wrote {filename}");
        }
    }
    Ok(())
}

fn print_table(rows: &[ScreenedOpportunity]) {
    println!(
        "{:<24} {:>4} {:>10} {:>9} {:>7} {:>8} {:>9} {:>10}",
        "Contract", "DTE", "Strike", "Premium", "Risk", "Volume", "OpenInt", "AnnReturn"
    );
    println!("{}", "-".repeat(89));
    for row in rows {
        println!(
            "{:<24} {:>4} {:>10} {:>9} {:>7.3} {:>8} {:>9} {:>10}",
            row.contract_symbol,
            row.dte,
            format_currency(row.strike),
            format_currency(row.premium),
            row.risk_proxy,
            row.volume.map_or_else(|| "-".to_string(), |v| v.to_string()),
            row.open_interest
                .map_or_else(|| "-".to_string(), |oi| oi.to_string()),
            format_percent(row.annualized_return),
        );
    }
}
