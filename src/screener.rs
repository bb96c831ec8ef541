use chrono::NaiveDate;
use itertools::Itertools;
use tracing::{info, warn};

use crate::cache::QuoteCache;
use crate::errors::ScreenerError;
use crate::models::{
    ExpirationCandidate, OptionContract, ScreenOutcome, ScreenedOpportunity, ScreeningRequest,
    Strategy,
};
use crate::others::new_york_date;
use crate::requests::MarketData;
use crate::{CONTRACT_MULTIPLIER, DAYS_PER_YEAR};

/// Keep the expirations whose whole-day distance from `today` falls inside
/// [min_dte, max_dte], in source order.
pub fn filter_expirations(
    available: &[NaiveDate],
    today: NaiveDate,
    min_dte: i64,
    max_dte: i64,
) -> Vec<ExpirationCandidate> {
    available
        .iter()
        .filter_map(|&date| {
            let dte = (date - today).num_days();
            (min_dte..=max_dte)
                .contains(&dte)
                .then_some(ExpirationCandidate { date, dte })
        })
        .collect_vec()
}

/// Premium income per contract, normalized to collateral and extrapolated
/// to a one-year holding period.
pub fn annualized_return(premium: f64, collateral: f64, dte: i64) -> f64 {
    (premium * CONTRACT_MULTIPLIER / collateral) * (DAYS_PER_YEAR / dte as f64)
}

/// Filter one expiration's contracts to the strategy's OTM strike band and
/// annotate the survivors. Rows without a positive premium or positive
/// collateral are dropped, not kept with sentinels. A non-positive dte
/// yields an empty result; the expiration filter guarantees dte > 0 on the
/// orchestrated path.
pub fn screen_chain(
    contracts: &[OptionContract],
    dte: i64,
    spot: f64,
    min_otm: f64,
    max_otm: f64,
    strategy: Strategy,
) -> Vec<ScreenedOpportunity> {
    if dte <= 0 {
        return Vec::new();
    }
    let (low, high) = strategy.strike_band(spot, min_otm, max_otm);
    contracts
        .iter()
        .filter(|contract| contract.strike >= low && contract.strike <= high)
        .filter_map(|contract| {
            let premium = contract.premium();
            if premium <= 0.0 {
                return None;
            }
            let collateral = strategy.collateral(spot, contract.strike);
            if collateral <= 0.0 {
                return None;
            }
            Some(ScreenedOpportunity {
                contract_symbol: contract.contract_symbol.clone(),
                dte,
                strike: contract.strike,
                premium,
                collateral,
                risk_proxy: contract.risk_proxy(spot),
                volume: contract.volume,
                open_interest: contract.open_interest,
                implied_volatility: contract.implied_volatility,
                annualized_return: annualized_return(premium, collateral, dte),
            })
        })
        .collect_vec()
}

/// Run one screening request end to end: quote, expiration filter, one
/// chain fetch per qualifying expiration, concatenate, rank.
///
/// A failed quote or expiration listing aborts the run; a failed chain
/// fetch only costs that expiration. Nothing is retried.
pub async fn run_screen<P: MarketData + ?Sized>(
    provider: &P,
    cache: &mut QuoteCache,
    request: &ScreeningRequest,
) -> Result<ScreenOutcome, ScreenerError> {
    request.validate().map_err(ScreenerError::Validation)?;
    let ticker = &request.ticker;

    let spot = cache
        .price(provider, ticker)
        .await
        .map_err(|source| ScreenerError::NoPriceAvailable {
            ticker: ticker.clone(),
            source,
        })?;
    info!(ticker = %ticker, spot, "fetched underlying price");

    let available = provider.fetch_expirations(ticker).await.map_err(|source| {
        ScreenerError::ExpirationRetrievalFailed {
            ticker: ticker.clone(),
            source,
        }
    })?;

    let candidates = filter_expirations(&available, new_york_date(), request.min_dte, request.max_dte);
    if candidates.is_empty() {
        info!(
            ticker = %ticker,
            min_dte = request.min_dte,
            max_dte = request.max_dte,
            "no expirations inside the DTE window"
        );
        return Ok(ScreenOutcome {
            ticker: ticker.clone(),
            spot,
            opportunities: Vec::new(),
        });
    }

    let mut opportunities: Vec<ScreenedOpportunity> = Vec::new();
    for candidate in &candidates {
        let chain = match provider.fetch_chain(ticker, candidate.date).await {
            Ok(chain) => chain,
            Err(error) => {
                warn!(
                    ticker = %ticker,
                    expiration = %candidate.date,
                    "skipping expiration, chain retrieval failed: {error:#}"
                );
                continue;
            }
        };
        opportunities.extend(screen_chain(
            chain.side(request.strategy),
            candidate.dte,
            spot,
            request.min_otm,
            request.max_otm,
            request.strategy,
        ));
    }

    // Stable sort: ties keep concatenation order.
    opportunities.sort_by(|a, b| b.annualized_return.total_cmp(&a.annualized_return));
    info!(
        ticker = %ticker,
        expirations = candidates.len(),
        opportunities = opportunities.len(),
        "screen complete"
    );
    Ok(ScreenOutcome {
        ticker: ticker.clone(),
        spot,
        opportunities,
    })
}
