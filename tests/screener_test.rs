use chrono::{Duration, NaiveDate};

use wheel_scan::errors::ValidationError;
use wheel_scan::models::{OptionContract, ScreeningRequest, Strategy};
use wheel_scan::screener::{annualized_return, filter_expirations, screen_chain};

fn contract(symbol: &str, strike: f64, bid: f64, last: f64) -> OptionContract {
    OptionContract {
        contract_symbol: symbol.to_string(),
        strike,
        bid: Some(bid),
        last_price: Some(last),
        volume: Some(25),
        open_interest: Some(250),
        implied_volatility: Some(0.42),
        delta: None,
        gamma: None,
        theta: None,
        vega: None,
        rho: None,
    }
}

// ── Strike bands ────────────────────────────────────────────────────

#[test]
fn put_band_keeps_strikes_between_85_and_95_of_spot_100() {
    let contracts = vec![
        contract("P84", 84.9, 1.0, 0.0),
        contract("P85", 85.0, 1.0, 0.0),
        contract("P90", 90.0, 2.0, 0.0),
        contract("P95", 95.0, 3.0, 0.0),
        contract("P96", 95.1, 3.5, 0.0),
    ];
    let kept = screen_chain(&contracts, 30, 100.0, 0.05, 0.15, Strategy::CashSecuredPut);
    let symbols: Vec<&str> = kept.iter().map(|o| o.contract_symbol.as_str()).collect();
    assert_eq!(symbols, vec!["P85", "P90", "P95"]);
}

#[test]
fn call_band_keeps_strikes_between_105_and_115_of_spot_100() {
    let contracts = vec![
        contract("C104", 104.9, 1.0, 0.0),
        contract("C105", 105.0, 1.0, 0.0),
        contract("C110", 110.0, 1.5, 0.0),
        contract("C114", 114.0, 0.8, 0.0),
        contract("C116", 115.1, 0.7, 0.0),
    ];
    let kept = screen_chain(&contracts, 30, 100.0, 0.05, 0.15, Strategy::CoveredCall);
    let symbols: Vec<&str> = kept.iter().map(|o| o.contract_symbol.as_str()).collect();
    assert_eq!(symbols, vec!["C105", "C110", "C114"]);
}

#[test]
fn scenario_put_strike_90_bid_2_dte_30() {
    let kept = screen_chain(
        &[contract("P90", 90.0, 2.0, 0.0)],
        30,
        100.0,
        0.05,
        0.15,
        Strategy::CashSecuredPut,
    );
    assert_eq!(kept.len(), 1);
    let row = &kept[0];
    assert_eq!(row.premium, 2.0);
    assert_eq!(row.collateral, 9000.0);
    assert!((row.annualized_return - 0.2704).abs() < 1e-3);
}

#[test]
fn scenario_call_strike_110_bid_1_5_dte_30() {
    let kept = screen_chain(
        &[contract("C110", 110.0, 1.5, 0.0)],
        30,
        100.0,
        0.05,
        0.15,
        Strategy::CoveredCall,
    );
    assert_eq!(kept.len(), 1);
    let row = &kept[0];
    assert_eq!(row.premium, 1.5);
    assert_eq!(row.collateral, 10000.0);
    assert!((row.annualized_return - 0.1825).abs() < 1e-4);
}

// ── Premium selection ───────────────────────────────────────────────

#[test]
fn premium_prefers_bid_over_last_price() {
    let kept = screen_chain(
        &[contract("P90", 90.0, 2.0, 1.0)],
        30,
        100.0,
        0.05,
        0.15,
        Strategy::CashSecuredPut,
    );
    assert_eq!(kept[0].premium, 2.0);
}

#[test]
fn premium_falls_back_to_last_price_when_bid_is_zero() {
    let kept = screen_chain(
        &[contract("P90", 90.0, 0.0, 1.5)],
        30,
        100.0,
        0.05,
        0.15,
        Strategy::CashSecuredPut,
    );
    assert_eq!(kept[0].premium, 1.5);
}

#[test]
fn contracts_without_any_price_are_dropped() {
    let kept = screen_chain(
        &[contract("P90", 90.0, 0.0, 0.0)],
        30,
        100.0,
        0.05,
        0.15,
        Strategy::CashSecuredPut,
    );
    assert!(kept.is_empty());
}

#[test]
fn missing_bid_field_falls_back_to_last_price() {
    let mut row = contract("P90", 90.0, 0.0, 1.2);
    row.bid = None;
    let kept = screen_chain(&[row], 30, 100.0, 0.05, 0.15, Strategy::CashSecuredPut);
    assert_eq!(kept[0].premium, 1.2);
}

// ── Annualized return ───────────────────────────────────────────────

#[test]
fn annualized_return_grows_with_premium() {
    assert!(annualized_return(2.0, 9000.0, 30) > annualized_return(1.0, 9000.0, 30));
}

#[test]
fn annualized_return_shrinks_with_dte() {
    assert!(annualized_return(2.0, 9000.0, 30) > annualized_return(2.0, 9000.0, 45));
}

#[test]
fn non_positive_dte_yields_no_opportunities() {
    let contracts = [contract("P90", 90.0, 2.0, 0.0)];
    assert!(screen_chain(&contracts, 0, 100.0, 0.05, 0.15, Strategy::CashSecuredPut).is_empty());
    assert!(screen_chain(&contracts, -3, 100.0, 0.05, 0.15, Strategy::CashSecuredPut).is_empty());
}

// ── Risk proxy ──────────────────────────────────────────────────────

#[test]
fn risk_proxy_uses_source_delta_when_present() {
    let mut row = contract("P90", 90.0, 2.0, 0.0);
    row.delta = Some(-0.32);
    let kept = screen_chain(&[row], 30, 100.0, 0.05, 0.15, Strategy::CashSecuredPut);
    assert_eq!(kept[0].risk_proxy, 0.32);
}

#[test]
fn risk_proxy_falls_back_to_strike_distance() {
    let kept = screen_chain(
        &[contract("P90", 90.0, 2.0, 0.0)],
        30,
        100.0,
        0.05,
        0.15,
        Strategy::CashSecuredPut,
    );
    assert!((kept[0].risk_proxy - 0.1).abs() < 1e-12);
}

// ── Expiration filter ───────────────────────────────────────────────

#[test]
fn expiration_window_is_inclusive_on_both_ends() {
    let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    let available: Vec<NaiveDate> = [29, 30, 31]
        .iter()
        .map(|&days| today + Duration::days(days))
        .collect();
    let kept = filter_expirations(&available, today, 30, 30);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].date, today + Duration::days(30));
    assert_eq!(kept[0].dte, 30);
}

#[test]
fn expiration_filter_preserves_source_order() {
    let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    let available: Vec<NaiveDate> = [40, 32, 36]
        .iter()
        .map(|&days| today + Duration::days(days))
        .collect();
    let kept = filter_expirations(&available, today, 30, 45);
    let dtes: Vec<i64> = kept.iter().map(|c| c.dte).collect();
    assert_eq!(dtes, vec![40, 32, 36]);
}

#[test]
fn empty_expiration_input_is_not_an_error() {
    let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    assert!(filter_expirations(&[], today, 30, 45).is_empty());
}

// ── Request validation ──────────────────────────────────────────────

#[test]
fn request_upper_cases_and_trims_the_ticker() {
    let request = ScreeningRequest::new(" aapl ", 30, 45, 0.05, 0.15, Strategy::CashSecuredPut);
    assert_eq!(request.ticker, "AAPL");
    assert!(request.validate().is_ok());
}

#[test]
fn inverted_dte_band_is_rejected() {
    let request = ScreeningRequest::new("AAPL", 45, 30, 0.05, 0.15, Strategy::CashSecuredPut);
    let errors = request.validate().unwrap_err();
    assert!(errors.contains(&ValidationError::DteBandInverted { min: 45, max: 30 }));
}

#[test]
fn inverted_otm_band_is_rejected() {
    let request = ScreeningRequest::new("AAPL", 30, 45, 0.15, 0.05, Strategy::CoveredCall);
    let errors = request.validate().unwrap_err();
    assert!(errors.contains(&ValidationError::OtmBandInverted { min: 0.15, max: 0.05 }));
}

#[test]
fn out_of_bounds_values_are_rejected() {
    let request = ScreeningRequest::new("AAPL", 0, 120, 0.001, 0.5, Strategy::CashSecuredPut);
    let errors = request.validate().unwrap_err();
    assert!(errors.contains(&ValidationError::DteOutOfBounds { value: 0 }));
    assert!(errors.contains(&ValidationError::DteOutOfBounds { value: 120 }));
    assert!(errors.contains(&ValidationError::OtmOutOfBounds { value: 0.001 }));
    assert!(errors.contains(&ValidationError::OtmOutOfBounds { value: 0.5 }));
}

#[test]
fn empty_ticker_is_rejected() {
    let request = ScreeningRequest::new("   ", 30, 45, 0.05, 0.15, Strategy::CashSecuredPut);
    let errors = request.validate().unwrap_err();
    assert!(errors.contains(&ValidationError::EmptyTicker));
}
