use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::{DTE_LOWER_LIMIT, DTE_UPPER_LIMIT, OTM_LOWER_LIMIT, OTM_UPPER_LIMIT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Sell a put backed by cash equal to strike x 100.
    CashSecuredPut,
    /// Sell a call backed by 100 owned shares of the underlying.
    CoveredCall,
}

impl Strategy {
    /// Inclusive [low, high] strike band for the OTM window. Puts sit below
    /// spot, calls above.
    pub fn strike_band(&self, spot: f64, min_otm: f64, max_otm: f64) -> (f64, f64) {
        match self {
            Strategy::CashSecuredPut => (spot * (1.0 - max_otm), spot * (1.0 - min_otm)),
            Strategy::CoveredCall => (spot * (1.0 + min_otm), spot * (1.0 + max_otm)),
        }
    }

    /// Capital reserved against assignment: cash for the put, shares for
    /// the call.
    pub fn collateral(&self, spot: f64, strike: f64) -> f64 {
        match self {
            Strategy::CashSecuredPut => strike * crate::CONTRACT_MULTIPLIER,
            Strategy::CoveredCall => spot * crate::CONTRACT_MULTIPLIER,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Strategy::CashSecuredPut => "cash-secured-put",
            Strategy::CoveredCall => "covered-call",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::CashSecuredPut => write!(f, "cash-secured put"),
            Strategy::CoveredCall => write!(f, "covered call"),
        }
    }
}

/// One screening run's input configuration. Validated before any network
/// call is made.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningRequest {
    pub ticker: String,
    pub min_dte: i64,
    pub max_dte: i64,
    pub min_otm: f64,
    pub max_otm: f64,
    pub strategy: Strategy,
}

impl ScreeningRequest {
    pub fn new(
        ticker: &str,
        min_dte: i64,
        max_dte: i64,
        min_otm: f64,
        max_otm: f64,
        strategy: Strategy,
    ) -> Self {
        Self {
            ticker: ticker.trim().to_uppercase(),
            min_dte,
            max_dte,
            min_otm,
            max_otm,
            strategy,
        }
    }

    /// Checks every field, collecting all failures rather than stopping at
    /// the first.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if self.ticker.is_empty() {
            errors.push(ValidationError::EmptyTicker);
        }
        for value in [self.min_dte, self.max_dte] {
            if !(DTE_LOWER_LIMIT..=DTE_UPPER_LIMIT).contains(&value) {
                errors.push(ValidationError::DteOutOfBounds { value });
            }
        }
        if self.min_dte >= self.max_dte {
            errors.push(ValidationError::DteBandInverted {
                min: self.min_dte,
                max: self.max_dte,
            });
        }
        for value in [self.min_otm, self.max_otm] {
            if !(OTM_LOWER_LIMIT..=OTM_UPPER_LIMIT).contains(&value) {
                errors.push(ValidationError::OtmOutOfBounds { value });
            }
        }
        if self.min_otm >= self.max_otm {
            errors.push(ValidationError::OtmBandInverted {
                min: self.min_otm,
                max: self.max_otm,
            });
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// An expiration date that survived the DTE filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationCandidate {
    pub date: NaiveDate,
    pub dte: i64,
}

/// One listed contract as the data source reports it. Fields the source may
/// omit deserialize to None.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionContract {
    #[serde(default)]
    pub contract_symbol: String,
    #[serde(default)]
    pub strike: f64,
    #[serde(default)]
    pub bid: Option<f64>,
    #[serde(default)]
    pub last_price: Option<f64>,
    #[serde(default)]
    pub volume: Option<i64>,
    #[serde(default)]
    pub open_interest: Option<i64>,
    #[serde(default)]
    pub implied_volatility: Option<f64>,
    #[serde(default)]
    pub delta: Option<f64>,
    #[serde(default)]
    pub gamma: Option<f64>,
    #[serde(default)]
    pub theta: Option<f64>,
    #[serde(default)]
    pub vega: Option<f64>,
    #[serde(default)]
    pub rho: Option<f64>,
}

impl OptionContract {
    /// Executable premium: the bid when one exists, otherwise the last
    /// trade. Zero means the contract has no usable price.
    pub fn premium(&self) -> f64 {
        match self.bid {
            Some(bid) if bid > 0.0 => bid,
            _ => self.last_price.unwrap_or(0.0),
        }
    }

    /// |delta| when the source supplies one. The fallback is
    /// |strike - spot| / spot, a distance heuristic rather than a Greek: it
    /// only shares true delta's property of growing with OTM distance.
    pub fn risk_proxy(&self, spot: f64) -> f64 {
        match self.delta {
            Some(delta) => delta.abs(),
            None => (self.strike - spot).abs() / spot,
        }
    }
}

/// The put and call rows fetched for one expiration.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionChainSlice {
    pub expiration: NaiveDate,
    pub puts: Vec<OptionContract>,
    pub calls: Vec<OptionContract>,
}

impl OptionChainSlice {
    pub fn side(&self, strategy: Strategy) -> &[OptionContract] {
        match strategy {
            Strategy::CashSecuredPut => &self.puts,
            Strategy::CoveredCall => &self.calls,
        }
    }
}

/// A contract that passed every filter, annotated with the numbers a seller
/// cares about. Derived per request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenedOpportunity {
    pub contract_symbol: String,
    pub dte: i64,
    pub strike: f64,
    pub premium: f64,
    pub collateral: f64,
    pub risk_proxy: f64,
    pub volume: Option<i64>,
    pub open_interest: Option<i64>,
    pub implied_volatility: Option<f64>,
    pub annualized_return: f64,
}

/// Result of one screening run. An empty opportunity list is a valid
/// terminal state; the spot price is still meaningful to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenOutcome {
    pub ticker: String,
    pub spot: f64,
    pub opportunities: Vec<ScreenedOpportunity>,
}
