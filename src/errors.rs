use thiserror::Error;

/// Failures that abort a screening run. Per-expiration chain failures are
/// not represented here: the orchestrator logs and skips them.
#[derive(Debug, Error)]
pub enum ScreenerError {
    #[error("no price available for {ticker}: every quote source failed")]
    NoPriceAvailable {
        ticker: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("could not list option expirations for {ticker}")]
    ExpirationRetrievalFailed {
        ticker: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid screening request: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("ticker must not be empty")]
    EmptyTicker,

    #[error("min DTE {min} must be below max DTE {max}")]
    DteBandInverted { min: i64, max: i64 },

    #[error("DTE {value} is outside the allowed 1..=90 day window")]
    DteOutOfBounds { value: i64 },

    #[error("min OTM {min} must be below max OTM {max}")]
    OtmBandInverted { min: f64, max: f64 },

    #[error("OTM {value} is outside the allowed 0.01..=0.30 range")]
    OtmOutOfBounds { value: f64 },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|error| error.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
