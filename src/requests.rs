use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::{OptionChainSlice, OptionContract};

const QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const OPTIONS_URL: &str = "https://query1.finance.yahoo.com/v7/finance/options";

// The quote host rejects requests without a browser user agent.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// What the screener needs from a market-data source. Implementations do
/// not retry; one logical request is in flight at a time.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Current price of the underlying. Err only when every retrieval
    /// strategy the source supports has failed.
    async fn fetch_quote(&self, ticker: &str) -> Result<f64>;

    /// All listed expiration dates for the ticker, in the source's order.
    async fn fetch_expirations(&self, ticker: &str) -> Result<Vec<NaiveDate>>;

    /// Put and call rows for one expiration.
    async fn fetch_chain(&self, ticker: &str, expiration: NaiveDate) -> Result<OptionChainSlice>;
}

/// HTTP client for the Yahoo Finance public endpoints.
pub struct YahooFinance {
    client: reqwest::Client,
}

impl YahooFinance {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }

    /// Strategy 1: the quote endpoint's regular market price.
    async fn quote_endpoint_price(&self, ticker: &str) -> Result<Option<f64>> {
        let envelope: QuoteEnvelope = self
            .client
            .get(QUOTE_URL)
            .query(&[("symbols", ticker)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(envelope
            .quote_response
            .result
            .first()
            .and_then(|row| row.regular_market_price))
    }

    async fn chart(&self, ticker: &str) -> Result<ChartResult> {
        let envelope: ChartEnvelope = self
            .client
            .get(format!("{CHART_URL}/{ticker}"))
            .query(&[("range", "5d"), ("interval", "1d")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        envelope
            .chart
            .result
            .into_iter()
            .flatten()
            .next()
            .context("chart response had no result")
    }

    /// Strategy 2: the most recent daily close from the chart endpoint.
    async fn daily_close_price(&self, ticker: &str) -> Result<Option<f64>> {
        let chart = self.chart(ticker).await?;
        Ok(chart
            .indicators
            .quote
            .first()
            .and_then(|quote| quote.close.iter().rev().find_map(|close| *close)))
    }

    /// Strategy 3: the chart metadata's fast price field.
    async fn chart_meta_price(&self, ticker: &str) -> Result<Option<f64>> {
        Ok(self.chart(ticker).await?.meta.regular_market_price)
    }

    async fn options(&self, ticker: &str, date: Option<i64>) -> Result<OptionsResult> {
        let mut request = self.client.get(format!("{OPTIONS_URL}/{ticker}"));
        if let Some(date) = date {
            request = request.query(&[("date", date.to_string())]);
        }
        let envelope: OptionsEnvelope = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        envelope
            .option_chain
            .result
            .into_iter()
            .next()
            .with_context(|| format!("options response for {ticker} had no result"))
    }
}

fn usable(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

#[async_trait]
impl MarketData for YahooFinance {
    async fn fetch_quote(&self, ticker: &str) -> Result<f64> {
        let mut last_error: Option<anyhow::Error> = None;

        match self.quote_endpoint_price(ticker).await {
            Ok(Some(price)) if usable(price) => return Ok(price),
            Ok(_) => debug!(ticker, "quote endpoint returned no usable price"),
            Err(error) => {
                warn!(ticker, "quote endpoint failed: {error:#}");
                last_error = Some(error);
            }
        }

        match self.daily_close_price(ticker).await {
            Ok(Some(price)) if usable(price) => return Ok(price),
            Ok(_) => debug!(ticker, "chart endpoint returned no usable close"),
            Err(error) => {
                warn!(ticker, "chart endpoint failed: {error:#}");
                last_error = Some(error);
            }
        }

        match self.chart_meta_price(ticker).await {
            Ok(Some(price)) if usable(price) => return Ok(price),
            Ok(_) => debug!(ticker, "chart metadata carried no usable price"),
            Err(error) => {
                warn!(ticker, "chart metadata lookup failed: {error:#}");
                last_error = Some(error);
            }
        }

        match last_error {
            Some(error) => Err(error.context(format!("every price source failed for {ticker}"))),
            None => bail!("every price source returned no usable price for {ticker}"),
        }
    }

    async fn fetch_expirations(&self, ticker: &str) -> Result<Vec<NaiveDate>> {
        let result = self.options(ticker, None).await?;
        let dates: Vec<NaiveDate> = result
            .expiration_dates
            .iter()
            .filter_map(|ts| DateTime::from_timestamp(*ts, 0))
            .map(|dt| dt.date_naive())
            .collect();
        debug!(ticker, count = dates.len(), "listed expirations");
        Ok(dates)
    }

    async fn fetch_chain(&self, ticker: &str, expiration: NaiveDate) -> Result<OptionChainSlice> {
        let date = expiration.and_time(NaiveTime::MIN).and_utc().timestamp();
        let result = self.options(ticker, Some(date)).await?;
        let slab = result
            .options
            .into_iter()
            .next()
            .with_context(|| format!("no chain returned for {ticker} {expiration}"))?;
        debug!(
            ticker,
            %expiration,
            puts = slab.puts.len(),
            calls = slab.calls.len(),
            "fetched option chain"
        );
        Ok(OptionChainSlice {
            expiration,
            puts: slab.puts,
            calls: slab.calls,
        })
    }
}

// Response envelopes for the three endpoints.

#[derive(Debug, Deserialize)]
struct QuoteEnvelope {
    #[serde(rename = "quoteResponse")]
    quote_response: QuoteBody,
}

#[derive(Debug, Deserialize)]
struct QuoteBody {
    #[serde(default)]
    result: Vec<QuoteRow>,
}

#[derive(Debug, Deserialize)]
struct QuoteRow {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OptionsEnvelope {
    #[serde(rename = "optionChain")]
    option_chain: OptionsBody,
}

#[derive(Debug, Deserialize)]
struct OptionsBody {
    #[serde(default)]
    result: Vec<OptionsResult>,
}

#[derive(Debug, Deserialize)]
struct OptionsResult {
    #[serde(rename = "expirationDates", default)]
    expiration_dates: Vec<i64>,
    #[serde(default)]
    options: Vec<ChainSlab>,
}

#[derive(Debug, Deserialize)]
struct ChainSlab {
    #[serde(default)]
    puts: Vec<OptionContract>,
    #[serde(default)]
    calls: Vec<OptionContract>,
}
