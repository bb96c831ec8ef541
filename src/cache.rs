use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::debug;

use crate::requests::MarketData;
use crate::QUOTE_CACHE_TTL_SECS;

struct CachedQuote {
    price: f64,
    fetched_at: Instant,
}

/// Price-by-ticker cache with a time-to-live. Entries past the TTL are
/// refetched on the next read; `invalidate` and `refresh` force it sooner.
pub struct QuoteCache {
    ttl: Duration,
    entries: HashMap<String, CachedQuote>,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(QUOTE_CACHE_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Get-or-fetch: a live cache entry wins, otherwise the provider is
    /// asked and the answer cached.
    pub async fn price<P: MarketData + ?Sized>(
        &mut self,
        provider: &P,
        ticker: &str,
    ) -> Result<f64> {
        if let Some(entry) = self.entries.get(ticker) {
            if entry.fetched_at.elapsed() < self.ttl {
                debug!(ticker, price = entry.price, "quote cache hit");
                return Ok(entry.price);
            }
        }
        self.refresh(provider, ticker).await
    }

    /// Fetch unconditionally and replace whatever was cached.
    pub async fn refresh<P: MarketData + ?Sized>(
        &mut self,
        provider: &P,
        ticker: &str,
    ) -> Result<f64> {
        let price = provider.fetch_quote(ticker).await?;
        self.entries.insert(
            ticker.to_string(),
            CachedQuote {
                price,
                fetched_at: Instant::now(),
            },
        );
        Ok(price)
    }

    pub fn invalidate(&mut self, ticker: &str) {
        self.entries.remove(ticker);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new()
    }
}
