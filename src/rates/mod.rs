// Rates module - official USD/UAH exchange rates

pub mod nbu;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::error::RateError;

pub use nbu::NbuClient;

/// Which day's rate to look up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateQuery {
    On(NaiveDate),
    Latest,
}

impl RateQuery {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            RateQuery::On(date) => Some(*date),
            RateQuery::Latest => None,
        }
    }
}

/// An official rate: UAH per one unit of `currency`, effective on `as_of`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateQuote {
    pub currency: String,
    pub rate: Decimal,
    pub as_of: NaiveDate,
}

/// Source of official exchange rates
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fails with [`RateError::NotFound`] when no quote exists for the date
    async fn lookup_rate(&self, currency: &str, query: RateQuery) -> Result<RateQuote, RateError>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    quote: RateQuote,
    timestamp: DateTime<Utc>,
}

/// Caching wrapper around a [`RateProvider`].
///
/// Rates for a past date are fixed once published, so dated quotes are kept
/// for the life of the process. `Latest` changes daily and expires after the
/// configured TTL.
pub struct CachedRateProvider<P> {
    inner: P,
    cache: Arc<Mutex<HashMap<(String, RateQuery), CacheEntry>>>,
    latest_ttl: Duration,
}

impl<P: RateProvider> CachedRateProvider<P> {
    pub fn new(inner: P, latest_ttl: Duration) -> Self {
        Self {
            inner,
            cache: Arc::new(Mutex::new(HashMap::new())),
            latest_ttl,
        }
    }

    fn cached(&self, key: &(String, RateQuery)) -> Option<RateQuote> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        let entry = cache.get(key)?;
        if key.1 == RateQuery::Latest {
            let age = Utc::now().signed_duration_since(entry.timestamp);
            if age >= self.latest_ttl {
                return None;
            }
        }
        Some(entry.quote.clone())
    }
}

#[async_trait]
impl<P: RateProvider> RateProvider for CachedRateProvider<P> {
    async fn lookup_rate(&self, currency: &str, query: RateQuery) -> Result<RateQuote, RateError> {
        let key = (currency.to_uppercase(), query);
        if let Some(quote) = self.cached(&key) {
            debug!("Using cached {} rate for {:?}", key.0, query);
            return Ok(quote);
        }

        let quote = self.inner.lookup_rate(currency, query).await?;

        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.insert(
            key,
            CacheEntry {
                quote: quote.clone(),
                timestamp: Utc::now(),
            },
        );
        Ok(quote)
    }
}

/// Provider that always answers with a rate supplied up front.
///
/// Used when the user passes the rate on the command line.
#[derive(Debug, Clone)]
pub struct FixedRate {
    rate: Decimal,
}

impl FixedRate {
    pub fn new(rate: Decimal) -> Self {
        Self { rate }
    }
}

#[async_trait]
impl RateProvider for FixedRate {
    async fn lookup_rate(&self, currency: &str, query: RateQuery) -> Result<RateQuote, RateError> {
        Ok(RateQuote {
            currency: currency.to_uppercase(),
            rate: self.rate,
            as_of: query.date().unwrap_or_else(|| Utc::now().date_naive()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and answers from a fixed table
    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RateProvider for CountingProvider {
        async fn lookup_rate(
            &self,
            currency: &str,
            query: RateQuery,
        ) -> Result<RateQuote, RateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match query {
                RateQuery::On(date) if date.format("%d").to_string() == "06" => {
                    Err(RateError::NotFound {
                        currency: currency.to_string(),
                        date: Some(date),
                    })
                }
                _ => Ok(RateQuote {
                    currency: currency.to_string(),
                    rate: dec!(36.5686),
                    as_of: query
                        .date()
                        .unwrap_or_else(|| NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()),
                }),
            }
        }
    }

    fn counting() -> CachedRateProvider<CountingProvider> {
        CachedRateProvider::new(
            CountingProvider {
                calls: AtomicUsize::new(0),
            },
            Duration::hours(1),
        )
    }

    fn cache_size<P>(provider: &CachedRateProvider<P>) -> usize {
        provider.cache.lock().unwrap().len()
    }

    #[tokio::test]
    async fn test_dated_quotes_are_cached() {
        let provider = counting();
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();

        let first = provider.lookup_rate("USD", RateQuery::On(date)).await.unwrap();
        let second = provider.lookup_rate("usd", RateQuery::On(date)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache_size(&provider), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let provider = counting();
        let date = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();

        for _ in 0..2 {
            let err = provider.lookup_rate("USD", RateQuery::On(date)).await;
            assert!(matches!(err, Err(RateError::NotFound { .. })));
        }
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache_size(&provider), 0);
    }

    #[tokio::test]
    async fn test_latest_expires_after_ttl() {
        let provider = CachedRateProvider::new(
            CountingProvider {
                calls: AtomicUsize::new(0),
            },
            Duration::zero(),
        );

        provider.lookup_rate("USD", RateQuery::Latest).await.unwrap();
        provider.lookup_rate("USD", RateQuery::Latest).await.unwrap();
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_latest_is_cached_within_ttl() {
        let provider = counting();

        let first = provider.lookup_rate("USD", RateQuery::Latest).await.unwrap();
        let second = provider.lookup_rate("USD", RateQuery::Latest).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache_size(&provider), 1);
    }

    #[tokio::test]
    async fn test_fixed_rate_echoes_requested_date() {
        let provider = FixedRate::new(dec!(41.1));
        let date = NaiveDate::from_ymd_opt(2024, 12, 2).unwrap();
        let quote = provider.lookup_rate("usd", RateQuery::On(date)).await.unwrap();

        assert_eq!(quote.rate, dec!(41.1));
        assert_eq!(quote.as_of, date);
        assert_eq!(quote.currency, "USD");
    }
}
