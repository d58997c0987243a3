//! In-memory forecast cache with per-entry expiry.
//!
//! Entries are never swept in the background. An expired entry reads as
//! absent and is dropped on that read.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::types::{NormalizedForecast, PostalCode};

/// Namespace tag for forecast keys, keeps them apart from other data in a shared store.
pub const FORECAST_NAMESPACE: &str = "forecast";

/// Composite cache key: namespace tag plus postal code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: &'static str,
    postal_code: PostalCode,
}

impl CacheKey {
    pub fn forecast(postal_code: &PostalCode) -> Self {
        Self {
            namespace: FORECAST_NAMESPACE,
            postal_code: postal_code.clone(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.postal_code)
    }
}

/// Forecast store keyed by postal code.
///
/// Implementations must tolerate concurrent `get`/`put` from many callers.
pub trait ForecastCache: Send + Sync {
    /// Cached forecast, or `None` if never written or already expired.
    fn get(&self, key: &PostalCode) -> Option<NormalizedForecast>;

    /// Store `value` for `ttl`, replacing whatever was there.
    fn put(&self, key: &PostalCode, value: NormalizedForecast, ttl: Duration);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    forecast: NormalizedForecast,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Process-local [`ForecastCache`].
#[derive(Debug, Default)]
pub struct MemoryForecastCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryForecastCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read as of `now`.
    pub fn get_at(&self, key: &PostalCode, now: DateTime<Utc>) -> Option<NormalizedForecast> {
        let key = CacheKey::forecast(key).to_string();

        {
            let entries = self.entries.read();
            match entries.get(&key) {
                None => return None,
                Some(entry) if entry.is_live(now) => return Some(entry.forecast.clone()),
                Some(_) => {}
            }
        }

        // Expired. Re-check under the write lock, a fresh put may have landed.
        let mut entries = self.entries.write();
        if entries.get(&key).is_some_and(|entry| !entry.is_live(now)) {
            entries.remove(&key);
            tracing::debug!(key = %key, "Evicted expired forecast");
        }
        None
    }

    /// Write as of `now`; the entry expires at `now + ttl`.
    pub fn put_at(
        &self,
        key: &PostalCode,
        value: NormalizedForecast,
        ttl: Duration,
        now: DateTime<Utc>,
    ) {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = now
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let entry = CacheEntry {
            forecast: value,
            expires_at,
        };
        self.entries
            .write()
            .insert(CacheKey::forecast(key).to_string(), entry);
    }

    /// Number of stored entries, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ForecastCache for MemoryForecastCache {
    fn get(&self, key: &PostalCode) -> Option<NormalizedForecast> {
        self.get_at(key, Utc::now())
    }

    fn put(&self, key: &PostalCode, value: NormalizedForecast, ttl: Duration) {
        self.put_at(key, value, ttl, Utc::now());
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::types::DailyForecastEntry;
    use std::sync::Arc;

    fn code(s: &str) -> PostalCode {
        PostalCode::new(s).unwrap()
    }

    fn forecast(current: f64) -> NormalizedForecast {
        NormalizedForecast::from_daily(
            current,
            vec![DailyForecastEntry {
                date: "2024-01-01".to_string(),
                high: 75.0,
                low: 65.0,
            }],
        )
        .unwrap()
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_key_format() {
        assert_eq!(CacheKey::forecast(&code("99362")).to_string(), "forecast:99362");
    }

    #[test]
    fn test_get_missing() {
        let cache = MemoryForecastCache::new();
        assert!(cache.get(&code("12345")).is_none());
    }

    #[test]
    fn test_put_then_get() {
        let cache = MemoryForecastCache::new();
        cache.put(&code("12345"), forecast(70.0), Duration::from_secs(1800));
        assert_eq!(cache.get(&code("12345")), Some(forecast(70.0)));
        assert!(cache.get(&code("54321")).is_none());
    }

    #[test]
    fn test_expiry_boundary() {
        let cache = MemoryForecastCache::new();
        let ttl = Duration::from_secs(1800);
        cache.put_at(&code("12345"), forecast(70.0), ttl, t0());

        let just_before = t0() + chrono::Duration::seconds(1799);
        let at_expiry = t0() + chrono::Duration::seconds(1800);

        assert_eq!(cache.get_at(&code("12345"), just_before), Some(forecast(70.0)));
        assert!(cache.get_at(&code("12345"), at_expiry).is_none());
    }

    #[test]
    fn test_expired_entry_is_evicted_on_read() {
        let cache = MemoryForecastCache::new();
        cache.put_at(&code("12345"), forecast(70.0), Duration::from_secs(60), t0());
        assert_eq!(cache.len(), 1);

        let later = t0() + chrono::Duration::minutes(5);
        assert!(cache.get_at(&code("12345"), later).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_overwrites() {
        let cache = MemoryForecastCache::new();
        cache.put_at(&code("12345"), forecast(70.0), Duration::from_secs(60), t0());

        let later = t0() + chrono::Duration::minutes(5);
        cache.put_at(&code("12345"), forecast(42.0), Duration::from_secs(60), later);

        assert_eq!(cache.get_at(&code("12345"), later), Some(forecast(42.0)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_ttl_is_immediately_absent() {
        let cache = MemoryForecastCache::new();
        cache.put_at(&code("12345"), forecast(70.0), Duration::ZERO, t0());
        assert!(cache.get_at(&code("12345"), t0()).is_none());
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(MemoryForecastCache::new());
        let handles: Vec<_> = (0..8_u8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        cache.put(&code("12345"), forecast(f64::from(i)), Duration::from_secs(60));
                        let got = cache.get(&code("12345")).unwrap();
                        assert_eq!(got.daily_forecast().len(), 1);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 1);
    }
}
