//! Result cache in front of an overlay provider.
//!
//! Entries are keyed by request kind and parameters (`"geocode:<address>"`,
//! `"footprints:<lat>:<lon>:<radius>"`) and expire after the configured TTL. Only
//! successful results are cached, so a failed lookup is retried on the next request.

use std::num::NonZeroUsize;
use std::time::Duration;

use log::debug;
use lru::LruCache;
use web_time::Instant;

use super::{FootprintsResponse, GeocodeResult, OverlayError, OverlayProvider};

#[derive(Clone)]
enum CachedValue {
    Geocode(GeocodeResult),
    Footprints(FootprintsResponse),
}

struct CacheEntry {
    stored_at: Instant,
    value: CachedValue,
}

/// An `OverlayProvider` that remembers recent results of another provider.
pub struct CachedOverlayProvider<P: OverlayProvider> {
    inner: P,
    entries: LruCache<String, CacheEntry>,
    ttl: Duration,
}

impl<P: OverlayProvider> CachedOverlayProvider<P> {
    /// # Arguments
    /// * `inner` - Provider consulted on cache misses
    /// * `capacity` - Maximum number of cached results; zero is treated as one
    /// * `ttl` - How long a result stays valid
    pub fn new(inner: P, capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            entries: LruCache::new(capacity),
            ttl,
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn lookup(&mut self, key: &str) -> Option<CachedValue> {
        let fresh = match self.entries.get(key) {
            Some(entry) => entry.stored_at.elapsed() < self.ttl,
            None => return None,
        };
        if !fresh {
            self.entries.pop(key);
            return None;
        }
        debug!("Overlay cache hit for {}", key);
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    fn store(&mut self, key: String, value: CachedValue) {
        self.entries.put(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                value,
            },
        );
    }
}

fn cache_key(kind: &str, params: &[String]) -> String {
    let mut key = kind.to_string();
    for param in params {
        key.push(':');
        key.push_str(param);
    }
    key
}

impl<P: OverlayProvider> OverlayProvider for CachedOverlayProvider<P> {
    fn geocode(&mut self, address: &str) -> Result<GeocodeResult, OverlayError> {
        let key = cache_key("geocode", &[address.to_string()]);
        if let Some(CachedValue::Geocode(result)) = self.lookup(&key) {
            return Ok(result);
        }
        let result = self.inner.geocode(address)?;
        self.store(key, CachedValue::Geocode(result.clone()));
        Ok(result)
    }

    fn fetch_footprints(
        &mut self,
        lat: f64,
        lon: f64,
        radius_metres: f64,
    ) -> Result<FootprintsResponse, OverlayError> {
        let key = cache_key(
            "footprints",
            &[lat.to_string(), lon.to_string(), radius_metres.to_string()],
        );
        if let Some(CachedValue::Footprints(result)) = self.lookup(&key) {
            return Ok(result);
        }
        let result = self.inner.fetch_footprints(lat, lon, radius_metres)?;
        self.store(key, CachedValue::Footprints(result.clone()));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingProvider {
        geocode_calls: usize,
        footprint_calls: usize,
        fail: bool,
    }

    impl OverlayProvider for CountingProvider {
        fn geocode(&mut self, address: &str) -> Result<GeocodeResult, OverlayError> {
            self.geocode_calls += 1;
            if self.fail {
                return Err(OverlayError::NotFound(address.to_string()));
            }
            Ok(GeocodeResult {
                lat: 1.0,
                lon: 2.0,
                display_name: address.to_string(),
            })
        }

        fn fetch_footprints(&mut self, _: f64, _: f64, _: f64) -> Result<FootprintsResponse, OverlayError> {
            self.footprint_calls += 1;
            Ok(FootprintsResponse::default())
        }
    }

    #[test]
    fn repeated_requests_hit_the_cache() {
        let mut cached = CachedOverlayProvider::new(CountingProvider::default(), 8, Duration::from_secs(600));
        cached.geocode("a").unwrap();
        cached.geocode("a").unwrap();
        cached.geocode("b").unwrap();
        cached.fetch_footprints(1.0, 2.0, 300.0).unwrap();
        cached.fetch_footprints(1.0, 2.0, 300.0).unwrap();
        cached.fetch_footprints(1.0, 2.0, 100.0).unwrap();

        assert_eq!(cached.inner().geocode_calls, 2);
        assert_eq!(cached.inner().footprint_calls, 2);
    }

    #[test]
    fn expired_entries_are_refetched() {
        let mut cached = CachedOverlayProvider::new(CountingProvider::default(), 8, Duration::ZERO);
        cached.geocode("a").unwrap();
        cached.geocode("a").unwrap();
        assert_eq!(cached.inner().geocode_calls, 2);
    }

    #[test]
    fn failures_are_not_cached() {
        let provider = CountingProvider {
            fail: true,
            ..Default::default()
        };
        let mut cached = CachedOverlayProvider::new(provider, 8, Duration::from_secs(600));
        assert!(cached.geocode("x").is_err());
        assert!(cached.geocode("x").is_err());
        assert_eq!(cached.inner().geocode_calls, 2);
    }

    #[test]
    fn keys_join_kind_and_parameters() {
        assert_eq!(cache_key("geocode", &["x y".to_string()]), "geocode:x y");
        assert_eq!(
            cache_key("footprints", &["1".to_string(), "2".to_string()]),
            "footprints:1:2"
        );
    }
}
