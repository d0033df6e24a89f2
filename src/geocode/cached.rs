use super::{cache_key, Geocoder};
use crate::error::Result;
use crate::metrics;
use crate::types::Coordinates;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// Memoizes answers of an inner geocoder by `(place, context)`.
///
/// Both matches and "not found" are remembered; failures are not, so a
/// caller retry reaches the provider again.
pub struct CachingGeocoder<G> {
    inner: G,
    cache: Mutex<HashMap<(String, String), Option<Coordinates>>>,
}

impl<G: Geocoder> CachingGeocoder<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn lookup(&self, key: &(String, String)) -> Option<Option<Coordinates>> {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .copied()
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for CachingGeocoder<G> {
    async fn resolve(&self, place: &str, context: &str) -> Result<Option<Coordinates>> {
        let key = cache_key(place, context);
        if let Some(answer) = self.lookup(&key) {
            debug!(place, context, "Geocode cache hit");
            metrics::record_geocode_cache_hit();
            return Ok(answer);
        }

        let answer = self.inner.resolve(place, context).await?;
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, answer);
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::StaticGeocoder;

    #[tokio::test]
    async fn repeats_are_served_from_cache() {
        let astoria = Coordinates::new(40.764, -73.923);
        let geocoder =
            CachingGeocoder::new(StaticGeocoder::new().with_place("Astoria", "Queens", astoria));
        for _ in 0..3 {
            assert!(geocoder.resolve("Astoria", "Queens").await.unwrap().is_some());
        }
        assert!(geocoder.resolve("astoria", "queens").await.unwrap().is_some());
        assert_eq!(geocoder.inner().calls(), 1);
    }

    #[tokio::test]
    async fn not_found_is_cached_too() {
        let geocoder = CachingGeocoder::new(StaticGeocoder::new());
        assert_eq!(geocoder.resolve("Nowhereville", "Queens").await.unwrap(), None);
        assert_eq!(geocoder.resolve("Nowhereville", "Queens").await.unwrap(), None);
        assert_eq!(geocoder.inner().calls(), 1);
        assert_eq!(geocoder.cached_entries(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let geocoder = CachingGeocoder::new(StaticGeocoder::failing("down"));
        assert!(geocoder.resolve("SoHo", "Manhattan").await.is_err());
        assert!(geocoder.resolve("SoHo", "Manhattan").await.is_err());
        assert_eq!(geocoder.inner().calls(), 2);
        assert_eq!(geocoder.cached_entries(), 0);
    }
}
