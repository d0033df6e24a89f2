//! Place name to coordinate resolution.
//!
//! The pipeline only sees the [`Geocoder`] trait. "Not found" is an ordinary
//! answer (`Ok(None)`); transport and provider problems are errors.

mod cached;
mod nominatim;

pub use cached::CachingGeocoder;
pub use nominatim::NominatimGeocoder;

use crate::config::GeocoderConfig;
use crate::error::{FinderError, Result};
use crate::types::Coordinates;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve `place`, qualified by `context` (a borough), to coordinates.
    ///
    /// Returns `Ok(None)` when the provider has no match, and
    /// [`FinderError::LookupFailed`] when the provider could not be asked.
    async fn resolve(&self, place: &str, context: &str) -> Result<Option<Coordinates>>;
}

#[async_trait]
impl<G: Geocoder + ?Sized> Geocoder for Arc<G> {
    async fn resolve(&self, place: &str, context: &str) -> Result<Option<Coordinates>> {
        (**self).resolve(place, context).await
    }
}

/// Build the configured provider, wrapped in a cache when enabled.
pub fn geocoder_from_config(config: &GeocoderConfig) -> Result<Arc<dyn Geocoder>> {
    let nominatim = NominatimGeocoder::new(config)?;
    if config.cache {
        Ok(Arc::new(CachingGeocoder::new(nominatim)))
    } else {
        Ok(Arc::new(nominatim))
    }
}

pub(crate) fn cache_key(place: &str, context: &str) -> (String, String) {
    (place.trim().to_lowercase(), context.trim().to_lowercase())
}

/// Table-backed geocoder for tests and offline runs.
#[derive(Debug, Default)]
pub struct StaticGeocoder {
    places: HashMap<(String, String), Coordinates>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, place: &str, context: &str, coordinates: Coordinates) -> Self {
        self.places.insert(cache_key(place, context), coordinates);
        self
    }

    /// A geocoder whose every lookup fails with `LookupFailed(reason)`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    /// How many lookups have been made.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn resolve(&self, place: &str, context: &str) -> Result<Option<Coordinates>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.failure {
            return Err(FinderError::LookupFailed(reason.clone()));
        }
        Ok(self.places.get(&cache_key(place, context)).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_geocoder_matches_case_insensitively() {
        let geocoder =
            StaticGeocoder::new().with_place("SoHo", "Manhattan", Coordinates::new(40.723, -74.0));
        let hit = geocoder.resolve(" soho ", "MANHATTAN").await.unwrap();
        assert_eq!(hit, Some(Coordinates::new(40.723, -74.0)));
        assert_eq!(geocoder.resolve("SoHo", "Brooklyn").await.unwrap(), None);
        assert_eq!(geocoder.calls(), 2);
    }

    #[tokio::test]
    async fn failing_geocoder_reports_lookup_failure() {
        let geocoder = StaticGeocoder::failing("timeout");
        let err = geocoder.resolve("SoHo", "Manhattan").await.unwrap_err();
        assert!(matches!(err, FinderError::LookupFailed(ref r) if r == "timeout"));
    }

    #[tokio::test]
    async fn arc_forwards_to_inner() {
        let dumbo = Coordinates::new(40.703, -73.989);
        let geocoder: Arc<dyn Geocoder> =
            Arc::new(StaticGeocoder::new().with_place("DUMBO", "Brooklyn", dumbo));
        assert!(geocoder.resolve("DUMBO", "Brooklyn").await.unwrap().is_some());
    }
}
