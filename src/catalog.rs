//! Static venue catalog.
//!
//! The catalog is read once at startup from a JSON array of venue records
//! and never modified afterwards. Records without a name or usable
//! coordinates are dropped with a warning; the rest keep their source order,
//! which later serves as the ranking tie-break.

use crate::error::{FinderError, Result};
use crate::metrics;
use crate::types::{Coordinates, PriceRange, Venue};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A venue record as it appears in the source file. Everything is optional
/// so that one malformed record cannot poison the whole load.
#[derive(Debug, Deserialize)]
struct RawVenueRecord {
    name: Option<String>,
    address: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    neighborhood: Option<String>,
    borough: Option<String>,
    price_range: Option<String>,
    rating: Option<f64>,
    vibe: Option<String>,
}

impl RawVenueRecord {
    fn into_venue(self) -> std::result::Result<Venue, String> {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| "missing name".to_string())?;

        let coordinates = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Coordinates::new(lat, lng),
            _ => return Err(format!("'{}' is missing coordinates", name)),
        };
        if !coordinates.is_valid() {
            return Err(format!("'{}' has out-of-range coordinates {}", name, coordinates));
        }

        let price_range = match self.price_range.as_deref() {
            None => PriceRange::default(),
            Some(symbol) => symbol.parse::<PriceRange>().unwrap_or_else(|_| {
                warn!(venue = %name, price = symbol, "Unknown price range, using $$");
                PriceRange::default()
            }),
        };

        let rating = match self.rating {
            None => 0.0,
            Some(r) if (0.0..=5.0).contains(&r) => r,
            Some(r) => {
                warn!(venue = %name, rating = r, "Rating outside 0-5, clamping");
                r.clamp(0.0, 5.0)
            }
        };

        Ok(Venue {
            name,
            address: self.address.unwrap_or_default(),
            coordinates,
            neighborhood: self.neighborhood.unwrap_or_default(),
            borough: self.borough.unwrap_or_default(),
            price_range,
            rating,
            vibe: self.vibe.unwrap_or_default(),
        })
    }
}

/// Immutable, ordered venue collection. Cloning shares the underlying records.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    venues: Arc<Vec<Arc<Venue>>>,
    dropped: usize,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_venues(venues: Vec<Venue>) -> Self {
        Self {
            venues: Arc::new(venues.into_iter().map(Arc::new).collect()),
            dropped: 0,
        }
    }

    /// Load the catalog from a JSON file.
    ///
    /// Fails with [`FinderError::DataUnavailable`] when the file is missing,
    /// unreadable or not a JSON array. Invalid records are dropped.
    #[instrument]
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| FinderError::DataUnavailable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let catalog = Self::from_slice(&bytes).map_err(|e| match e {
            FinderError::DataUnavailable { reason, .. } => FinderError::DataUnavailable {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })?;
        info!(
            "Loaded {} venues from {} ({} dropped)",
            catalog.len(),
            path.display(),
            catalog.dropped
        );
        Ok(catalog)
    }

    /// Load, degrading to an empty catalog. The error, if any, is handed back
    /// so the caller can surface a warning.
    pub fn load_or_empty(path: &Path) -> (Self, Option<FinderError>) {
        match Self::load(path) {
            Ok(catalog) => (catalog, None),
            Err(e) => {
                warn!("Venue data unavailable, continuing with an empty catalog: {}", e);
                (Self::empty(), Some(e))
            }
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let document: Value =
            serde_json::from_slice(bytes).map_err(|e| FinderError::DataUnavailable {
                path: "<memory>".to_string(),
                reason: format!("not valid JSON: {}", e),
            })?;
        let records = match document {
            Value::Array(records) => records,
            other => {
                return Err(FinderError::DataUnavailable {
                    path: "<memory>".to_string(),
                    reason: format!("expected a JSON array of venues, found {}", json_kind(&other)),
                })
            }
        };

        let mut venues = Vec::with_capacity(records.len());
        let mut dropped = 0;
        for (index, record) in records.into_iter().enumerate() {
            let parsed = serde_json::from_value::<RawVenueRecord>(record)
                .map_err(|e| format!("malformed record: {}", e))
                .and_then(RawVenueRecord::into_venue);
            match parsed {
                Ok(venue) => venues.push(Arc::new(venue)),
                Err(reason) => {
                    warn!(index, "Dropping catalog record: {}", reason);
                    dropped += 1;
                }
            }
        }
        metrics::record_dropped_records(dropped);

        Ok(Self {
            venues: Arc::new(venues),
            dropped,
        })
    }

    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }

    /// Number of source records rejected during load.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Venue>> {
        self.venues.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Venue>> {
        self.venues.get(index)
    }

    /// The `limit` best-rated venues, highest first, ties in catalog order.
    pub fn featured(&self, limit: usize) -> Vec<Arc<Venue>> {
        let mut venues: Vec<Arc<Venue>> = self.venues.iter().cloned().collect();
        venues.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        venues.truncate(limit);
        venues
    }

    /// A new catalog with `other`'s venues appended, skipping names already
    /// present (trimmed, case-insensitive).
    pub fn merge(&self, other: &Catalog) -> Catalog {
        let mut seen: HashSet<String> = self.venues.iter().map(|v| name_key(&v.name)).collect();
        let mut venues: Vec<Arc<Venue>> = self.venues.iter().cloned().collect();
        for venue in other.iter() {
            if seen.insert(name_key(&venue.name)) {
                venues.push(venue.clone());
            } else {
                debug!(venue = %venue.name, "Skipping duplicate venue during merge");
            }
        }
        Catalog {
            venues: Arc::new(venues),
            dropped: self.dropped + other.dropped,
        }
    }
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
