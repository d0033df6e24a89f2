use crate::error::{FinderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both components are finite and inside the lat/lng ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}

/// Price tier symbol, `$` through `$$$$`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum PriceRange {
    #[serde(rename = "$")]
    Budget,
    #[default]
    #[serde(rename = "$$")]
    Moderate,
    #[serde(rename = "$$$")]
    Upscale,
    #[serde(rename = "$$$$")]
    Luxury,
}

impl PriceRange {
    pub const ALL: [PriceRange; 4] = [
        PriceRange::Budget,
        PriceRange::Moderate,
        PriceRange::Upscale,
        PriceRange::Luxury,
    ];

    /// Parse a comma separated list such as `"$,$$"`. Blank entries are ignored.
    pub fn parse_list(list: &str) -> Result<Vec<PriceRange>> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<PriceRange>())
            .collect()
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            PriceRange::Budget => "$",
            PriceRange::Moderate => "$$",
            PriceRange::Upscale => "$$$",
            PriceRange::Luxury => "$$$$",
        }
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for PriceRange {
    type Err = FinderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "$" => Ok(PriceRange::Budget),
            "$$" => Ok(PriceRange::Moderate),
            "$$$" => Ok(PriceRange::Upscale),
            "$$$$" => Ok(PriceRange::Luxury),
            other => Err(FinderError::InvalidCriteria(format!(
                "unknown price range '{}', expected one of $, $$, $$$, $$$$",
                other
            ))),
        }
    }
}

/// A catalog entry. Immutable once the catalog is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    pub address: String,
    #[serde(flatten)]
    pub coordinates: Coordinates,
    pub neighborhood: String,
    pub borough: String,
    pub price_range: PriceRange,
    pub rating: f64,
    pub vibe: String,
}

/// A venue annotated with its distance from the current origin.
///
/// Holds a shared handle on the catalog record rather than a mutated copy.
#[derive(Debug, Clone, Serialize)]
pub struct RankedVenue {
    #[serde(flatten)]
    pub venue: Arc<Venue>,
    pub distance_miles: f64,
}

impl RankedVenue {
    pub fn name(&self) -> &str {
        &self.venue.name
    }
}

/// Caller-owned filter selection for one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub origin_place_name: String,
    pub borough_context: String,
    pub max_distance_miles: f64,
    pub allowed_price_ranges: BTreeSet<PriceRange>,
    pub min_rating: f64,
}

impl SearchCriteria {
    pub const DEFAULT_RADIUS_MILES: f64 = 2.0;

    /// Criteria with a two mile radius and no price or rating restriction.
    pub fn new(place: impl Into<String>, borough: impl Into<String>) -> Self {
        Self {
            origin_place_name: place.into(),
            borough_context: borough.into(),
            max_distance_miles: Self::DEFAULT_RADIUS_MILES,
            allowed_price_ranges: PriceRange::ALL.into_iter().collect(),
            min_rating: 0.0,
        }
    }

    pub fn with_max_distance(mut self, miles: f64) -> Self {
        self.max_distance_miles = miles;
        self
    }

    pub fn with_prices<I: IntoIterator<Item = PriceRange>>(mut self, prices: I) -> Self {
        self.allowed_price_ranges = prices.into_iter().collect();
        self
    }

    pub fn with_min_rating(mut self, rating: f64) -> Self {
        self.min_rating = rating;
        self
    }

    /// Human-readable origin, e.g. `"SoHo, Manhattan"`.
    pub fn location_label(&self) -> String {
        if self.borough_context.trim().is_empty() {
            self.origin_place_name.clone()
        } else {
            format!("{}, {}", self.origin_place_name, self.borough_context)
        }
    }

    /// Price and rating part of the filter conjunction.
    pub fn accepts(&self, venue: &Venue) -> bool {
        self.allowed_price_ranges.contains(&venue.price_range) && venue.rating >= self.min_rating
    }

    /// Rejects values no surface should pass to a search.
    pub fn validate(&self) -> Result<()> {
        if self.origin_place_name.trim().is_empty() {
            return Err(FinderError::InvalidCriteria("place name is empty".into()));
        }
        if self.max_distance_miles.is_nan() || self.max_distance_miles <= 0.0 {
            return Err(FinderError::InvalidCriteria(format!(
                "radius must be positive, got {}",
                self.max_distance_miles
            )));
        }
        if !(0.0..=5.0).contains(&self.min_rating) {
            return Err(FinderError::InvalidCriteria(format!(
                "minimum rating must be between 0 and 5, got {}",
                self.min_rating
            )));
        }
        Ok(())
    }
}

/// Ranked venues, nearest first, plus the origin they were measured from.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub origin: Coordinates,
    pub venues: Vec<RankedVenue>,
}

impl SearchResult {
    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedVenue> {
        self.venues.iter()
    }

    /// The first `n` venues; display truncation belongs to callers.
    pub fn top(&self, n: usize) -> &[RankedVenue] {
        &self.venues[..n.min(self.venues.len())]
    }
}
