//! Geocode, measure, filter and rank.

use crate::catalog::Catalog;
use crate::error::{FinderError, Result};
use crate::geo::distance_miles;
use crate::geocode::Geocoder;
use crate::metrics;
use crate::types::{Coordinates, RankedVenue, SearchCriteria, SearchResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// Venues within range of `origin` that pass the price and rating filters,
/// nearest first. Exact distance ties keep catalog order.
pub fn rank_nearby(
    origin: Coordinates,
    catalog: &Catalog,
    criteria: &SearchCriteria,
) -> Vec<RankedVenue> {
    let mut ranked: Vec<RankedVenue> = catalog
        .iter()
        .filter_map(|venue| {
            let distance = distance_miles(origin, venue.coordinates);
            if distance <= criteria.max_distance_miles && criteria.accepts(venue) {
                Some(RankedVenue {
                    venue: venue.clone(),
                    distance_miles: distance,
                })
            } else {
                None
            }
        })
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));
    ranked
}

/// Resolve the criteria's place and rank the catalog around it.
///
/// Only the geocoding step can fail. "Not found" becomes
/// [`FinderError::LocationNotFound`]; geocoder errors pass through unchanged.
#[instrument(
    skip(criteria, catalog, geocoder),
    fields(place = %criteria.origin_place_name, context = %criteria.borough_context)
)]
pub async fn search<G>(
    criteria: &SearchCriteria,
    catalog: &Catalog,
    geocoder: &G,
) -> Result<SearchResult>
where
    G: Geocoder + ?Sized,
{
    let resolved = geocoder
        .resolve(&criteria.origin_place_name, &criteria.borough_context)
        .await;

    let origin = match resolved {
        Ok(Some(origin)) => origin,
        Ok(None) => {
            info!("Location could not be found");
            metrics::record_search_failure("location_not_found");
            return Err(FinderError::LocationNotFound {
                place: criteria.location_label(),
            });
        }
        Err(e) => {
            warn!("Location lookup failed: {}", e);
            metrics::record_search_failure(e.kind());
            return Err(e);
        }
    };

    debug!(%origin, "Origin resolved");
    let venues = rank_nearby(origin, catalog, criteria);
    info!(
        "{} of {} venues within {} mi",
        venues.len(),
        catalog.len(),
        criteria.max_distance_miles
    );
    metrics::record_search(venues.len());

    Ok(SearchResult { origin, venues })
}

/// Everything a front end needs to redisplay one search. Owned by the caller;
/// starting a new search simply means dropping it.
#[derive(Debug, Clone, Serialize)]
pub struct SearchSession {
    pub criteria: SearchCriteria,
    pub location_label: String,
    pub result: SearchResult,
    pub searched_at: DateTime<Utc>,
}

impl SearchSession {
    pub async fn run<G>(criteria: SearchCriteria, catalog: &Catalog, geocoder: &G) -> Result<Self>
    where
        G: Geocoder + ?Sized,
    {
        let result = search(&criteria, catalog, geocoder).await?;
        Ok(Self {
            location_label: criteria.location_label(),
            criteria,
            result,
            searched_at: Utc::now(),
        })
    }

    pub fn origin(&self) -> Coordinates {
        self.result.origin
    }

    pub fn is_empty(&self) -> bool {
        self.result.is_empty()
    }

    pub fn top(&self, n: usize) -> &[RankedVenue] {
        self.result.top(n)
    }
}
