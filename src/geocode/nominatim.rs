use super::Geocoder;
use crate::config::GeocoderConfig;
use crate::error::{FinderError, Result};
use crate::types::Coordinates;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Geocoder backed by an OpenStreetMap Nominatim `/search` endpoint.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    region_suffix: String,
}

/// One entry of Nominatim's JSON search response. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            region_suffix: config.region_suffix.clone(),
        })
    }

    /// Free-text query sent to the provider, e.g. `"SoHo, Manhattan, New York, NY"`.
    pub fn query_for(&self, place: &str, context: &str) -> String {
        [place, context, self.region_suffix.as_str()]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn first_match(places: Vec<NominatimPlace>) -> Result<Option<Coordinates>> {
    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };
    let lat = place.lat.trim().parse::<f64>();
    let lng = place.lon.trim().parse::<f64>();
    match (lat, lng) {
        (Ok(lat), Ok(lng)) if Coordinates::new(lat, lng).is_valid() => {
            debug!(
                "Resolved to {}",
                place.display_name.as_deref().unwrap_or("<unnamed place>")
            );
            Ok(Some(Coordinates::new(lat, lng)))
        }
        _ => Err(FinderError::LookupFailed(format!(
            "provider returned unusable coordinates ({}, {})",
            place.lat, place.lon
        ))),
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    #[instrument(skip(self))]
    async fn resolve(&self, place: &str, context: &str) -> Result<Option<Coordinates>> {
        let query = self.query_for(place, context);
        let url = format!("{}/search", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query.as_str()), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| FinderError::LookupFailed(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Geocoder answered HTTP {} for '{}'", status, query);
            return Err(FinderError::LookupFailed(format!(
                "geocoder returned HTTP {}",
                status.as_u16()
            )));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| {
                FinderError::LookupFailed(format!("unreadable geocoder response: {}", e))
            })?;
        first_match(places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(lat: &str, lon: &str) -> NominatimPlace {
        NominatimPlace {
            lat: lat.into(),
            lon: lon.into(),
            display_name: None,
        }
    }

    #[test]
    fn query_joins_non_empty_parts() {
        let geocoder = NominatimGeocoder::new(&GeocoderConfig::default()).unwrap();
        assert_eq!(
            geocoder.query_for("SoHo", "Manhattan"),
            "SoHo, Manhattan, New York, NY"
        );
        assert_eq!(geocoder.query_for("SoHo", " "), "SoHo, New York, NY");
    }

    #[test]
    fn empty_response_is_not_found() {
        assert_eq!(first_match(vec![]).unwrap(), None);
    }

    #[test]
    fn string_coordinates_are_parsed() {
        let found = first_match(vec![place("40.7233", "-74.0030"), place("0", "0")]).unwrap();
        assert_eq!(found, Some(Coordinates::new(40.7233, -74.0030)));
    }

    #[test]
    fn garbage_coordinates_are_a_lookup_failure() {
        let err = first_match(vec![place("north", "-74.0")]).unwrap_err();
        assert!(matches!(err, FinderError::LookupFailed(_)));
    }
}
