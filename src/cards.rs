//! Display-ready venue summaries: enriched description plus outbound links.
//!
//! Cards are copies made for display. The catalog records they point at are
//! never touched.

use crate::enrich::{enrich_descriptions, DescriptionEnricher};
use crate::links::VenueLinks;
use crate::types::{RankedVenue, Venue};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct VenueCard {
    #[serde(flatten)]
    pub venue: Arc<Venue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
    pub description: String,
    pub links: VenueLinks,
}

async fn build(
    enricher: Arc<dyn DescriptionEnricher>,
    venues: Vec<Arc<Venue>>,
    distances: Vec<Option<f64>>,
) -> Vec<VenueCard> {
    let descriptions = enrich_descriptions(enricher, &venues).await;
    venues
        .into_iter()
        .zip(distances)
        .zip(descriptions)
        .map(|((venue, distance_miles), description)| VenueCard {
            links: venue.links(),
            venue,
            distance_miles,
            description,
        })
        .collect()
}

pub async fn cards_for_ranked(
    enricher: Arc<dyn DescriptionEnricher>,
    ranked: &[RankedVenue],
) -> Vec<VenueCard> {
    let venues = ranked.iter().map(|r| r.venue.clone()).collect();
    let distances = ranked.iter().map(|r| Some(r.distance_miles)).collect();
    build(enricher, venues, distances).await
}

pub async fn cards_for_venues(
    enricher: Arc<dyn DescriptionEnricher>,
    venues: &[Arc<Venue>],
) -> Vec<VenueCard> {
    build(enricher, venues.to_vec(), vec![None; venues.len()]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::PassthroughEnricher;
    use crate::types::{Coordinates, PriceRange};

    fn venue() -> Arc<Venue> {
        Arc::new(Venue {
            name: "Westlight".into(),
            address: "111 N 12th St, Brooklyn, NY 11249".into(),
            coordinates: Coordinates::new(40.7219, -73.9576),
            neighborhood: "Williamsburg".into(),
            borough: "Brooklyn".into(),
            price_range: PriceRange::Upscale,
            rating: 4.5,
            vibe: "Panoramic skyline views".into(),
        })
    }

    #[tokio::test]
    async fn ranked_cards_carry_distance_and_links() {
        let ranked = vec![RankedVenue {
            venue: venue(),
            distance_miles: 0.42,
        }];
        let cards = cards_for_ranked(Arc::new(PassthroughEnricher), &ranked).await;
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].distance_miles, Some(0.42));
        assert_eq!(cards[0].description, "Panoramic skyline views");
        assert!(cards[0].links.reservations.ends_with("query=Westlight+NYC"));
    }

    #[tokio::test]
    async fn featured_cards_omit_distance_in_json() {
        let cards = cards_for_venues(Arc::new(PassthroughEnricher), &[venue()]).await;
        let json = serde_json::to_value(&cards[0]).unwrap();
        assert!(json.get("distance_miles").is_none());
        assert_eq!(json["name"], "Westlight");
        assert!(json["links"]["directions"].as_str().unwrap().contains("Brooklyn"));
    }
}
