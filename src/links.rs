//! Outbound search links for a venue. Pure string formatting, no requests.

use crate::types::Venue;
use serde::Serialize;
use url::form_urlencoded;

const CITY_QUALIFIER: &str = "NYC";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueLinks {
    /// Review search (Yelp).
    pub reviews: String,
    /// Map and directions (Google Maps).
    pub directions: String,
    /// Table reservations (OpenTable).
    pub reservations: String,
}

/// Form-encode `text` for a query string; spaces become `+`.
fn encode(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

pub fn links_for(name: &str, address: &str) -> VenueLinks {
    let name = encode(&format!("{} {}", name, CITY_QUALIFIER));
    let address = encode(address);
    VenueLinks {
        reviews: format!(
            "https://www.yelp.com/search?find_desc={}&find_loc=New+York%2C+NY",
            name
        ),
        directions: format!("https://www.google.com/maps/search/?api=1&query={}", address),
        reservations: format!("https://www.opentable.com/s?query={}", name),
    }
}

impl Venue {
    pub fn links(&self) -> VenueLinks {
        links_for(&self.name, &self.address)
    }
}
