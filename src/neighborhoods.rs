//! Fixed borough / neighborhood directory for New York City.
//!
//! The selection offered to users is a closed set, which is also what makes
//! geocode caching worthwhile.

use crate::error::{FinderError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const MANHATTAN: &str = "Manhattan";
pub const BROOKLYN: &str = "Brooklyn";
pub const QUEENS: &str = "Queens";
pub const BRONX: &str = "Bronx";
pub const STATEN_ISLAND: &str = "Staten Island";

/// Boroughs in display order with their neighborhoods in display order.
pub const DIRECTORY: &[(&str, &[&str])] = &[
    (
        MANHATTAN,
        &[
            "SoHo",
            "Greenwich Village",
            "East Village",
            "West Village",
            "Tribeca",
            "Financial District",
            "Lower East Side",
            "Nolita",
            "Little Italy",
            "Chinatown",
            "Chelsea",
            "Meatpacking District",
            "Flatiron",
            "Union Square",
            "Gramercy",
            "NoMad",
            "Murray Hill",
            "Midtown East",
            "Midtown West",
            "Times Square",
            "Hell's Kitchen",
            "Upper East Side",
            "Upper West Side",
            "Morningside Heights",
            "Harlem",
            "East Harlem",
            "Washington Heights",
            "Inwood",
        ],
    ),
    (
        BROOKLYN,
        &[
            "DUMBO",
            "Brooklyn Heights",
            "Cobble Hill",
            "Carroll Gardens",
            "Williamsburg",
            "Greenpoint",
            "Bushwick",
            "Park Slope",
            "Prospect Heights",
            "Crown Heights",
            "Red Hook",
            "Sunset Park",
        ],
    ),
    (
        QUEENS,
        &[
            "Long Island City",
            "Astoria",
            "Sunnyside",
            "Jackson Heights",
            "Elmhurst",
            "Flushing",
            "Forest Hills",
        ],
    ),
    (BRONX, &["Mott Haven", "Port Morris", "Fordham", "Riverdale"]),
    (STATEN_ISLAND, &["St. George", "Stapleton", "Port Richmond"]),
];

// lowercased borough -> (canonical borough, lowercased neighborhood -> canonical neighborhood)
static INDEX: Lazy<HashMap<String, (&'static str, HashMap<String, &'static str>)>> =
    Lazy::new(|| {
        DIRECTORY
            .iter()
            .map(|(borough, hoods)| {
                let hoods = hoods.iter().map(|h| (h.to_lowercase(), *h)).collect();
                (borough.to_lowercase(), (*borough, hoods))
            })
            .collect()
    });

pub fn boroughs() -> impl Iterator<Item = &'static str> {
    DIRECTORY.iter().map(|(borough, _)| *borough)
}

/// Neighborhoods of a borough, matched case-insensitively. Empty for unknown boroughs.
pub fn neighborhoods_in(borough: &str) -> &'static [&'static str] {
    let wanted = borough.trim().to_lowercase();
    DIRECTORY
        .iter()
        .find(|(name, _)| name.to_lowercase() == wanted)
        .map(|(_, hoods)| *hoods)
        .unwrap_or(&[])
}

/// Canonical spelling of a `(neighborhood, borough)` pair, if it is in the directory.
pub fn canonical(neighborhood: &str, borough: &str) -> Option<(&'static str, &'static str)> {
    let (borough, hoods) = INDEX.get(&borough.trim().to_lowercase())?;
    let hood = hoods.get(&neighborhood.trim().to_lowercase())?;
    Some((*hood, *borough))
}

pub fn is_known(neighborhood: &str, borough: &str) -> bool {
    canonical(neighborhood, borough).is_some()
}

/// Like [`canonical`], but a pair outside the directory is
/// [`FinderError::InvalidCriteria`].
pub fn require(neighborhood: &str, borough: &str) -> Result<(&'static str, &'static str)> {
    canonical(neighborhood, borough).ok_or_else(|| {
        FinderError::InvalidCriteria(format!(
            "'{}, {}' is not a known neighborhood",
            neighborhood.trim(),
            borough.trim()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_sizes() {
        let sizes: Vec<usize> = DIRECTORY.iter().map(|(_, h)| h.len()).collect();
        assert_eq!(sizes, vec![28, 12, 7, 4, 3]);
        assert_eq!(boroughs().next(), Some(MANHATTAN));
    }

    #[test]
    fn lookups_ignore_case() {
        assert_eq!(neighborhoods_in("brooklyn").first(), Some(&"DUMBO"));
        assert!(neighborhoods_in("Hoboken").is_empty());
        assert_eq!(canonical("hell's kitchen", "MANHATTAN"), Some(("Hell's Kitchen", MANHATTAN)));
        assert!(is_known("Astoria", "Queens"));
        assert!(!is_known("Astoria", "Brooklyn"));
    }

    #[test]
    fn require_rejects_pairs_outside_the_directory() {
        assert_eq!(require(" dumbo ", "brooklyn").unwrap(), ("DUMBO", BROOKLYN));
        assert!(matches!(
            require("junk-1", "x"),
            Err(FinderError::InvalidCriteria(_))
        ));
    }
}
