use rooftop_finder::geocode::StaticGeocoder;
use rooftop_finder::{search, Catalog, Coordinates, FinderError, SearchCriteria};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, NamedTempFile};

fn bundled_catalog_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data/rooftop_bars.json")
}

#[test]
fn bundled_catalog_loads_without_drops() {
    let catalog = Catalog::load(&bundled_catalog_path()).unwrap();
    assert!(catalog.len() >= 10);
    assert_eq!(catalog.dropped(), 0);
    assert!(catalog.iter().all(|v| v.coordinates.is_valid() && !v.name.is_empty()));
}

#[test]
fn file_with_bad_records_keeps_the_good_ones() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"name": "Good", "address": "1 A St", "lat": 40.72, "lng": -73.99,
              "price_range": "$", "rating": 4.2}},
            {{"name": "No Coordinates", "address": "2 B St"}},
            {{"address": "3 C St", "lat": 40.71, "lng": -73.98}},
            42
        ]"#
    )
    .unwrap();

    let catalog = Catalog::load(file.path()).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.dropped(), 3);
    assert_eq!(catalog.get(0).unwrap().name, "Good");
}

#[test]
fn missing_file_is_data_unavailable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rooftop_bars.json");

    let err = Catalog::load(&path).unwrap_err();
    assert!(matches!(err, FinderError::DataUnavailable { .. }));
    assert!(err.to_string().contains("rooftop_bars.json"));
}

#[tokio::test]
async fn missing_file_degrades_to_empty_catalog_and_empty_results() {
    let dir = tempdir().unwrap();
    let (catalog, warning) = Catalog::load_or_empty(&dir.path().join("absent.json"));

    assert!(catalog.is_empty());
    assert!(matches!(warning, Some(FinderError::DataUnavailable { .. })));
    assert!(catalog.featured(6).is_empty());

    let geocoder =
        StaticGeocoder::new().with_place("SoHo", "Manhattan", Coordinates::new(40.723, -74.0));
    for radius in [0.5, 2.0, f64::INFINITY] {
        let criteria = SearchCriteria::new("SoHo", "Manhattan").with_max_distance(radius);
        let result = search(&criteria, &catalog, &geocoder).await.unwrap();
        assert!(result.is_empty());
    }
}

#[test]
fn corrupt_file_is_data_unavailable() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();
    assert!(matches!(
        Catalog::load(file.path()),
        Err(FinderError::DataUnavailable { .. })
    ));
}

#[test]
fn featured_view_from_bundled_data_is_rating_ordered() {
    let catalog = Catalog::load(&bundled_catalog_path()).unwrap();
    let featured = catalog.featured(6);
    assert_eq!(featured.len(), 6);
    for pair in featured.windows(2) {
        assert!(pair[0].rating >= pair[1].rating);
    }
    assert_eq!(featured[0].name, "Westlight");
}
