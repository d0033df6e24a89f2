use crate::types::Coordinates;

/// Mean Earth radius (IUGG) in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3_958.761_3;

/// Great-circle distance in miles using the haversine formula.
pub fn distance_miles(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // clamp guards asin against rounding just above 1.0 for antipodal points
    2.0 * EARTH_RADIUS_MILES * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPIRE_STATE: Coordinates = Coordinates { lat: 40.7484, lng: -73.9857 };
    const BROOKLYN_BRIDGE: Coordinates = Coordinates { lat: 40.7061, lng: -73.9969 };

    #[test]
    fn zero_at_zero_separation() {
        assert_eq!(distance_miles(EMPIRE_STATE, EMPIRE_STATE), 0.0);
    }

    #[test]
    fn symmetric() {
        let there = distance_miles(EMPIRE_STATE, BROOKLYN_BRIDGE);
        let back = distance_miles(BROOKLYN_BRIDGE, EMPIRE_STATE);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn midtown_to_brooklyn_bridge_is_about_three_miles() {
        let d = distance_miles(EMPIRE_STATE, BROOKLYN_BRIDGE);
        assert!(d > 2.8 && d < 3.1, "got {d}");
    }

    #[test]
    fn one_degree_of_latitude_is_about_69_miles() {
        let d = distance_miles(Coordinates::new(40.0, -74.0), Coordinates::new(41.0, -74.0));
        assert!((d - 69.09).abs() < 0.05, "got {d}");
    }

    #[test]
    fn antipodes_do_not_produce_nan() {
        let d = distance_miles(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 180.0));
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_MILES).abs() < 1e-6);
    }
}
