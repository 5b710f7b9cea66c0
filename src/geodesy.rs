//! Coordinate validation, zoom derivation, and great-circle distances.

use geo::{HaversineDistance, Point};

/// Smallest usable map zoom (continent scale).
pub const MIN_ZOOM: u8 = 7;
/// Largest usable map zoom (single-building scale).
pub const MAX_ZOOM: u8 = 21;

pub const MIN_RADIUS_KM: f64 = 0.01;
pub const MAX_RADIUS_KM: f64 = 10_000.0;

/// Viewport span in meters observed at zoom 6; anchor for the zoom formula.
const ZOOM_6_SPAN_M: f64 = 1_165_116.0;
/// At or below this span the map is already maximally zoomed in.
const MAX_ZOOM_SPAN_M: f64 = 71.0;
/// At or above this span the map is already maximally zoomed out.
const MIN_ZOOM_SPAN_M: f64 = 1_164_888.0;

pub fn valid_lat(lat: f64) -> bool {
    lat.is_finite() && (-90.0..=90.0).contains(&lat)
}

pub fn valid_lon(lon: f64) -> bool {
    lon.is_finite() && (-180.0..=180.0).contains(&lon)
}

pub fn valid_radius_km(radius: f64) -> bool {
    radius.is_finite() && (MIN_RADIUS_KM..=MAX_RADIUS_KM).contains(&radius)
}

/// Map zoom level for a scan radius.
///
/// Monotonically non-increasing in the radius and clamped to
/// [`MIN_ZOOM`, `MAX_ZOOM`]: each zoom step halves the viewport span, so the
/// level is the base-2 log of the span ratio offset from the zoom-6 anchor.
pub fn zoom_for_radius(radius_km: f64) -> u8 {
    let meters = radius_km * 1000.0;
    if meters <= MAX_ZOOM_SPAN_M {
        return MAX_ZOOM;
    }
    if meters >= MIN_ZOOM_SPAN_M {
        return MIN_ZOOM;
    }
    let zoom = (6.0 + (ZOOM_6_SPAN_M / meters).log2()).round() as i64;
    zoom.clamp(i64::from(MIN_ZOOM), i64::from(MAX_ZOOM)) as u8
}

/// Great-circle distance between two `(lat, lon)` pairs, in kilometers.
pub fn distance_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    // geo points are (x = lon, y = lat)
    Point::new(a.1, a.0).haversine_distance(&Point::new(b.1, b.0)) / 1000.0
}

/// Map view URL centered on a point at a given zoom.
pub fn maps_view_url(lat: f64, lon: f64, zoom: u8) -> String {
    format!("https://www.google.com/maps/@{lat},{lon},{zoom}z")
}

/// Map search URL for a bare coordinate pair.
pub fn maps_search_url(lat: f64, lon: f64) -> String {
    format!("https://www.google.com/maps/search/{lat},{lon}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validators_accept_in_range() {
        assert!(valid_lat(0.0));
        assert!(valid_lat(-90.0));
        assert!(valid_lat(90.0));
        assert!(valid_lon(-180.0));
        assert!(valid_lon(180.0));
        assert!(valid_radius_km(0.01));
        assert!(valid_radius_km(10_000.0));
    }

    #[test]
    fn test_validators_reject_out_of_range() {
        assert!(!valid_lat(90.001));
        assert!(!valid_lat(f64::NAN));
        assert!(!valid_lon(-180.5));
        assert!(!valid_radius_km(0.0));
        assert!(!valid_radius_km(10_000.1));
        assert!(!valid_radius_km(f64::INFINITY));
    }

    #[test]
    fn test_zoom_clamps_at_extremes() {
        assert_eq!(zoom_for_radius(0.05), MAX_ZOOM);
        assert_eq!(zoom_for_radius(0.071), MAX_ZOOM);
        assert_eq!(zoom_for_radius(1_164.888), MIN_ZOOM);
        assert_eq!(zoom_for_radius(10_000.0), MIN_ZOOM);
    }

    #[test]
    fn test_zoom_known_values() {
        assert_eq!(zoom_for_radius(1.0), 16);
        assert_eq!(zoom_for_radius(10.0), 13);
    }

    #[test]
    fn test_zoom_monotonic_in_radius() {
        let mut last = MAX_ZOOM;
        let mut km = 0.02;
        while km < 2_000.0 {
            let zoom = zoom_for_radius(km);
            assert!(zoom <= last, "zoom increased at radius {km}");
            assert!((MIN_ZOOM..=MAX_ZOOM).contains(&zoom));
            last = zoom;
            km *= 1.3;
        }
    }

    #[test]
    fn test_distance_one_degree_longitude_at_equator() {
        let d = distance_km((0.0, 0.0), (0.0, 1.0));
        assert!((d - 111.19).abs() < 0.5, "got {d}");
    }

    #[test]
    fn test_distance_symmetric_and_zero() {
        let a = (48.8584, 2.2945);
        let b = (51.5007, -0.1246);
        assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
        assert!(distance_km(a, a) < 1e-9);
    }

    #[test]
    fn test_url_builders() {
        assert_eq!(
            maps_view_url(48.85, 2.29, 16),
            "https://www.google.com/maps/@48.85,2.29,16z"
        );
        assert_eq!(
            maps_search_url(48.85, 2.29),
            "https://www.google.com/maps/search/48.85,2.29"
        );
    }
}
