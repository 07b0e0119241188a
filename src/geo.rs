//! Great-circle distance between two points on the Earth's surface.

use thiserror::Error;

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeoError {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
}

/// A latitude/longitude pair in decimal degrees.
///
/// Only constructible through `new` or `parse`, so every value is finite and in range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Result<Self, GeoError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::InvalidCoordinate(format!(
                "latitude {lat} is outside [-90, 90]"
            )));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(GeoError::InvalidCoordinate(format!(
                "longitude {lon} is outside [-180, 180]"
            )));
        }
        Ok(Self { lat, lon })
    }

    /// Parses textual decimal degrees, e.g. values stored as strings.
    pub fn parse(lat: &str, lon: &str) -> Result<Self, GeoError> {
        let parse = |label: &str, raw: &str| {
            raw.trim().parse::<f64>().map_err(|_| {
                GeoError::InvalidCoordinate(format!("{label} '{raw}' is not a number"))
            })
        };
        Self::new(parse("latitude", lat)?, parse("longitude", lon)?)
    }

    /// Builds a coordinate from optional columns; both must be present.
    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Result<Self, GeoError> {
        match (lat, lon) {
            (Some(lat), Some(lon)) => Self::new(lat, lon),
            _ => Err(GeoError::InvalidCoordinate(
                "latitude and longitude are both required".to_string(),
            )),
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

/// Haversine distance between `a` and `b` in kilometres.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn distance_to_self_is_zero() {
        for (lat, lon) in [(0.0, 0.0), (-6.2, 106.8), (89.9, -179.9)] {
            assert_eq!(haversine_km(point(lat, lon), point(lat, lon)), 0.0);
        }
    }

    #[test]
    fn quarter_great_circle() {
        let d = haversine_km(point(0.0, 0.0), point(0.0, 90.0));
        assert!((d - 10007.543).abs() < 0.01, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let jakarta = point(-6.2088, 106.8456);
        let yogyakarta = point(-7.7956, 110.3695);
        assert_eq!(haversine_km(jakarta, yogyakarta), haversine_km(yogyakarta, jakarta));
        let d = haversine_km(jakarta, yogyakarta);
        assert!(d > 420.0 && d < 440.0, "got {d}");
    }

    #[test]
    fn rejects_out_of_range_and_non_numeric_input() {
        assert!(Coordinate::new(91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::NAN).is_err());
        assert!(Coordinate::parse("abc", "10").is_err());
        assert_eq!(Coordinate::parse(" -6.5 ", "106").unwrap(), point(-6.5, 106.0));
        assert!(Coordinate::from_parts(Some(1.0), None).is_err());
    }
}
