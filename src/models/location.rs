use crate::error::{ParseError, Result};
use serde::{Deserialize, Serialize};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point on the map in decimal degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Great-circle distance in meters (haversine).
    pub fn distance_m(&self, other: &Coordinates) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

/// Location information for a listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub address: String,
    pub coordinates: Option<Coordinates>,
    /// Geocoding result types (`locality`, `route`, ...), when known.
    pub types: Vec<String>,
}

#[derive(Deserialize)]
struct EncodedLocation {
    #[serde(default)]
    address: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    types: Vec<String>,
}

impl Location {
    pub fn from_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    /// Parse the `Location` column.
    ///
    /// Current records hold a JSON object `{address, latitude?, longitude?, types?}`.
    /// Legacy records hold the bare address, which is accepted as-is. Only text
    /// that claims to be a JSON object and fails to decode is an error.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if !trimmed.starts_with('{') {
            return Ok(Self::from_address(trimmed));
        }

        let encoded: EncodedLocation =
            serde_json::from_str(trimmed).map_err(|e| ParseError::Location(e.to_string()))?;
        let coordinates = match (encoded.latitude, encoded.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Coordinates::new(lat, lon))
            }
            _ => None,
        };

        Ok(Self {
            address: encoded.address,
            coordinates,
            types: encoded.types,
        })
    }

    /// First comma-separated component of the address, trimmed.
    pub fn primary_component(&self) -> &str {
        self.address.split(',').next().unwrap_or("").trim()
    }
}
