use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in kilometres.
    #[must_use]
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        crate::distance::distance_km(self, other)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateParseError {
    #[error("expected \"lat,lng\", got {0:?}")]
    Format(String),
    #[error("latitude must be within [-90, 90], got {0}")]
    Latitude(String),
    #[error("longitude must be within [-180, 180], got {0}")]
    Longitude(String),
}

/// Parses `"lat,lng"` (whitespace around either number is ignored).
impl FromStr for Coordinate {
    type Err = CoordinateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| CoordinateParseError::Format(s.to_string()))?;
        let latitude = lat
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| (-90.0..=90.0).contains(v))
            .ok_or_else(|| CoordinateParseError::Latitude(lat.trim().to_string()))?;
        let longitude = lng
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| (-180.0..=180.0).contains(v))
            .ok_or_else(|| CoordinateParseError::Longitude(lng.trim().to_string()))?;
        Ok(Self::new(latitude, longitude))
    }
}

/// A cafe returned by a nearby search, normalized from the provider's shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CafeRecord {
    /// Provider-assigned identifier; unique within one search session.
    pub place_id: String,
    pub name: String,
    pub location: Coordinate,
    /// Average rating in `[0, 5]`.
    pub rating: Option<f64>,
    pub rating_count: Option<u32>,
    /// Price level in `[0, 4]`.
    pub price_level: Option<u8>,
    /// `None` when the provider does not know the opening hours.
    pub is_open_now: Option<bool>,
    /// Human-readable vicinity, possibly empty.
    pub address: String,
    /// Distance from the search origin, fixed at ingestion time.
    pub distance_km: f64,
}

impl CafeRecord {
    /// Rating with unrated places treated as zero, as filtering and sorting expect.
    #[must_use]
    pub fn rating_or_zero(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }

    #[must_use]
    pub fn is_known_open(&self) -> bool {
        self.is_open_now == Some(true)
    }
}
