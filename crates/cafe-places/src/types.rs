//! Places provider request and response types.
//!
//! Response types model the JSON returned by the Nearby Search endpoint. The
//! provider reports outcome in a top-level `status` string rather than through
//! HTTP status codes, so [`PlacesStatus`] is what drives the search strategy.

use cafe_core::Coordinate;
use serde::Deserialize;

/// Largest radius the provider accepts, in meters.
pub const MAX_RADIUS_METERS: u32 = 50_000;

/// One nearby-search query: origin and radius plus optional constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyRequest {
    pub origin: Coordinate,
    pub radius_km: f64,
    pub place_type: Option<String>,
    pub keyword: Option<String>,
    pub name: Option<String>,
}

impl NearbyRequest {
    /// Radius converted to whole meters and clamped to what the provider accepts.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn radius_meters(&self) -> u32 {
        let meters = (self.radius_km * 1000.0).round();
        if meters.is_nan() || meters < 1.0 {
            1
        } else {
            meters.min(f64::from(MAX_RADIUS_METERS)) as u32
        }
    }
}

/// Outcome reported by the provider for a request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum PlacesStatus {
    Ok,
    ZeroResults,
    RequestDenied,
    OverQueryLimit,
    InvalidRequest,
    UnknownError,
    /// Any status this client does not know, kept verbatim.
    Other(String),
}

impl From<String> for PlacesStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "OK" => PlacesStatus::Ok,
            "ZERO_RESULTS" => PlacesStatus::ZeroResults,
            "REQUEST_DENIED" => PlacesStatus::RequestDenied,
            "OVER_QUERY_LIMIT" => PlacesStatus::OverQueryLimit,
            "INVALID_REQUEST" => PlacesStatus::InvalidRequest,
            "UNKNOWN_ERROR" => PlacesStatus::UnknownError,
            _ => PlacesStatus::Other(raw),
        }
    }
}

impl std::fmt::Display for PlacesStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacesStatus::Ok => write!(f, "OK"),
            PlacesStatus::ZeroResults => write!(f, "ZERO_RESULTS"),
            PlacesStatus::RequestDenied => write!(f, "REQUEST_DENIED"),
            PlacesStatus::OverQueryLimit => write!(f, "OVER_QUERY_LIMIT"),
            PlacesStatus::InvalidRequest => write!(f, "INVALID_REQUEST"),
            PlacesStatus::UnknownError => write!(f, "UNKNOWN_ERROR"),
            PlacesStatus::Other(raw) => write!(f, "{raw}"),
        }
    }
}

/// Body of a Nearby Search response (first page or a continuation).
#[derive(Debug, Clone, Deserialize)]
pub struct NearbySearchResponse {
    pub status: PlacesStatus,
    #[serde(default)]
    pub results: Vec<PlaceResult>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// A single place in a search response. Every field is optional on the wire;
/// normalization decides what is usable.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceResult {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub price_level: Option<i64>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub vicinity: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
}
