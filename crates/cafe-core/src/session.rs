use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CafeRecord, Coordinate};

/// Results of one logical search, including its paginated continuations.
///
/// A new search replaces the whole session; nothing is merged across searches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSession {
    pub query_text: String,
    pub origin: Coordinate,
    pub radius_km: f64,
    pub results: Vec<CafeRecord>,
    pub completed_at: DateTime<Utc>,
}

impl SearchSession {
    #[must_use]
    pub fn new(
        query_text: impl Into<String>,
        origin: Coordinate,
        radius_km: f64,
        results: Vec<CafeRecord>,
    ) -> Self {
        Self {
            query_text: query_text.into(),
            origin,
            radius_km,
            results,
            completed_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn find(&self, place_id: &str) -> Option<&CafeRecord> {
        self.results.iter().find(|c| c.place_id == place_id)
    }
}
