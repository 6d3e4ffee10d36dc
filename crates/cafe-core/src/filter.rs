//! Client-side filtering and ordering of a search session's cafes.
//!
//! [`apply_filters`] is a pure projection: it never touches its input and
//! produces the same output when applied again with the same criteria.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::CafeRecord;

/// Minimum-rating choices offered by the filter controls.
pub const MIN_RATING_CHOICES: [f64; 5] = [0.0, 3.0, 3.5, 4.0, 4.5];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Distance,
    Rating,
    Name,
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::Distance => write!(f, "distance"),
            SortKey::Rating => write!(f, "rating"),
            SortKey::Name => write!(f, "name"),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distance" => Ok(SortKey::Distance),
            "rating" => Ok(SortKey::Rating),
            "name" => Ok(SortKey::Name),
            other => Err(format!(
                "unknown sort key {other:?} (expected distance, rating or name)"
            )),
        }
    }
}

/// User-selected filter state. Derived from the controls, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub min_rating: f64,
    pub sort_key: SortKey,
    pub open_now_only: bool,
    pub radius_km: f64,
}

impl FilterCriteria {
    #[must_use]
    pub fn with_radius(radius_km: f64) -> Self {
        Self {
            min_rating: 0.0,
            sort_key: SortKey::Distance,
            open_now_only: false,
            radius_km,
        }
    }

    /// Resets the rating and open-now filters, keeping sort order and radius.
    pub fn clear_filters(&mut self) {
        self.min_rating = 0.0;
        self.open_now_only = false;
    }

    fn accepts(&self, cafe: &CafeRecord) -> bool {
        // Unknown opening hours never count as open.
        cafe.rating_or_zero() >= self.min_rating && (!self.open_now_only || cafe.is_known_open())
    }
}

/// Filters `records` by rating and open state, then orders them by
/// `criteria.sort_key`. Sorting is stable, so ties keep their input order.
#[must_use]
pub fn apply_filters(records: &[CafeRecord], criteria: &FilterCriteria) -> Vec<CafeRecord> {
    let mut kept: Vec<CafeRecord> = records
        .iter()
        .filter(|cafe| criteria.accepts(cafe))
        .cloned()
        .collect();

    match criteria.sort_key {
        SortKey::Distance => kept.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km)),
        SortKey::Rating => kept.sort_by(|a, b| b.rating_or_zero().total_cmp(&a.rating_or_zero())),
        SortKey::Name => kept.sort_by(|a, b| compare_names(&a.name, &b.name)),
    }

    tracing::debug!(
        total = records.len(),
        kept = kept.len(),
        sort = %criteria.sort_key,
        "applied filters"
    );
    kept
}

/// Case-insensitive dictionary order, falling back to a byte comparison so
/// that names differing only in case still order deterministically.
fn compare_names(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.cmp(b))
}
