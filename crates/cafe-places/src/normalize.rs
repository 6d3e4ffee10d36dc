//! Normalization of provider results into [`CafeRecord`]s.

use std::collections::HashSet;

use cafe_core::{distance_km, CafeRecord, Coordinate};

use crate::types::PlaceResult;

/// Converts one provider result into a [`CafeRecord`], computing its distance
/// from `origin`.
///
/// Returns `None` when the result has no `place_id` or no location, since it
/// can be neither keyed nor placed on the map. Ratings outside `[0, 5]` and
/// price levels outside `[0, 4]` are dropped rather than trusted.
#[must_use]
pub fn normalize_place(place: &PlaceResult, origin: &Coordinate) -> Option<CafeRecord> {
    let place_id = place.place_id.as_deref().filter(|id| !id.is_empty())?;
    let geometry = place.geometry.as_ref()?;
    let location = Coordinate::new(geometry.location.lat, geometry.location.lng);

    let rating = place.rating.filter(|r| (0.0..=5.0).contains(r));
    let price_level = place
        .price_level
        .and_then(|level| u8::try_from(level).ok())
        .filter(|level| *level <= 4);

    Some(CafeRecord {
        place_id: place_id.to_string(),
        name: place.name.clone().unwrap_or_default(),
        location,
        rating,
        rating_count: place.user_ratings_total,
        price_level,
        is_open_now: place.opening_hours.as_ref().and_then(|h| h.open_now),
        address: place.vicinity.clone().unwrap_or_default(),
        distance_km: distance_km(origin, &location),
    })
}

/// Normalizes a page of results and appends them to `into`, skipping unusable
/// entries and any `place_id` already present.
///
/// Returns the number of records appended.
pub fn normalize_results(
    places: &[PlaceResult],
    origin: &Coordinate,
    into: &mut Vec<CafeRecord>,
) -> usize {
    let mut seen: HashSet<String> = into.iter().map(|c| c.place_id.clone()).collect();
    let before = into.len();
    for place in places {
        let Some(record) = normalize_place(place, origin) else {
            tracing::warn!(
                place_id = ?place.place_id,
                "skipping place without id or location"
            );
            continue;
        };
        if seen.insert(record.place_id.clone()) {
            into.push(record);
        } else {
            tracing::debug!(place_id = %record.place_id, "dropping duplicate place");
        }
    }
    into.len() - before
}
