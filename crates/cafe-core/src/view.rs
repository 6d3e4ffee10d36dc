//! Renderable view model.
//!
//! Everything a front-end needs to draw the result list, the map markers and
//! error panels is projected here from plain data, so rendering stays a dumb
//! function of this module's output.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::types::{CafeRecord, Coordinate};

/// Zoom used when the map first centres on the user.
pub const INITIAL_ZOOM: u8 = 14;
/// Zoom used when re-centring on the user.
pub const USER_ZOOM: u8 = 15;
/// Zoom used when a cafe is selected.
pub const SELECTED_ZOOM: u8 = 16;

const TOP_RATED_THRESHOLD: f64 = 4.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A short transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenBadge {
    Open,
    Closed,
    Unknown,
}

impl OpenBadge {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            OpenBadge::Open => "Open now",
            OpenBadge::Closed => "Closed",
            OpenBadge::Unknown => "Hours unknown",
        }
    }
}

/// One entry of the result list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CafeCard {
    pub place_id: String,
    pub name: String,
    pub stars: String,
    pub rating_text: String,
    pub price: Option<String>,
    pub open: OpenBadge,
    pub top_rated: bool,
    pub address: String,
    pub distance_text: String,
    pub is_favorite: bool,
    pub is_selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerIcon {
    User,
    Favorite,
    Cafe,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    /// `None` for the user's own position.
    pub place_id: Option<String>,
    pub title: String,
    pub position: Coordinate,
    pub icon: MarkerIcon,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
    pub markers: Vec<Marker>,
}

/// Which list is on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListMode {
    #[default]
    Filtered,
    FavoritesOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListView {
    pub results_label: String,
    pub cards: Vec<CafeCard>,
    /// Shown instead of cards when the list is empty.
    pub empty_message: Option<EmptyState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyState {
    pub title: String,
    pub hint: String,
}

/// A concrete next step offered alongside an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RemediationAction {
    Retry,
    ExpandRadius { radius_km: f64 },
    ClearFilters,
    OpenUrl { label: String, url: String },
}

impl RemediationAction {
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            RemediationAction::Retry => "Try again".to_string(),
            RemediationAction::ExpandRadius { radius_km } => {
                format!("Expand search ({radius_km} km)")
            }
            RemediationAction::ClearFilters => "Clear filters".to_string(),
            RemediationAction::OpenUrl { label, url } => format!("{label}: {url}"),
        }
    }
}

/// Error panel content: what happened and what the user can do about it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Remediation {
    pub title: String,
    pub message: String,
    pub steps: Vec<String>,
    pub actions: Vec<RemediationAction>,
    pub results_label: String,
}

/// Builds the list view for `visible` cafes.
#[must_use]
pub fn project_list(
    visible: &[CafeRecord],
    favorites: &BTreeSet<String>,
    selected: Option<&str>,
    mode: ListMode,
) -> ListView {
    let cards: Vec<CafeCard> = visible
        .iter()
        .map(|cafe| project_card(cafe, favorites, selected))
        .collect();
    let results_label = match mode {
        ListMode::Filtered => format!("{} found", cards.len()),
        ListMode::FavoritesOnly => format!("{} favorites", cards.len()),
    };
    let empty_message = cards.is_empty().then(|| EmptyState {
        title: "No cafes match your criteria".to_string(),
        hint: "Try adjusting your filters or search in a different area!".to_string(),
    });
    ListView {
        results_label,
        cards,
        empty_message,
    }
}

/// Builds the map markers: the user first, then one per visible cafe.
#[must_use]
pub fn project_markers(
    user: Option<Coordinate>,
    visible: &[CafeRecord],
    favorites: &BTreeSet<String>,
) -> Vec<Marker> {
    let user_marker = user.map(|position| Marker {
        place_id: None,
        title: "Your Location".to_string(),
        position,
        icon: MarkerIcon::User,
    });
    user_marker
        .into_iter()
        .chain(visible.iter().map(|cafe| Marker {
            place_id: Some(cafe.place_id.clone()),
            title: cafe.name.clone(),
            position: cafe.location,
            icon: if favorites.contains(&cafe.place_id) {
                MarkerIcon::Favorite
            } else {
                MarkerIcon::Cafe
            },
        }))
        .collect()
}

fn project_card(
    cafe: &CafeRecord,
    favorites: &BTreeSet<String>,
    selected: Option<&str>,
) -> CafeCard {
    let open = match cafe.is_open_now {
        Some(true) => OpenBadge::Open,
        Some(false) => OpenBadge::Closed,
        None => OpenBadge::Unknown,
    };
    CafeCard {
        place_id: cafe.place_id.clone(),
        name: cafe.name.clone(),
        stars: stars(cafe.rating),
        rating_text: rating_text(cafe.rating, cafe.rating_count),
        price: cafe
            .price_level
            .filter(|&level| level > 0)
            .map(|level| "£".repeat(usize::from(level))),
        open,
        top_rated: cafe.rating.is_some_and(|r| r >= TOP_RATED_THRESHOLD),
        address: cafe.address.clone(),
        distance_text: format!("{:.1} km away", cafe.distance_km),
        is_favorite: favorites.contains(&cafe.place_id),
        is_selected: selected == Some(cafe.place_id.as_str()),
    }
}

/// Five-glyph star string: one `★` per whole star, a `☆` for a half star,
/// padded with `☆`. Unrated places show five empty stars.
#[must_use]
pub fn stars(rating: Option<f64>) -> String {
    let Some(rating) = rating.filter(|r| *r > 0.0) else {
        return "☆☆☆☆☆".to_string();
    };
    let rating = rating.min(5.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let full = rating.floor() as usize;
    let half = usize::from(rating.fract() >= 0.5);
    let empty = 5usize.saturating_sub(full + half);
    format!("{}{}{}", "★".repeat(full), "☆".repeat(half), "☆".repeat(empty))
}

fn rating_text(rating: Option<f64>, count: Option<u32>) -> String {
    match (rating.filter(|r| *r > 0.0), count) {
        (Some(r), Some(n)) if n > 0 => format!("{r:.1} ({n})"),
        (Some(r), _) => format!("{r:.1}"),
        (None, _) => "New".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cafe(id: &str, rating: Option<f64>) -> CafeRecord {
        CafeRecord {
            place_id: id.to_string(),
            name: format!("Cafe {id}"),
            location: Coordinate::new(19.08, 72.88),
            rating,
            rating_count: Some(120),
            price_level: Some(2),
            is_open_now: Some(true),
            address: "Bandra West".to_string(),
            distance_km: 1.234,
        }
    }

    #[test]
    fn stars_for_whole_half_and_missing_ratings() {
        assert_eq!(stars(Some(4.0)), "★★★★☆");
        assert_eq!(stars(Some(3.5)), "★★★☆☆");
        assert_eq!(stars(Some(4.7)), "★★★★☆");
        assert_eq!(stars(Some(5.0)), "★★★★★");
        assert_eq!(stars(None), "☆☆☆☆☆");
        assert_eq!(stars(Some(0.0)), "☆☆☆☆☆");
    }

    #[test]
    fn card_carries_badges_and_flags() {
        let favorites: BTreeSet<String> = ["a".to_string()].into();
        let view = project_list(&[cafe("a", Some(4.6))], &favorites, Some("a"), ListMode::Filtered);
        let card = &view.cards[0];
        assert_eq!(card.rating_text, "4.6 (120)");
        assert_eq!(card.price.as_deref(), Some("££"));
        assert_eq!(card.open, OpenBadge::Open);
        assert!(card.top_rated);
        assert_eq!(card.distance_text, "1.2 km away");
        assert!(card.is_favorite);
        assert!(card.is_selected);
        assert_eq!(view.results_label, "1 found");
        assert!(view.empty_message.is_none());
    }

    #[test]
    fn unrated_cafe_reads_new_and_unknown_hours() {
        let mut c = cafe("b", None);
        c.is_open_now = None;
        c.price_level = Some(0);
        let view = project_list(&[c], &BTreeSet::new(), None, ListMode::Filtered);
        let card = &view.cards[0];
        assert_eq!(card.rating_text, "New");
        assert_eq!(card.price, None);
        assert_eq!(card.open, OpenBadge::Unknown);
        assert!(!card.top_rated);
        assert!(!card.is_favorite);
    }

    #[test]
    fn empty_list_has_empty_state() {
        let view = project_list(&[], &BTreeSet::new(), None, ListMode::Filtered);
        assert_eq!(view.results_label, "0 found");
        assert!(view.empty_message.is_some());
    }

    #[test]
    fn favorites_mode_changes_label() {
        let view = project_list(
            &[cafe("a", None)],
            &BTreeSet::new(),
            None,
            ListMode::FavoritesOnly,
        );
        assert_eq!(view.results_label, "1 favorites");
    }

    #[test]
    fn markers_use_favorite_icon_and_lead_with_user() {
        let favorites: BTreeSet<String> = ["b".to_string()].into();
        let user = Coordinate::new(19.076, 72.8777);
        let markers = project_markers(Some(user), &[cafe("a", None), cafe("b", None)], &favorites);
        let icons: Vec<MarkerIcon> = markers.iter().map(|m| m.icon).collect();
        assert_eq!(icons, vec![MarkerIcon::User, MarkerIcon::Cafe, MarkerIcon::Favorite]);
        assert_eq!(markers[0].position, user);
    }
}
