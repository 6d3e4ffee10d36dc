//! Application state and the operations the user can perform on it.
//!
//! The controller is synchronous. Anything that has to wait on the outside
//! world (locating, searching, dictation) is split into a `begin_*` call that
//! records intent and a `finish_*` call that applies the outcome, so the event
//! loop can run the waiting part without holding a borrow on the state.

use cafe_core::view::{
    project_list, project_markers, ListMode, ListView, MapView, Notice, Remediation,
    INITIAL_ZOOM, SELECTED_ZOOM, USER_ZOOM,
};
use cafe_core::{
    apply_filters, CafeRecord, Coordinate, FavoritesLoad, FavoritesStore, FilterCriteria,
    SearchSession, SortKey, Storage, Theme, ThemeStore,
};
use cafe_locate::{FixStatus, LocateFailure, LocationFix};
use cafe_places::SearchError;
use serde::Serialize;

use crate::dictation::DictationError;

/// A search that has been issued but not yet applied.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTicket {
    pub generation: u64,
    pub origin: Coordinate,
    pub radius_km: f64,
    pub query_text: String,
}

/// Everything a front-end needs to draw one frame.
#[derive(Debug, Clone, Serialize)]
pub struct Screen {
    pub theme: Theme,
    pub sidebar_open: bool,
    pub query_text: String,
    pub criteria: FilterCriteria,
    pub searching: bool,
    pub location: Option<Coordinate>,
    /// `None` until the first search completes, or while an error is shown.
    pub list: Option<ListView>,
    pub error: Option<Remediation>,
    pub map: Option<MapView>,
}

#[derive(Debug, Clone, Copy)]
struct Viewport {
    center: Coordinate,
    zoom: u8,
}

pub struct Controller<S> {
    favorites: FavoritesStore<S>,
    theme: ThemeStore<S>,
    criteria: FilterCriteria,
    query_text: String,
    user_location: Option<Coordinate>,
    viewport: Option<Viewport>,
    session: Option<SearchSession>,
    error: Option<SearchError>,
    list_mode: ListMode,
    selected: Option<String>,
    sidebar_open: bool,
    /// Number of the most recently issued search.
    generation: u64,
    searching: bool,
    notices: Vec<Notice>,
}

impl<S: Storage> Controller<S> {
    pub fn new(favorites: FavoritesStore<S>, theme: ThemeStore<S>, default_radius_km: f64) -> Self {
        let mut notices = Vec::new();
        if let FavoritesLoad::Corrupt(_) = favorites.load_status() {
            notices.push(Notice::error("Saved favorites were unreadable and have been reset"));
        }
        Self {
            favorites,
            theme,
            criteria: FilterCriteria::with_radius(default_radius_km),
            query_text: String::new(),
            user_location: None,
            viewport: None,
            session: None,
            error: None,
            list_mode: ListMode::Filtered,
            selected: None,
            sidebar_open: true,
            generation: 0,
            searching: false,
            notices,
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn last_error(&self) -> Option<&SearchError> {
        self.error.as_ref()
    }

    // ----- location -----

    pub fn begin_locate(&mut self) {
        self.notices.push(Notice::success("Getting your location..."));
    }

    /// Records the user's position. The first fix also centres the map.
    pub fn finish_locate(&mut self, fix: &LocationFix) {
        let first_fix = self.user_location.is_none();
        self.user_location = Some(fix.coordinate);
        if first_fix {
            self.viewport = Some(Viewport {
                center: fix.coordinate,
                zoom: INITIAL_ZOOM,
            });
        }
        let notice = match &fix.status {
            FixStatus::Located | FixStatus::Cached => Notice::success("Location found!"),
            FixStatus::Fallback(LocateFailure::Unsupported) => {
                Notice::error("Geolocation is not supported here. Using default location.")
            }
            FixStatus::Fallback(_) => {
                Notice::error("Unable to get your location. Using default location.")
            }
        };
        self.notices.push(notice);
    }

    // ----- search -----

    /// Issues a new search with `query_text` (or the current text when
    /// `None`). Returns `None` while no location is known.
    pub fn begin_search(&mut self, query_text: Option<&str>) -> Option<SearchTicket> {
        if let Some(text) = query_text {
            self.query_text = text.trim().to_string();
        }
        let Some(origin) = self.user_location else {
            self.notices
                .push(Notice::error("Map not ready yet. Waiting for your location."));
            return None;
        };
        self.generation += 1;
        self.searching = true;
        self.notices.push(Notice::success("Searching for cafes..."));
        tracing::debug!(
            generation = self.generation,
            query = %self.query_text,
            radius_km = self.criteria.radius_km,
            "search issued"
        );
        Some(SearchTicket {
            generation: self.generation,
            origin,
            radius_km: self.criteria.radius_km,
            query_text: self.query_text.clone(),
        })
    }

    /// Applies a search outcome. Completions for anything but the latest
    /// issued search are dropped; returns whether the outcome was applied.
    pub fn finish_search(
        &mut self,
        ticket: SearchTicket,
        outcome: Result<Vec<CafeRecord>, SearchError>,
    ) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                stale = ticket.generation,
                latest = self.generation,
                "discarding stale search result"
            );
            return false;
        }
        self.searching = false;
        match outcome {
            Ok(results) => {
                self.notices
                    .push(Notice::success(format!("Found {} cafes", results.len())));
                let session = SearchSession::new(
                    ticket.query_text,
                    ticket.origin,
                    ticket.radius_km,
                    results,
                );
                if let Some(id) = &self.selected {
                    if session.find(id).is_none() {
                        self.selected = None;
                    }
                }
                self.session = Some(session);
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "search failed");
                self.notices.push(Notice::error(err.to_string()));
                self.session = None;
                self.selected = None;
                self.error = Some(err);
            }
        }
        self.list_mode = ListMode::Filtered;
        true
    }

    // ----- filters -----

    pub fn set_min_rating(&mut self, min_rating: f64) {
        self.criteria.min_rating = min_rating;
        self.list_mode = ListMode::Filtered;
    }

    pub fn set_sort(&mut self, sort_key: SortKey) {
        self.criteria.sort_key = sort_key;
        self.list_mode = ListMode::Filtered;
    }

    pub fn set_open_now(&mut self, open_now_only: bool) {
        self.criteria.open_now_only = open_now_only;
        self.list_mode = ListMode::Filtered;
    }

    pub fn clear_filters(&mut self) {
        self.criteria.clear_filters();
        self.list_mode = ListMode::Filtered;
    }

    /// Updates the search radius. The caller schedules the follow-up search.
    pub fn set_radius(&mut self, radius_km: f64) {
        self.criteria.radius_km = radius_km;
        self.list_mode = ListMode::Filtered;
    }

    // ----- favorites -----

    /// Flips a favorite and returns the new state.
    pub fn toggle_favorite(&mut self, place_id: &str) -> bool {
        let now_favorite = self.favorites.toggle(place_id);
        self.notices.push(Notice::success(if now_favorite {
            "Added to favorites"
        } else {
            "Removed from favorites"
        }));
        if self.favorites.last_write_failed() {
            self.notices
                .push(Notice::error("Favorites could not be saved to disk"));
        }
        now_favorite
    }

    /// Switches to the favorites-only list; stays put when there is nothing
    /// to show.
    pub fn show_favorites(&mut self) -> bool {
        if self.favorites.is_empty() {
            self.notices.push(Notice::error("No favorites yet"));
            return false;
        }
        let count = self.favorite_results().len();
        if count == 0 {
            self.notices
                .push(Notice::error("None of your favorites are in the current results"));
            return false;
        }
        self.list_mode = ListMode::FavoritesOnly;
        self.notices
            .push(Notice::success(format!("Showing {count} favorites")));
        true
    }

    pub fn show_all(&mut self) {
        self.list_mode = ListMode::Filtered;
        self.notices.push(Notice::success("Showing all results"));
    }

    // ----- map & chrome -----

    /// Marks a visible cafe as selected and centres the map on it.
    pub fn select(&mut self, place_id: &str) -> bool {
        let Some(cafe) = self.visible().into_iter().find(|c| c.place_id == place_id) else {
            self.notices
                .push(Notice::error("That cafe is not in the current list"));
            return false;
        };
        self.viewport = Some(Viewport {
            center: cafe.location,
            zoom: SELECTED_ZOOM,
        });
        self.selected = Some(cafe.place_id);
        true
    }

    pub fn center(&mut self) {
        let Some(location) = self.user_location else {
            self.notices
                .push(Notice::error("Map not ready yet. Waiting for your location."));
            return;
        };
        self.viewport = Some(Viewport {
            center: location,
            zoom: USER_ZOOM,
        });
        self.notices.push(Notice::success("Centered on your location"));
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.theme.toggle();
        self.notices.push(Notice::success("Theme updated"));
        theme
    }

    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar_open = !self.sidebar_open;
        self.sidebar_open
    }

    // ----- voice -----

    pub fn begin_voice(&mut self) {
        self.notices.push(Notice::success("Listening..."));
    }

    /// Applies a dictation outcome. Returns the transcript to search for.
    pub fn finish_voice(&mut self, outcome: Result<String, DictationError>) -> Option<String> {
        match outcome {
            Ok(transcript) if !transcript.trim().is_empty() => {
                let transcript = transcript.trim().to_string();
                self.notices
                    .push(Notice::success(format!("Heard: \"{transcript}\"")));
                self.query_text.clone_from(&transcript);
                Some(transcript)
            }
            Ok(_) => {
                self.notices.push(Notice::error("Didn't catch that. Try again."));
                None
            }
            Err(DictationError::Unsupported) => {
                self.notices.push(Notice::error(
                    "Voice search is not supported here. Please type your search.",
                ));
                None
            }
            Err(err) => {
                self.notices.push(Notice::error(format!("Voice search error: {err}")));
                None
            }
        }
    }

    // ----- projection -----

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// The cafes currently listed, in display order.
    pub fn visible(&self) -> Vec<CafeRecord> {
        match self.list_mode {
            ListMode::Filtered => self
                .session
                .as_ref()
                .map(|s| apply_filters(&s.results, &self.criteria))
                .unwrap_or_default(),
            ListMode::FavoritesOnly => self.favorite_results(),
        }
    }

    pub fn screen(&self) -> Screen {
        let visible = self.visible();
        let favorites = self.favorites.all();
        let list = self.session.as_ref().map(|_| {
            project_list(&visible, favorites, self.selected.as_deref(), self.list_mode)
        });
        let map = self.viewport.map(|viewport| MapView {
            center: viewport.center,
            zoom: viewport.zoom,
            markers: project_markers(self.user_location, &visible, favorites),
        });
        Screen {
            theme: self.theme.current(),
            sidebar_open: self.sidebar_open,
            query_text: self.query_text.clone(),
            criteria: self.criteria.clone(),
            searching: self.searching,
            location: self.user_location,
            list,
            error: self.error.as_ref().map(SearchError::remediation),
            map,
        }
    }

    /// Session results that are favorites, in session order. Bypasses the
    /// filter pipeline.
    fn favorite_results(&self) -> Vec<CafeRecord> {
        self.session
            .as_ref()
            .map(|s| {
                s.results
                    .iter()
                    .filter(|c| self.favorites.contains(&c.place_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
