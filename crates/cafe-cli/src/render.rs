//! Plain-text and JSON rendering of the view model.

use std::fmt::Write as _;

use cafe_core::view::{
    CafeCard, ListView, MapView, Notice, NoticeLevel, Remediation, RemediationAction,
};
use cafe_core::Theme;

use crate::app::Screen;

pub(crate) fn notice_line(notice: &Notice) -> String {
    let mark = match notice.level {
        NoticeLevel::Success => "✓",
        NoticeLevel::Error => "✗",
    };
    format!("{mark} {}", notice.message)
}

pub(crate) fn print_notices(notices: &[Notice]) {
    for notice in notices {
        println!("{}", notice_line(notice));
    }
}

pub(crate) fn screen_text(screen: &Screen) -> String {
    let mut out = String::new();
    let theme = match screen.theme {
        Theme::Light => "light",
        Theme::Dark => "dark",
    };
    let query = if screen.query_text.is_empty() {
        "(any)"
    } else {
        screen.query_text.as_str()
    };
    let _ = writeln!(
        out,
        "query: {query} | radius: {} km | min rating: {} | sort: {} | open now: {} \
         | theme: {theme}",
        screen.criteria.radius_km,
        screen.criteria.min_rating,
        screen.criteria.sort_key,
        if screen.criteria.open_now_only { "yes" } else { "no" },
    );
    if screen.searching {
        out.push_str("searching...\n");
    }

    if let Some(remediation) = &screen.error {
        out.push_str(&remediation_text(remediation));
    } else if !screen.sidebar_open {
        out.push_str("(results hidden; `sidebar` to show)\n");
    } else if let Some(list) = &screen.list {
        out.push_str(&list_text(list));
    } else {
        out.push_str("no search yet\n");
    }

    if let Some(map) = &screen.map {
        out.push_str(&map_text(map));
    }
    out
}

pub(crate) fn list_text(list: &ListView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "── {} ──", list.results_label);
    if let Some(empty) = &list.empty_message {
        let _ = writeln!(out, "{}\n  {}", empty.title, empty.hint);
        return out;
    }
    for (index, card) in list.cards.iter().enumerate() {
        out.push_str(&card_text(index + 1, card));
    }
    out
}

fn card_text(position: usize, card: &CafeCard) -> String {
    let mut badges = vec![card.open.label().to_string()];
    if let Some(price) = &card.price {
        badges.push(price.clone());
    }
    if card.top_rated {
        badges.push("Top rated".to_string());
    }
    let marker = if card.is_selected { ">" } else { " " };
    let heart = if card.is_favorite { "♥" } else { "♡" };
    let mut out = format!(
        "{marker}{position:>3}. {heart} {}  {} {}\n",
        card.name, card.stars, card.rating_text
    );
    let _ = writeln!(out, "       {} · {}", badges.join(" · "), card.distance_text);
    if !card.address.is_empty() {
        let _ = writeln!(out, "       {}", card.address);
    }
    let _ = writeln!(out, "       id: {}", card.place_id);
    out
}

pub(crate) fn remediation_text(remediation: &Remediation) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "── {} ──", remediation.results_label);
    let _ = writeln!(out, "{}", remediation.title);
    let _ = writeln!(out, "{}", remediation.message);
    for (n, step) in remediation.steps.iter().enumerate() {
        let _ = writeln!(out, "  {}. {step}", n + 1);
    }
    for action in &remediation.actions {
        let _ = writeln!(out, "  → {}{}", action.label(), command_hint(action));
    }
    out
}

/// The REPL command that performs `action`, if there is one.
fn command_hint(action: &RemediationAction) -> String {
    match action {
        RemediationAction::Retry => " (`retry`)".to_string(),
        RemediationAction::ExpandRadius { radius_km } => format!(" (`radius {radius_km}`)"),
        RemediationAction::ClearFilters => " (`clear`)".to_string(),
        RemediationAction::OpenUrl { .. } => String::new(),
    }
}

fn map_text(map: &MapView) -> String {
    format!(
        "map: centre {} zoom {} · {} markers\n",
        map.center,
        map.zoom,
        map.markers.len()
    )
}

/// Serializes `screen` for `--json` output.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub(crate) fn screen_json(screen: &Screen) -> serde_json::Result<String> {
    serde_json::to_string_pretty(screen)
}

#[cfg(test)]
mod tests {
    use cafe_core::view::{EmptyState, OpenBadge};
    use cafe_core::{Coordinate, FilterCriteria};

    use super::*;

    fn screen(list: Option<ListView>, error: Option<Remediation>) -> Screen {
        Screen {
            theme: Theme::Dark,
            sidebar_open: true,
            query_text: "latte".to_string(),
            criteria: FilterCriteria::with_radius(2.0),
            searching: false,
            location: Some(Coordinate::new(19.076, 72.8777)),
            list,
            error,
            map: None,
        }
    }

    fn card() -> CafeCard {
        CafeCard {
            place_id: "p1".to_string(),
            name: "Kala Ghoda Cafe".to_string(),
            stars: "★★★★☆".to_string(),
            rating_text: "4.6 (120)".to_string(),
            price: Some("££".to_string()),
            open: OpenBadge::Open,
            top_rated: true,
            address: "Fort".to_string(),
            distance_text: "1.2 km away".to_string(),
            is_favorite: true,
            is_selected: false,
        }
    }

    #[test]
    fn card_shows_badges_and_id() {
        let list = ListView {
            results_label: "1 found".to_string(),
            cards: vec![card()],
            empty_message: None,
        };
        let text = screen_text(&screen(Some(list), None));
        assert!(text.contains("── 1 found ──"));
        assert!(text.contains("♥ Kala Ghoda Cafe  ★★★★☆ 4.6 (120)"));
        assert!(text.contains("Open now · ££ · Top rated · 1.2 km away"));
        assert!(text.contains("id: p1"));
        assert!(text.contains("theme: dark"));
    }

    #[test]
    fn empty_list_shows_hint() {
        let list = ListView {
            results_label: "0 found".to_string(),
            cards: vec![],
            empty_message: Some(EmptyState {
                title: "No cafes match your criteria".to_string(),
                hint: "Try adjusting your filters".to_string(),
            }),
        };
        let text = list_text(&list);
        assert!(text.contains("No cafes match your criteria"));
    }

    #[test]
    fn remediation_lists_commands() {
        let remediation = Remediation {
            title: "No Cafes Found".to_string(),
            message: "Nothing here".to_string(),
            steps: vec![],
            actions: vec![
                RemediationAction::ExpandRadius { radius_km: 5.0 },
                RemediationAction::ClearFilters,
            ],
            results_label: "Error".to_string(),
        };
        let text = screen_text(&screen(None, Some(remediation)));
        assert!(text.contains("── Error ──"));
        assert!(text.contains("(`radius 5`)"));
        assert!(text.contains("(`clear`)"));
    }

    #[test]
    fn json_includes_list_and_criteria() {
        let list = ListView {
            results_label: "1 found".to_string(),
            cards: vec![card()],
            empty_message: None,
        };
        let json = screen_json(&screen(Some(list), None)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["list"]["cards"][0]["place_id"], "p1");
        assert_eq!(value["criteria"]["sort_key"], "distance");
        assert_eq!(value["theme"], "dark");
    }
}
