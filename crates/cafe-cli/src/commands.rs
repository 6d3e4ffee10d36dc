//! One-shot subcommand handlers.
//!
//! Each handler builds only what it needs from the config, runs to
//! completion and prints its result to stdout.

use clap::{Args, Subcommand};

use cafe_core::filter::MIN_RATING_CHOICES;
use cafe_core::{config::parse_radius, AppConfig, FavoritesStore, SortKey, ThemeStore};
use cafe_locate::FixStatus;

use crate::render;
use crate::services::{open_controller, open_storage, Services};

/// Options for a single search.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Words to search for (defaults to any cafe)
    pub query: Vec<String>,
    /// Search radius in km (defaults to CAFE_FINDER_DEFAULT_RADIUS_KM)
    #[arg(long, value_parser = parse_radius)]
    pub radius: Option<f64>,
    /// Minimum rating: 0, 3, 3.5, 4 or 4.5
    #[arg(long, default_value_t = 0.0, value_parser = parse_min_rating)]
    pub min_rating: f64,
    /// Result order: distance, rating or name
    #[arg(long, default_value_t = SortKey::Distance)]
    pub sort: SortKey,
    /// Only list cafes known to be open now
    #[arg(long)]
    pub open_now: bool,
    /// Only list favorites among the results
    #[arg(long)]
    pub favorites_only: bool,
    /// Print the screen model as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommands {
    /// List saved favorite place ids
    List,
    /// Add or remove a favorite
    Toggle { place_id: String },
}

#[derive(Debug, Subcommand)]
pub enum ThemeCommands {
    /// Print the saved theme
    Show,
    /// Switch between light and dark
    Toggle,
}

/// Parses a minimum rating; only the values in [`MIN_RATING_CHOICES`] are offered.
pub(crate) fn parse_min_rating(raw: &str) -> Result<f64, String> {
    let rating = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("{raw:?} is not a number: {e}"))?;
    MIN_RATING_CHOICES
        .into_iter()
        .find(|choice| (choice - rating).abs() < 1e-9)
        .ok_or_else(|| format!("rating must be one of 0, 3, 3.5, 4 or 4.5, got {raw}"))
}

pub(crate) async fn run_search(config: &AppConfig, args: &SearchArgs) -> anyhow::Result<()> {
    let services = Services::from_config(config)?;
    let mut controller = open_controller(config)?;

    controller.begin_locate();
    let fix = services.locator.locate().await;
    controller.finish_locate(&fix);

    if let Some(radius) = args.radius {
        controller.set_radius(radius);
    }
    controller.set_min_rating(args.min_rating);
    controller.set_sort(args.sort);
    controller.set_open_now(args.open_now);

    let query = args.query.join(" ");
    let Some(ticket) = controller.begin_search(Some(&query)) else {
        anyhow::bail!("no location available to search from");
    };
    let outcome = services
        .search
        .search(ticket.origin, ticket.radius_km, &ticket.query_text)
        .await;
    controller.finish_search(ticket, outcome);
    if args.favorites_only {
        controller.show_favorites();
    }

    let notices = controller.drain_notices();
    let screen = controller.screen();
    if args.json {
        println!("{}", render::screen_json(&screen)?);
    } else {
        render::print_notices(&notices);
        print!("{}", render::screen_text(&screen));
    }

    match controller.last_error() {
        Some(err) => Err(anyhow::anyhow!(err.clone())),
        None => Ok(()),
    }
}

pub(crate) async fn run_locate(config: &AppConfig) -> anyhow::Result<()> {
    let services = Services::from_config(config)?;
    let fix = services.locator.locate().await;
    let how = match &fix.status {
        FixStatus::Located => "located".to_string(),
        FixStatus::Cached => "cached".to_string(),
        FixStatus::Fallback(reason) => format!("default location ({reason})"),
    };
    println!(
        "{} [{how}, {}]",
        fix.coordinate,
        fix.obtained_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(())
}

pub(crate) fn run_favorites(config: &AppConfig, command: &FavoritesCommands) -> anyhow::Result<()> {
    let mut favorites = FavoritesStore::open(open_storage(config)?);
    match command {
        FavoritesCommands::List => {
            if favorites.is_empty() {
                println!("no favorites yet");
            }
            for id in favorites.all() {
                println!("{id}");
            }
        }
        FavoritesCommands::Toggle { place_id } => {
            let now_favorite = favorites.toggle(place_id);
            if favorites.last_write_failed() {
                anyhow::bail!("favorites could not be saved");
            }
            let verb = if now_favorite { "added" } else { "removed" };
            println!("{verb} {place_id}");
        }
    }
    Ok(())
}

pub(crate) fn run_theme(config: &AppConfig, command: &ThemeCommands) -> anyhow::Result<()> {
    let mut theme = ThemeStore::open(open_storage(config)?);
    let current = match command {
        ThemeCommands::Show => theme.current(),
        ThemeCommands::Toggle => theme.toggle(),
    };
    println!("{current}");
    Ok(())
}
