//! Interactive session: a single-threaded event loop over stdin lines,
//! in-flight async work and the radius debounce timer.
//!
//! State is only touched between awaits, inside the loop body, so each
//! command or completion is applied in full before the next event is seen.

use std::time::Duration;

use cafe_core::{config::parse_radius, CafeRecord, SortKey, Storage};
use cafe_locate::LocationFix;
use cafe_places::SearchError;
use clap::{CommandFactory, Parser, Subcommand};
use futures::future::LocalBoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::{Controller, SearchTicket};
use crate::commands::parse_min_rating;
use crate::debounce::Debouncer;
use crate::dictation::{Dictation, DictationError};
use crate::render;
use crate::services::Services;

/// One line typed at the prompt.
#[derive(Debug, Parser)]
#[command(
    name = "",
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
pub(crate) struct ReplLine {
    #[command(subcommand)]
    pub command: ReplCommand,
}

#[derive(Debug, PartialEq, Subcommand)]
pub(crate) enum ReplCommand {
    /// Search for cafes; the remaining words form the query
    Search {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },
    /// Repeat the current search
    Retry,
    /// Set the search radius in km (searches again after a short pause)
    Radius {
        #[arg(value_parser = parse_radius)]
        km: f64,
    },
    /// Only list cafes rated at least this high (0, 3, 3.5, 4 or 4.5)
    Rating {
        #[arg(value_parser = parse_min_rating)]
        min: f64,
    },
    /// Order results by distance, rating or name
    Sort { key: SortKey },
    /// Toggle the open-now filter
    Open,
    /// Reset rating and open-now filters
    Clear,
    /// Toggle a cafe as favorite
    Fav { place_id: String },
    /// Show only favorites from the current results
    Favorites,
    /// Return to the filtered results
    All,
    /// Select a listed cafe and centre the map on it
    Select { place_id: String },
    /// Centre the map on your location
    Center,
    /// Locate again, then search
    Locate,
    /// Switch between light and dark theme
    Theme,
    /// Show or hide the result list
    Sidebar,
    /// Dictate a search query
    Voice,
    /// Redraw the current screen
    Show,
    /// List commands
    Help,
    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

/// Work the loop must start after a command is applied.
#[derive(Debug, PartialEq)]
pub(crate) enum Effect {
    Search(SearchTicket),
    Locate,
    Listen,
    ArmDebounce,
    Render,
    Help,
    Quit,
}

enum Event {
    Located(LocationFix),
    Searched(SearchTicket, Result<Vec<CafeRecord>, SearchError>),
    Heard(Result<String, DictationError>),
}

/// Parses a prompt line. Blank lines yield `Ok(None)`.
pub(crate) fn parse_line(line: &str) -> Result<Option<ReplCommand>, clap::Error> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }
    ReplLine::try_parse_from(words).map(|parsed| Some(parsed.command))
}

/// Applies `command` to the controller and reports the follow-up work.
pub(crate) fn apply_command<S: Storage>(
    controller: &mut Controller<S>,
    command: ReplCommand,
) -> Vec<Effect> {
    match command {
        ReplCommand::Search { query } => {
            let query = query.join(" ");
            controller
                .begin_search(Some(&query))
                .map(Effect::Search)
                .into_iter()
                .collect()
        }
        ReplCommand::Retry => controller
            .begin_search(None)
            .map(Effect::Search)
            .into_iter()
            .collect(),
        ReplCommand::Radius { km } => {
            controller.set_radius(km);
            vec![Effect::ArmDebounce]
        }
        ReplCommand::Rating { min } => {
            controller.set_min_rating(min);
            vec![Effect::Render]
        }
        ReplCommand::Sort { key } => {
            controller.set_sort(key);
            vec![Effect::Render]
        }
        ReplCommand::Open => {
            let open_now = !controller.criteria().open_now_only;
            controller.set_open_now(open_now);
            vec![Effect::Render]
        }
        ReplCommand::Clear => {
            controller.clear_filters();
            vec![Effect::Render]
        }
        ReplCommand::Fav { place_id } => {
            controller.toggle_favorite(&place_id);
            vec![Effect::Render]
        }
        ReplCommand::Favorites => {
            if controller.show_favorites() {
                vec![Effect::Render]
            } else {
                vec![]
            }
        }
        ReplCommand::All => {
            controller.show_all();
            vec![Effect::Render]
        }
        ReplCommand::Select { place_id } => {
            if controller.select(&place_id) {
                vec![Effect::Render]
            } else {
                vec![]
            }
        }
        ReplCommand::Center => {
            controller.center();
            vec![]
        }
        ReplCommand::Locate => {
            controller.begin_locate();
            vec![Effect::Locate]
        }
        ReplCommand::Theme => {
            controller.toggle_theme();
            vec![]
        }
        ReplCommand::Sidebar => {
            controller.toggle_sidebar();
            vec![Effect::Render]
        }
        ReplCommand::Voice => {
            controller.begin_voice();
            vec![Effect::Listen]
        }
        ReplCommand::Show => vec![Effect::Render],
        ReplCommand::Help => vec![Effect::Help],
        ReplCommand::Quit => vec![Effect::Quit],
    }
}

fn locate_task(services: &Services) -> LocalBoxFuture<'_, Event> {
    async move { Event::Located(services.locator.locate().await) }.boxed_local()
}

fn search_task(services: &Services, ticket: SearchTicket) -> LocalBoxFuture<'_, Event> {
    async move {
        let outcome = services
            .search
            .search(ticket.origin, ticket.radius_km, &ticket.query_text)
            .await;
        Event::Searched(ticket, outcome)
    }
    .boxed_local()
}

fn listen_task(services: &Services) -> LocalBoxFuture<'_, Event> {
    async move { Event::Heard(services.dictation.listen().await) }.boxed_local()
}

fn flush<S: Storage>(controller: &mut Controller<S>, redraw: bool) {
    render::print_notices(&controller.drain_notices());
    if redraw {
        print!("{}", render::screen_text(&controller.screen()));
    }
}

/// Runs the interactive session until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if reading standard input fails.
pub(crate) async fn run<S: Storage>(
    controller: &mut Controller<S>,
    services: &Services,
    debounce: Duration,
) -> anyhow::Result<()> {
    let mut pending: FuturesUnordered<LocalBoxFuture<'_, Event>> = FuturesUnordered::new();
    let mut debouncer = Debouncer::new(debounce);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("cafe-finder: type `help` for commands");
    controller.begin_locate();
    pending.push(locate_task(services));
    flush(controller, false);

    loop {
        let mut redraw = false;
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = match parse_line(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(err) => {
                        println!("{}", err.render());
                        continue;
                    }
                };
                let mut quit = false;
                for effect in apply_command(controller, command) {
                    match effect {
                        Effect::Search(ticket) => pending.push(search_task(services, ticket)),
                        Effect::Locate => pending.push(locate_task(services)),
                        Effect::Listen => pending.push(listen_task(services)),
                        Effect::ArmDebounce => debouncer.arm(),
                        Effect::Render => redraw = true,
                        Effect::Help => println!("{}", ReplLine::command().render_help()),
                        Effect::Quit => quit = true,
                    }
                }
                if quit {
                    break;
                }
            }
            Some(event) = pending.next(), if !pending.is_empty() => {
                match event {
                    Event::Located(fix) => {
                        controller.finish_locate(&fix);
                        if let Some(ticket) = controller.begin_search(None) {
                            pending.push(search_task(services, ticket));
                        }
                    }
                    Event::Searched(ticket, outcome) => {
                        redraw = controller.finish_search(ticket, outcome);
                    }
                    Event::Heard(outcome) => {
                        if let Some(transcript) = controller.finish_voice(outcome) {
                            if let Some(ticket) = controller.begin_search(Some(&transcript)) {
                                pending.push(search_task(services, ticket));
                            }
                        }
                    }
                }
            }
            () = debouncer.fired(), if debouncer.is_armed() => {
                tracing::debug!("radius settled; searching");
                if let Some(ticket) = controller.begin_search(None) {
                    pending.push(search_task(services, ticket));
                }
            }
        }
        flush(controller, redraw);
    }

    flush(controller, false);
    Ok(())
}
