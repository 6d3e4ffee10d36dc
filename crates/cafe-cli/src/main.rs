mod app;
mod commands;
mod debounce;
mod dictation;
mod render;
mod repl;
mod services;

use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::{FavoritesCommands, SearchArgs, ThemeCommands};

#[derive(Debug, Parser)]
#[command(name = "cafe-finder")]
#[command(about = "Find cafes near you")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one search and print the results
    Search(SearchArgs),
    /// Print the current location
    Locate,
    /// Manage saved favorites
    Favorites {
        #[command(subcommand)]
        command: FavoritesCommands,
    },
    /// Show or switch the colour theme
    Theme {
        #[command(subcommand)]
        command: ThemeCommands,
    },
    /// Interactive session (the default)
    Interactive,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = cafe_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(?config, "configuration loaded");

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Search(args) => commands::run_search(&config, &args).await?,
        Commands::Locate => commands::run_locate(&config).await?,
        Commands::Favorites { command } => commands::run_favorites(&config, &command)?,
        Commands::Theme { command } => commands::run_theme(&config, &command)?,
        Commands::Interactive => {
            let services = services::Services::from_config(&config)?;
            let mut controller = services::open_controller(&config)?;
            repl::run(
                &mut controller,
                &services,
                Duration::from_millis(config.search_debounce_ms),
            )
            .await?;
        }
    }

    Ok(())
}
