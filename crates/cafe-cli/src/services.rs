//! Construction of the external collaborators from configuration.

use std::time::Duration;

use anyhow::Context;
use cafe_core::{AppConfig, FavoritesStore, FileStorage, ThemeStore};
use cafe_locate::{GeoLocator, PlatformSource};
use cafe_places::{PlacesClient, SearchOptions, SearchOrchestrator};

use crate::app::Controller;
use crate::dictation::NoDictation;

pub(crate) struct Services {
    pub search: SearchOrchestrator<PlacesClient>,
    pub locator: GeoLocator<PlatformSource>,
    pub dictation: NoDictation,
}

impl Services {
    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        if config.places_api_key.is_none() {
            tracing::warn!("GOOGLE_PLACES_API_KEY is not set; searches will be rejected");
        }
        let client = PlacesClient::with_base_url(
            config.places_api_key.as_deref().unwrap_or_default(),
            config.request_timeout_secs,
            &config.user_agent,
            &config.places_base_url,
        )
        .context("failed to build places client")?
        .with_retry(config.max_retries, config.retry_backoff_base_ms);

        let options = SearchOptions {
            strategy_delay: Duration::from_millis(config.strategy_delay_ms),
            page_delay: Duration::from_millis(config.page_delay_ms),
            max_results: config.max_results,
        };

        let source =
            PlatformSource::from_config(config).context("failed to build location source")?;
        tracing::debug!(source = source.kind(), "location source selected");
        let locator = GeoLocator::new(
            source,
            Duration::from_secs(config.locate_timeout_secs),
            Duration::from_secs(config.locate_max_age_secs),
            config.fallback_location,
        );

        Ok(Self {
            search: SearchOrchestrator::new(client, options),
            locator,
            dictation: NoDictation,
        })
    }
}

pub(crate) fn open_storage(config: &AppConfig) -> anyhow::Result<FileStorage> {
    FileStorage::open(config.data_dir.clone()).with_context(|| {
        format!(
            "failed to open data directory {}",
            config.data_dir.display()
        )
    })
}

pub(crate) fn open_controller(config: &AppConfig) -> anyhow::Result<Controller<FileStorage>> {
    let storage = open_storage(config)?;
    Ok(Controller::new(
        FavoritesStore::open(storage.clone()),
        ThemeStore::open(storage),
        config.default_radius_km,
    ))
}
