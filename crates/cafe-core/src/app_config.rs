use std::path::PathBuf;

use crate::types::Coordinate;

/// Where the device position comes from when no fixed location is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationMode {
    /// Look the position up from the public IP address.
    Ip,
    /// Location access switched off; behaves like a denied permission.
    Off,
    /// No location source at all.
    None,
}

impl std::fmt::Display for GeolocationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeolocationMode::Ip => write!(f, "ip"),
            GeolocationMode::Off => write!(f, "off"),
            GeolocationMode::None => write!(f, "none"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub places_api_key: Option<String>,
    pub log_level: String,
    pub data_dir: PathBuf,
    pub places_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub strategy_delay_ms: u64,
    pub page_delay_ms: u64,
    pub max_results: usize,
    pub default_radius_km: f64,
    pub search_debounce_ms: u64,
    pub geolocation: GeolocationMode,
    pub fixed_location: Option<Coordinate>,
    pub ip_locate_url: String,
    pub locate_timeout_secs: u64,
    pub locate_max_age_secs: u64,
    pub fallback_location: Coordinate,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "places_api_key",
                &self.places_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("log_level", &self.log_level)
            .field("data_dir", &self.data_dir)
            .field("places_base_url", &self.places_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("strategy_delay_ms", &self.strategy_delay_ms)
            .field("page_delay_ms", &self.page_delay_ms)
            .field("max_results", &self.max_results)
            .field("default_radius_km", &self.default_radius_km)
            .field("search_debounce_ms", &self.search_debounce_ms)
            .field("geolocation", &self.geolocation)
            .field("fixed_location", &self.fixed_location)
            .field("ip_locate_url", &self.ip_locate_url)
            .field("locate_timeout_secs", &self.locate_timeout_secs)
            .field("locate_max_age_secs", &self.locate_max_age_secs)
            .field("fallback_location", &self.fallback_location)
            .finish()
    }
}
