use crate::app_config::{AppConfig, GeolocationMode};
use crate::types::Coordinate;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Lets callers and tests assemble a config without touching process state.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_coordinate = |var: &str, raw: &str| -> Result<Coordinate, ConfigError> {
        raw.parse::<Coordinate>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let places_api_key = lookup("GOOGLE_PLACES_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let log_level = or_default("CAFE_FINDER_LOG_LEVEL", "info");
    let data_dir = PathBuf::from(or_default("CAFE_FINDER_DATA_DIR", "./.cafe-finder"));
    let places_base_url = or_default(
        "CAFE_FINDER_PLACES_BASE_URL",
        "https://maps.googleapis.com/maps/api/place/",
    );

    let request_timeout_secs = parse_u64("CAFE_FINDER_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("CAFE_FINDER_USER_AGENT", "cafe-finder/0.1 (nearby-cafes)");
    let max_retries = parse_u32("CAFE_FINDER_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("CAFE_FINDER_RETRY_BACKOFF_BASE_MS", "500")?;
    let strategy_delay_ms = parse_u64("CAFE_FINDER_STRATEGY_DELAY_MS", "500")?;
    let page_delay_ms = parse_u64("CAFE_FINDER_PAGE_DELAY_MS", "1200")?;
    let max_results = parse_usize("CAFE_FINDER_MAX_RESULTS", "40")?;
    let search_debounce_ms = parse_u64("CAFE_FINDER_SEARCH_DEBOUNCE_MS", "1000")?;

    let default_radius_km = parse_radius(&or_default("CAFE_FINDER_DEFAULT_RADIUS_KM", "2"))
        .map_err(|reason| invalid("CAFE_FINDER_DEFAULT_RADIUS_KM", reason))?;

    let geolocation = parse_geolocation_mode(&or_default("CAFE_FINDER_GEOLOCATION", "ip"))?;
    let fixed_location = match lookup("CAFE_FINDER_LOCATION") {
        Ok(raw) if !raw.trim().is_empty() => Some(parse_coordinate("CAFE_FINDER_LOCATION", &raw)?),
        _ => None,
    };
    let ip_locate_url = or_default("CAFE_FINDER_IP_LOCATE_URL", "http://ip-api.com/json");
    let locate_timeout_secs = parse_u64("CAFE_FINDER_LOCATE_TIMEOUT_SECS", "15")?;
    let locate_max_age_secs = parse_u64("CAFE_FINDER_LOCATE_MAX_AGE_SECS", "300")?;
    let fallback_location = parse_coordinate(
        "CAFE_FINDER_FALLBACK_LOCATION",
        &or_default("CAFE_FINDER_FALLBACK_LOCATION", "19.0760,72.8777"),
    )?;

    Ok(AppConfig {
        places_api_key,
        log_level,
        data_dir,
        places_base_url,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        strategy_delay_ms,
        page_delay_ms,
        max_results,
        default_radius_km,
        search_debounce_ms,
        geolocation,
        fixed_location,
        ip_locate_url,
        locate_timeout_secs,
        locate_max_age_secs,
        fallback_location,
    })
}

/// Parses a search radius in kilometres; it must be finite and positive.
///
/// # Errors
///
/// Returns a human-readable reason when the value is not a positive number.
pub fn parse_radius(raw: &str) -> Result<f64, String> {
    let km = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("{raw:?} is not a number: {e}"))?;
    if km.is_finite() && km > 0.0 {
        Ok(km)
    } else {
        Err(format!("radius must be greater than zero, got {raw}"))
    }
}

/// Parse `CAFE_FINDER_GEOLOCATION`.
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than `ip`, `off` or `none`.
fn parse_geolocation_mode(s: &str) -> Result<GeolocationMode, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "ip" => Ok(GeolocationMode::Ip),
        "off" => Ok(GeolocationMode::Off),
        "none" => Ok(GeolocationMode::None),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CAFE_FINDER_GEOLOCATION".to_string(),
            reason: format!("expected ip, off or none; got {other:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    fn assert_invalid(map: &HashMap<&str, &str>, expected: &str) {
        let result = build_app_config(lookup_from_map(map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == expected),
            "expected InvalidEnvVar({expected}), got: {result:?}"
        );
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let map = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.places_api_key.is_none());
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.data_dir.to_str(), Some("./.cafe-finder"));
        assert_eq!(
            cfg.places_base_url,
            "https://maps.googleapis.com/maps/api/place/"
        );
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.max_retries, 2);
        assert_eq!(cfg.retry_backoff_base_ms, 500);
        assert_eq!(cfg.strategy_delay_ms, 500);
        assert_eq!(cfg.page_delay_ms, 1200);
        assert_eq!(cfg.max_results, 40);
        assert!((cfg.default_radius_km - 2.0).abs() < f64::EPSILON);
        assert_eq!(cfg.search_debounce_ms, 1000);
        assert_eq!(cfg.geolocation, GeolocationMode::Ip);
        assert!(cfg.fixed_location.is_none());
        assert_eq!(cfg.locate_timeout_secs, 15);
        assert_eq!(cfg.locate_max_age_secs, 300);
        assert_eq!(cfg.fallback_location, Coordinate::new(19.0760, 72.8777));
    }

    #[test]
    fn blank_api_key_is_treated_as_missing() {
        let map = HashMap::from([("GOOGLE_PLACES_API_KEY", "  ")]);
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.places_api_key.is_none());
    }

    #[test]
    fn api_key_is_redacted_in_debug_output() {
        let map = HashMap::from([("GOOGLE_PLACES_API_KEY", "super-secret")]);
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[redacted]"));
    }

    #[test]
    fn fixed_location_is_parsed() {
        let map = HashMap::from([("CAFE_FINDER_LOCATION", "51.5074,-0.1278")]);
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.fixed_location, Some(Coordinate::new(51.5074, -0.1278)));
    }

    #[test]
    fn invalid_fixed_location_fails() {
        let map = HashMap::from([("CAFE_FINDER_LOCATION", "somewhere")]);
        assert_invalid(&map, "CAFE_FINDER_LOCATION");
    }

    #[test]
    fn geolocation_modes_parse() {
        for (raw, mode) in [
            ("ip", GeolocationMode::Ip),
            ("OFF", GeolocationMode::Off),
            ("none", GeolocationMode::None),
        ] {
            let map = HashMap::from([("CAFE_FINDER_GEOLOCATION", raw)]);
            let cfg = build_app_config(lookup_from_map(&map)).unwrap();
            assert_eq!(cfg.geolocation, mode);
        }
    }

    #[test]
    fn unknown_geolocation_mode_fails() {
        let map = HashMap::from([("CAFE_FINDER_GEOLOCATION", "gps")]);
        assert_invalid(&map, "CAFE_FINDER_GEOLOCATION");
    }

    #[test]
    fn zero_radius_fails() {
        let map = HashMap::from([("CAFE_FINDER_DEFAULT_RADIUS_KM", "0")]);
        assert_invalid(&map, "CAFE_FINDER_DEFAULT_RADIUS_KM");
    }

    #[test]
    fn numeric_overrides_apply() {
        let map = HashMap::from([
            ("CAFE_FINDER_MAX_RESULTS", "60"),
            ("CAFE_FINDER_PAGE_DELAY_MS", "2000"),
            ("CAFE_FINDER_DEFAULT_RADIUS_KM", "3.5"),
        ]);
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.max_results, 60);
        assert_eq!(cfg.page_delay_ms, 2000);
        assert!((cfg.default_radius_km - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_numbers_name_the_variable() {
        for var in [
            "CAFE_FINDER_REQUEST_TIMEOUT_SECS",
            "CAFE_FINDER_MAX_RETRIES",
            "CAFE_FINDER_STRATEGY_DELAY_MS",
            "CAFE_FINDER_MAX_RESULTS",
            "CAFE_FINDER_LOCATE_TIMEOUT_SECS",
        ] {
            let map = HashMap::from([(var, "not-a-number")]);
            assert_invalid(&map, var);
        }
    }

    #[test]
    fn parse_radius_rejects_negative_and_nan() {
        assert!(parse_radius("-1").is_err());
        assert!(parse_radius("NaN").is_err());
        assert!(parse_radius("abc").is_err());
        assert!((parse_radius(" 5 ").unwrap() - 5.0).abs() < f64::EPSILON);
    }
}
