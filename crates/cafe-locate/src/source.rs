//! Where device positions come from.

use std::future::Future;

use cafe_core::{AppConfig, Coordinate, GeolocationMode};

use crate::error::LocateFailure;
use crate::ip::IpLocationSource;

/// A platform position provider. One call yields one reading or a failure.
pub trait LocationSource {
    fn current_position(&self) -> impl Future<Output = Result<Coordinate, LocateFailure>> + Send;
}

/// Always reports the same coordinate.
#[derive(Debug, Clone, Copy)]
pub struct FixedSource(pub Coordinate);

impl LocationSource for FixedSource {
    fn current_position(&self) -> impl Future<Output = Result<Coordinate, LocateFailure>> + Send {
        let coordinate = self.0;
        async move { Ok(coordinate) }
    }
}

/// Location access switched off by the user.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedSource;

impl LocationSource for DeniedSource {
    fn current_position(&self) -> impl Future<Output = Result<Coordinate, LocateFailure>> + Send {
        async { Err(LocateFailure::PermissionDenied) }
    }
}

/// No positioning capability at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedSource;

impl LocationSource for UnsupportedSource {
    fn current_position(&self) -> impl Future<Output = Result<Coordinate, LocateFailure>> + Send {
        async { Err(LocateFailure::Unsupported) }
    }
}

/// The source selected by configuration.
pub enum PlatformSource {
    Fixed(FixedSource),
    Ip(IpLocationSource),
    Denied(DeniedSource),
    Unsupported(UnsupportedSource),
}

impl PlatformSource {
    /// Picks a source from `config`. A configured fixed location wins over the
    /// geolocation mode.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client for IP lookup cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        if let Some(coordinate) = config.fixed_location {
            return Ok(Self::Fixed(FixedSource(coordinate)));
        }
        Ok(match config.geolocation {
            GeolocationMode::Ip => Self::Ip(IpLocationSource::new(
                &config.ip_locate_url,
                config.locate_timeout_secs,
                &config.user_agent,
            )?),
            GeolocationMode::Off => Self::Denied(DeniedSource),
            GeolocationMode::None => Self::Unsupported(UnsupportedSource),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fixed(_) => "fixed",
            Self::Ip(_) => "ip",
            Self::Denied(_) => "off",
            Self::Unsupported(_) => "none",
        }
    }
}

impl LocationSource for PlatformSource {
    fn current_position(&self) -> impl Future<Output = Result<Coordinate, LocateFailure>> + Send {
        async move {
            match self {
                Self::Fixed(s) => s.current_position().await,
                Self::Ip(s) => s.current_position().await,
                Self::Denied(s) => s.current_position().await,
                Self::Unsupported(s) => s.current_position().await,
            }
        }
    }
}
