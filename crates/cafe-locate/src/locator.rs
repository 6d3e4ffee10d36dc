//! Device location with a bounded wait, a short-lived cache and a fixed
//! fallback.
//!
//! [`GeoLocator::locate`] never fails. Every source failure resolves to the
//! configured fallback coordinate and is reported through
//! [`FixStatus::Fallback`] so the caller can tell the user.

use std::sync::Mutex;
use std::time::Duration;

use cafe_core::Coordinate;
use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::error::LocateFailure;
use crate::source::LocationSource;

/// How a [`LocationFix`] was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixStatus {
    /// Fresh reading from the source.
    Located,
    /// Reused a reading younger than the max age.
    Cached,
    /// The source failed; the fallback coordinate is in use.
    Fallback(LocateFailure),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationFix {
    pub coordinate: Coordinate,
    pub status: FixStatus,
    pub obtained_at: DateTime<Utc>,
}

impl LocationFix {
    pub fn is_fallback(&self) -> bool {
        matches!(self.status, FixStatus::Fallback(_))
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedReading {
    coordinate: Coordinate,
    taken: Instant,
    obtained_at: DateTime<Utc>,
}

pub struct GeoLocator<S> {
    source: S,
    timeout: Duration,
    max_age: Duration,
    fallback: Coordinate,
    cache: Mutex<Option<CachedReading>>,
}

impl<S: LocationSource> GeoLocator<S> {
    pub fn new(source: S, timeout: Duration, max_age: Duration, fallback: Coordinate) -> Self {
        Self {
            source,
            timeout,
            max_age,
            fallback,
            cache: Mutex::new(None),
        }
    }

    /// Resolves the current position.
    ///
    /// A reading younger than the max age is returned without consulting the
    /// source. Otherwise the source gets up to the configured timeout; on
    /// failure the fallback coordinate is returned and nothing is cached.
    pub async fn locate(&self) -> LocationFix {
        if let Some(cached) = self.fresh_cached() {
            tracing::debug!(coordinate = %cached.coordinate, "using cached position");
            return LocationFix {
                coordinate: cached.coordinate,
                status: FixStatus::Cached,
                obtained_at: cached.obtained_at,
            };
        }

        let outcome = match tokio::time::timeout(self.timeout, self.source.current_position()).await
        {
            Ok(result) => result,
            Err(_) => Err(LocateFailure::Timeout),
        };

        match outcome {
            Ok(coordinate) => {
                let reading = CachedReading {
                    coordinate,
                    taken: Instant::now(),
                    obtained_at: Utc::now(),
                };
                self.store(reading);
                tracing::info!(%coordinate, "located device");
                LocationFix {
                    coordinate,
                    status: FixStatus::Located,
                    obtained_at: reading.obtained_at,
                }
            }
            Err(failure) => {
                tracing::warn!(
                    reason = %failure,
                    fallback = %self.fallback,
                    "location unavailable; using fallback"
                );
                LocationFix {
                    coordinate: self.fallback,
                    status: FixStatus::Fallback(failure),
                    obtained_at: Utc::now(),
                }
            }
        }
    }

    fn fresh_cached(&self) -> Option<CachedReading> {
        let guard = self
            .cache
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        (*guard).filter(|reading| reading.taken.elapsed() < self.max_age)
    }

    fn store(&self, reading: CachedReading) {
        let mut guard = self
            .cache
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = Some(reading);
    }
}
