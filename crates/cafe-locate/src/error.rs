use thiserror::Error;

/// Why the device position could not be obtained.
///
/// Never surfaced as a hard error: the locator maps every variant to the
/// fallback coordinate and reports it through [`crate::FixStatus::Fallback`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocateFailure {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location request timed out")]
    Timeout,

    #[error("geolocation is not supported")]
    Unsupported,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}
