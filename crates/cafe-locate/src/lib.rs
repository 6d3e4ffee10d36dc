pub mod error;
pub mod ip;
pub mod locator;
pub mod source;

pub use error::LocateFailure;
pub use ip::IpLocationSource;
pub use locator::{FixStatus, GeoLocator, LocationFix};
pub use source::{DeniedSource, FixedSource, LocationSource, PlatformSource, UnsupportedSource};
