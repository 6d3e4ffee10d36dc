pub mod app_config;
pub mod config;
pub mod distance;
pub mod error;
pub mod favorites;
pub mod filter;
pub mod session;
pub mod storage;
pub mod theme;
pub mod types;
pub mod view;

pub use app_config::{AppConfig, GeolocationMode};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use distance::distance_km;
pub use error::{ConfigError, StorageError};
pub use favorites::{FavoritesLoad, FavoritesStore};
pub use filter::{apply_filters, FilterCriteria, SortKey};
pub use session::SearchSession;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use theme::{Theme, ThemeStore};
pub use types::{CafeRecord, Coordinate, CoordinateParseError};
