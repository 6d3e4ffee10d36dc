pub mod client;
pub mod error;
pub mod normalize;
pub mod provider;
pub(crate) mod retry;
pub mod search;
pub mod types;

pub use client::PlacesClient;
pub use error::PlacesError;
pub use normalize::{normalize_place, normalize_results};
pub use provider::PlacesProvider;
pub use search::{SearchError, SearchOptions, SearchOrchestrator, Strategy};
pub use types::{NearbyRequest, NearbySearchResponse, PlaceResult, PlacesStatus};
