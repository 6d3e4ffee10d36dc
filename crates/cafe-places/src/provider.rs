use std::future::Future;

use crate::client::PlacesClient;
use crate::error::PlacesError;
use crate::types::{NearbyRequest, NearbySearchResponse};

/// The external places lookup as seen by the search orchestrator.
pub trait PlacesProvider {
    fn nearby_search(
        &self,
        request: &NearbyRequest,
    ) -> impl Future<Output = Result<NearbySearchResponse, PlacesError>> + Send;

    fn next_page(
        &self,
        page_token: &str,
    ) -> impl Future<Output = Result<NearbySearchResponse, PlacesError>> + Send;
}

impl PlacesProvider for PlacesClient {
    fn nearby_search(
        &self,
        request: &NearbyRequest,
    ) -> impl Future<Output = Result<NearbySearchResponse, PlacesError>> + Send {
        PlacesClient::nearby_search(self, request)
    }

    fn next_page(
        &self,
        page_token: &str,
    ) -> impl Future<Output = Result<NearbySearchResponse, PlacesError>> + Send {
        PlacesClient::next_page(self, page_token)
    }
}
