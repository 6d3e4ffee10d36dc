//! HTTP client for the places provider's Nearby Search endpoint.
//!
//! Wraps `reqwest` with API key handling, retry on transient network errors
//! and typed response deserialization. Provider-level failures are not errors
//! here: they come back as a [`PlacesStatus`] inside the response for the
//! search strategy to interpret.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::PlacesError;
use crate::retry::retry_with_backoff;
use crate::types::{NearbyRequest, NearbySearchResponse};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place/";
const NEARBY_SEARCH_PATH: &str = "nearbysearch/json";

/// Client for the places Nearby Search API.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl PlacesClient {
    /// Creates a client pointed at the production provider.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // A trailing slash makes `Url::join` append to the path instead of
        // replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Enables retries of transient network failures.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Runs one nearby search and returns the provider's response as-is.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status,
    ///   after retries are exhausted.
    /// - [`PlacesError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn nearby_search(
        &self,
        request: &NearbyRequest,
    ) -> Result<NearbySearchResponse, PlacesError> {
        let location = format!("{},{}", request.origin.latitude, request.origin.longitude);
        let radius = request.radius_meters().to_string();
        let mut params = vec![("location", location.as_str()), ("radius", radius.as_str())];
        if let Some(place_type) = request.place_type.as_deref() {
            params.push(("type", place_type));
        }
        if let Some(keyword) = request.keyword.as_deref() {
            params.push(("keyword", keyword));
        }
        if let Some(name) = request.name.as_deref() {
            params.push(("name", name));
        }

        let url = self.build_url(&params)?;
        self.fetch(&url).await
    }

    /// Fetches the continuation page identified by `page_token`.
    ///
    /// # Errors
    ///
    /// Same as [`PlacesClient::nearby_search`].
    pub async fn next_page(&self, page_token: &str) -> Result<NearbySearchResponse, PlacesError> {
        let url = self.build_url(&[("pagetoken", page_token)])?;
        self.fetch(&url).await
    }

    /// Builds the endpoint URL with percent-encoded query parameters,
    /// the API key first.
    fn build_url(&self, extra: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(NEARBY_SEARCH_PATH)
            .map_err(|e| PlacesError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn fetch(&self, url: &Url) -> Result<NearbySearchResponse, PlacesError> {
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_text(url)
        })
        .await?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: redact_key(url),
            source: e,
        })
    }

    /// Sends a GET request, asserts a 2xx HTTP status and returns the body.
    ///
    /// The request URL carries the API key, so it is stripped from every
    /// error before the error can reach a log line.
    async fn request_text(&self, url: &Url) -> Result<String, PlacesError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(without_url)?;
        let response = response.error_for_status().map_err(without_url)?;
        response.text().await.map_err(without_url)
    }
}

fn without_url(err: reqwest::Error) -> PlacesError {
    PlacesError::Http(err.without_url())
}

/// Renders `url` for diagnostics with the API key masked.
fn redact_key(url: &Url) -> String {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "key" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}
