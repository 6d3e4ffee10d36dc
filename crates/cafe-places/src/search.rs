//! Nearby cafe search with a fallback strategy chain.
//!
//! A search walks up to three provider queries, most specific first:
//!
//! | Strategy   | Request                                                     |
//! |------------|-------------------------------------------------------------|
//! | `Category` | `type=cafe`, `keyword=<query or "coffee">`                  |
//! | `Keyword`  | `keyword="<query> cafe coffee"` (or `"cafe coffee shop"`)   |
//! | `Name`     | `name=<query or "cafe">`                                    |
//!
//! The first strategy that yields usable results ends the chain. Denied and
//! over-quota responses abort the whole search at once; every other failure
//! moves on to the next strategy after a short pause. Strategies never overlap:
//! each one is awaited to completion before the next is issued.

use std::time::Duration;

use cafe_core::view::{Remediation, RemediationAction};
use cafe_core::{CafeRecord, Coordinate};
use thiserror::Error;

use crate::error::PlacesError;
use crate::normalize::normalize_results;
use crate::provider::PlacesProvider;
use crate::types::{NearbyRequest, NearbySearchResponse, PlacesStatus};

const CREDENTIALS_URL: &str = "https://console.cloud.google.com/apis/credentials";
const BILLING_URL: &str = "https://console.cloud.google.com/billing";
/// Radius suggested when a search comes back empty.
const EXPANDED_RADIUS_KM: f64 = 5.0;

/// One query shape in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Category,
    Keyword,
    Name,
}

impl Strategy {
    pub const FIRST: Strategy = Strategy::Category;

    /// The strategy to try after this one, if any.
    #[must_use]
    pub fn next(self) -> Option<Strategy> {
        match self {
            Strategy::Category => Some(Strategy::Keyword),
            Strategy::Keyword => Some(Strategy::Name),
            Strategy::Name => None,
        }
    }

    /// 1-based position in the chain.
    #[must_use]
    pub fn ordinal(self) -> u8 {
        match self {
            Strategy::Category => 1,
            Strategy::Keyword => 2,
            Strategy::Name => 3,
        }
    }

    /// Builds this strategy's provider request for `query_text`.
    #[must_use]
    pub fn request(self, origin: Coordinate, radius_km: f64, query_text: &str) -> NearbyRequest {
        let query = query_text.trim();
        let (place_type, keyword, name) = match self {
            Strategy::Category => (
                Some("cafe".to_string()),
                Some(or_default(query, "coffee")),
                None,
            ),
            Strategy::Keyword => {
                let keyword = if query.is_empty() {
                    "cafe coffee shop".to_string()
                } else {
                    format!("{query} cafe coffee")
                };
                (None, Some(keyword), None)
            }
            Strategy::Name => (None, None, Some(or_default(query, "cafe"))),
        };
        NearbyRequest {
            origin,
            radius_km,
            place_type,
            keyword,
            name,
        }
    }
}

fn or_default(query: &str, default: &str) -> String {
    if query.is_empty() {
        default.to_string()
    } else {
        query.to_string()
    }
}

/// Why a search produced no cafes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The provider found nothing for any strategy.
    #[error("no cafes found nearby")]
    ZeroResults,

    /// The provider rejected the API key (`REQUEST_DENIED`).
    #[error("places request denied: {message}")]
    Unauthorized { message: String },

    /// The API quota is used up (`OVER_QUERY_LIMIT`).
    #[error("places quota exceeded: {message}")]
    QuotaExceeded { message: String },

    /// Every strategy failed on a retryable status or network error.
    #[error("places provider unavailable (last status: {status})")]
    Transient { status: String },
}

impl SearchError {
    /// Terminal errors must not be retried automatically.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SearchError::Unauthorized { .. } | SearchError::QuotaExceeded { .. }
        )
    }

    /// Error panel content with concrete next steps for the user.
    #[must_use]
    pub fn remediation(&self) -> Remediation {
        match self {
            SearchError::Unauthorized { message } => Remediation {
                title: "API Key Issue".to_string(),
                message: format!("Your Places API key needs configuration ({message})."),
                steps: vec![
                    "Open the Google Cloud Console credentials page".to_string(),
                    "Select your project and enable the Places API".to_string(),
                    "Under \"API restrictions\" allow the Places API for this key".to_string(),
                    "Save, wait a few minutes, then retry".to_string(),
                ],
                actions: vec![
                    RemediationAction::Retry,
                    RemediationAction::OpenUrl {
                        label: "Fix API key".to_string(),
                        url: CREDENTIALS_URL.to_string(),
                    },
                ],
                results_label: "API Error".to_string(),
            },
            SearchError::QuotaExceeded { message } => Remediation {
                title: "Quota Exceeded".to_string(),
                message: format!("You've reached your API quota limit ({message})."),
                steps: vec![
                    "Wait for the daily quota to reset".to_string(),
                    "Enable billing in the Google Cloud Console".to_string(),
                    "Increase the quota limits for the Places API".to_string(),
                ],
                actions: vec![RemediationAction::OpenUrl {
                    label: "Set up billing".to_string(),
                    url: BILLING_URL.to_string(),
                }],
                results_label: "Quota Error".to_string(),
            },
            SearchError::ZeroResults | SearchError::Transient { .. } => {
                let (title, message) = if let SearchError::Transient { status } = self {
                    (
                        "Something went wrong",
                        format!("Unable to search for cafes right now (last status: {status})."),
                    )
                } else {
                    (
                        "No Cafes Found",
                        "No cafes found in this area with your current filters.".to_string(),
                    )
                };
                Remediation {
                    title: title.to_string(),
                    message,
                    steps: vec![],
                    actions: vec![
                        RemediationAction::ExpandRadius {
                            radius_km: EXPANDED_RADIUS_KM,
                        },
                        RemediationAction::ClearFilters,
                        RemediationAction::Retry,
                    ],
                    results_label: "Error".to_string(),
                }
            }
        }
    }
}

/// Pacing and pagination limits for [`SearchOrchestrator`].
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Pause between a failed strategy and the next one.
    pub strategy_delay: Duration,
    /// Pause before fetching a continuation page; the provider rejects page
    /// tokens used too soon after they are issued.
    pub page_delay: Duration,
    /// Stop paginating once this many records are accumulated.
    pub max_results: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            strategy_delay: Duration::from_millis(500),
            page_delay: Duration::from_millis(1200),
            max_results: 40,
        }
    }
}

/// How a single strategy attempt ended.
enum Attempt {
    Found(Vec<CafeRecord>),
    /// Authoritative "nothing here".
    Empty,
    /// Retryable status or network failure.
    Failed(String),
    /// Denied or over quota; the chain stops.
    Abort(SearchError),
}

enum State {
    Trying(Strategy),
    Done(Result<Vec<CafeRecord>, SearchError>),
}

/// Drives the strategy chain and pagination against a [`PlacesProvider`].
pub struct SearchOrchestrator<P> {
    provider: P,
    options: SearchOptions,
}

impl<P: PlacesProvider> SearchOrchestrator<P> {
    pub fn new(provider: P, options: SearchOptions) -> Self {
        Self { provider, options }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Searches for cafes within `radius_km` of `origin`.
    ///
    /// Each returned record carries its distance from `origin`. Results are in
    /// provider order, de-duplicated by `place_id`.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Unauthorized`] / [`SearchError::QuotaExceeded`] as soon
    ///   as the provider reports them; later strategies are not tried.
    /// - [`SearchError::ZeroResults`] when the chain is exhausted and at least
    ///   one strategy got an authoritative empty answer.
    /// - [`SearchError::Transient`] when every strategy failed otherwise.
    pub async fn search(
        &self,
        origin: Coordinate,
        radius_km: f64,
        query_text: &str,
    ) -> Result<Vec<CafeRecord>, SearchError> {
        let mut saw_empty = false;
        let mut last_failure = String::new();
        let mut state = State::Trying(Strategy::FIRST);

        loop {
            let strategy = match state {
                State::Trying(strategy) => strategy,
                State::Done(result) => return result,
            };

            let request = strategy.request(origin, radius_km, query_text);
            tracing::debug!(
                strategy = strategy.ordinal(),
                place_type = ?request.place_type,
                keyword = ?request.keyword,
                name = ?request.name,
                radius_m = request.radius_meters(),
                "trying search strategy"
            );
            let attempt = self.attempt(&request).await;

            state = match attempt {
                Attempt::Found(records) => {
                    tracing::info!(
                        strategy = strategy.ordinal(),
                        count = records.len(),
                        "search found cafes"
                    );
                    State::Done(Ok(records))
                }
                Attempt::Abort(err) => {
                    tracing::warn!(strategy = strategy.ordinal(), error = %err, "search aborted");
                    State::Done(Err(err))
                }
                Attempt::Empty => {
                    saw_empty = true;
                    self.advance(strategy, saw_empty, &last_failure).await
                }
                Attempt::Failed(status) => {
                    last_failure = status;
                    self.advance(strategy, saw_empty, &last_failure).await
                }
            };
        }
    }

    /// Moves past a strategy that found nothing, pausing before the next one.
    async fn advance(&self, current: Strategy, saw_empty: bool, last_failure: &str) -> State {
        match current.next() {
            Some(next) => {
                tokio::time::sleep(self.options.strategy_delay).await;
                State::Trying(next)
            }
            None if saw_empty => State::Done(Err(SearchError::ZeroResults)),
            None => State::Done(Err(SearchError::Transient {
                status: last_failure.to_string(),
            })),
        }
    }

    async fn attempt(&self, request: &NearbyRequest) -> Attempt {
        let response = match self.provider.nearby_search(request).await {
            Ok(response) => response,
            Err(err) => return Attempt::Failed(describe_failure(&err)),
        };
        let message = response
            .error_message
            .clone()
            .unwrap_or_else(|| response.status.to_string());

        match response.status {
            PlacesStatus::Ok => {
                let records = self.collect_pages(response, &request.origin).await;
                if records.is_empty() {
                    Attempt::Empty
                } else {
                    Attempt::Found(records)
                }
            }
            PlacesStatus::ZeroResults => Attempt::Empty,
            PlacesStatus::RequestDenied => Attempt::Abort(SearchError::Unauthorized { message }),
            PlacesStatus::OverQueryLimit => Attempt::Abort(SearchError::QuotaExceeded { message }),
            other => {
                tracing::debug!(status = %other, "strategy failed with retryable status");
                Attempt::Failed(other.to_string())
            }
        }
    }

    /// Normalizes the first page and follows continuation tokens until the
    /// result cap is reached or the provider stops offering pages.
    async fn collect_pages(
        &self,
        first: NearbySearchResponse,
        origin: &Coordinate,
    ) -> Vec<CafeRecord> {
        let mut records = Vec::new();
        normalize_results(&first.results, origin, &mut records);
        let mut token = first.next_page_token;

        while let Some(page_token) = token.take() {
            if records.is_empty() || records.len() >= self.options.max_results {
                break;
            }
            tokio::time::sleep(self.options.page_delay).await;
            match self.provider.next_page(&page_token).await {
                Ok(page) if page.status == PlacesStatus::Ok => {
                    let added = normalize_results(&page.results, origin, &mut records);
                    tracing::debug!(added, total = records.len(), "loaded additional results");
                    token = page.next_page_token;
                }
                Ok(page) => {
                    tracing::warn!(
                        status = %page.status,
                        "next page unavailable; keeping results so far"
                    );
                }
                Err(err) => {
                    tracing::warn!(error = %err, "next page fetch failed; keeping results so far");
                }
            }
        }
        records
    }
}

fn describe_failure(err: &PlacesError) -> String {
    match err {
        PlacesError::Http(e) => match e.status() {
            Some(status) => format!("HTTP {}", status.as_u16()),
            None if e.is_timeout() => "TIMEOUT".to_string(),
            None => "NETWORK_ERROR".to_string(),
        },
        PlacesError::Deserialize { .. } => "MALFORMED_RESPONSE".to_string(),
        PlacesError::InvalidBaseUrl { .. } => "INVALID_BASE_URL".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::Mutex;

    use tokio::time::Instant;

    use super::*;

    const ORIGIN: Coordinate = Coordinate::new(19.0760, 72.8777);

    /// Replays canned responses and records when each call arrived.
    struct ScriptedProvider {
        responses: Mutex<VecDeque<NearbySearchResponse>>,
        calls: Mutex<Vec<(Instant, String)>>,
    }

    impl ScriptedProvider {
        fn new(bodies: Vec<serde_json::Value>) -> Self {
            let responses = bodies
                .into_iter()
                .map(|b| serde_json::from_value(b).unwrap())
                .collect();
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn next(&self, label: String) -> Result<NearbySearchResponse, PlacesError> {
            self.calls.lock().unwrap().push((Instant::now(), label));
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected provider call"))
        }

        fn call_offsets(&self, start: Instant) -> Vec<(Duration, String)> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(at, label)| (at.duration_since(start), label.clone()))
                .collect()
        }
    }

    impl PlacesProvider for ScriptedProvider {
        fn nearby_search(
            &self,
            request: &NearbyRequest,
        ) -> impl Future<Output = Result<NearbySearchResponse, PlacesError>> + Send {
            let label = if request.place_type.is_some() {
                "category"
            } else if request.name.is_some() {
                "name"
            } else {
                "keyword"
            };
            let result = self.next(label.to_string());
            async move { result }
        }

        fn next_page(
            &self,
            page_token: &str,
        ) -> impl Future<Output = Result<NearbySearchResponse, PlacesError>> + Send {
            let result = self.next(format!("page:{page_token}"));
            async move { result }
        }
    }

    fn place(id: &str) -> serde_json::Value {
        serde_json::json!({
            "place_id": id,
            "name": id,
            "geometry": { "location": { "lat": 19.08, "lng": 72.88 } }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn strategies_are_sequential_and_paced() {
        let provider = ScriptedProvider::new(vec![
            serde_json::json!({ "status": "ZERO_RESULTS" }),
            serde_json::json!({ "status": "UNKNOWN_ERROR" }),
            serde_json::json!({ "status": "OK", "results": [place("n1")] }),
        ]);
        let orchestrator = SearchOrchestrator::new(provider, SearchOptions::default());
        let start = Instant::now();

        let records = orchestrator.search(ORIGIN, 2.0, "latte").await.unwrap();
        assert_eq!(records.len(), 1);

        let calls = orchestrator.provider().call_offsets(start);
        assert_eq!(
            calls,
            vec![
                (Duration::ZERO, "category".to_string()),
                (Duration::from_millis(500), "keyword".to_string()),
                (Duration::from_millis(1000), "name".to_string()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn next_page_waits_for_token_to_activate() {
        let provider = ScriptedProvider::new(vec![
            serde_json::json!({ "status": "OK", "results": [place("a")], "next_page_token": "t1" }),
            serde_json::json!({ "status": "OK", "results": [place("b")] }),
        ]);
        let orchestrator = SearchOrchestrator::new(provider, SearchOptions::default());
        let start = Instant::now();

        let records = orchestrator.search(ORIGIN, 2.0, "").await.unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.place_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let calls = orchestrator.provider().call_offsets(start);
        assert_eq!(calls[1], (Duration::from_millis(1200), "page:t1".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn denial_is_immediate() {
        let provider = ScriptedProvider::new(vec![
            serde_json::json!({ "status": "REQUEST_DENIED", "error_message": "bad key" }),
        ]);
        let orchestrator = SearchOrchestrator::new(provider, SearchOptions::default());
        let err = orchestrator.search(ORIGIN, 2.0, "").await.unwrap_err();
        assert_eq!(
            err,
            SearchError::Unauthorized {
                message: "bad key".to_string()
            }
        );
        assert_eq!(orchestrator.provider().call_offsets(Instant::now()).len(), 1);
    }

    #[test]
    fn chain_order_is_category_keyword_name() {
        let mut order = vec![Strategy::FIRST];
        while let Some(next) = order.last().and_then(|s| s.next()) {
            order.push(next);
        }
        assert_eq!(order, vec![Strategy::Category, Strategy::Keyword, Strategy::Name]);
        let ordinals: Vec<u8> = order.iter().map(|s| s.ordinal()).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
    }

    #[test]
    fn requests_for_empty_query_use_defaults() {
        let r1 = Strategy::Category.request(ORIGIN, 2.0, "  ");
        assert_eq!(r1.place_type.as_deref(), Some("cafe"));
        assert_eq!(r1.keyword.as_deref(), Some("coffee"));
        assert_eq!(r1.name, None);

        let r2 = Strategy::Keyword.request(ORIGIN, 2.0, "");
        assert_eq!(r2.place_type, None);
        assert_eq!(r2.keyword.as_deref(), Some("cafe coffee shop"));

        let r3 = Strategy::Name.request(ORIGIN, 2.0, "");
        assert_eq!(r3.keyword, None);
        assert_eq!(r3.name.as_deref(), Some("cafe"));
    }

    #[test]
    fn requests_embed_query_text() {
        let r1 = Strategy::Category.request(ORIGIN, 2.0, " espresso ");
        assert_eq!(r1.keyword.as_deref(), Some("espresso"));
        let r2 = Strategy::Keyword.request(ORIGIN, 2.0, "espresso");
        assert_eq!(r2.keyword.as_deref(), Some("espresso cafe coffee"));
        let r3 = Strategy::Name.request(ORIGIN, 2.0, "espresso");
        assert_eq!(r3.name.as_deref(), Some("espresso"));
        assert!((r3.radius_km - 2.0).abs() < f64::EPSILON);
        assert_eq!(r3.origin, ORIGIN);
    }

    #[test]
    fn only_auth_and_quota_are_terminal() {
        assert!(SearchError::Unauthorized {
            message: String::new()
        }
        .is_terminal());
        assert!(SearchError::QuotaExceeded {
            message: String::new()
        }
        .is_terminal());
        assert!(!SearchError::ZeroResults.is_terminal());
        assert!(!SearchError::Transient {
            status: "UNKNOWN_ERROR".into()
        }
        .is_terminal());
    }

    #[test]
    fn every_error_offers_an_action() {
        let errors = [
            SearchError::ZeroResults,
            SearchError::Transient {
                status: "UNKNOWN_ERROR".into(),
            },
            SearchError::Unauthorized {
                message: "bad key".into(),
            },
            SearchError::QuotaExceeded {
                message: "limit".into(),
            },
        ];
        for err in errors {
            assert!(!err.remediation().actions.is_empty(), "{err} has no action");
        }
    }

    #[test]
    fn unauthorized_remediation_links_credentials() {
        let r = SearchError::Unauthorized {
            message: "key invalid".into(),
        }
        .remediation();
        assert_eq!(r.results_label, "API Error");
        assert!(r.actions.iter().any(|a| matches!(
            a,
            RemediationAction::OpenUrl { url, .. } if url == CREDENTIALS_URL
        )));
    }

    #[test]
    fn zero_results_suggests_wider_radius() {
        let r = SearchError::ZeroResults.remediation();
        assert!(r.actions.contains(&RemediationAction::ExpandRadius { radius_km: 5.0 }));
        assert!(r.actions.contains(&RemediationAction::ClearFilters));
    }
}
