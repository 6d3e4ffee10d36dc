//! Coarse positioning from the public IP address.
//!
//! Talks to an ip-api.com compatible endpoint returning
//! `{"status": "success", "lat": .., "lon": ..}` on success and
//! `{"status": "fail", "message": ..}` otherwise.

use std::future::Future;
use std::time::Duration;

use cafe_core::Coordinate;
use reqwest::Client;
use serde::Deserialize;

use crate::error::LocateFailure;
use crate::source::LocationSource;

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

pub struct IpLocationSource {
    client: Client,
    url: String,
}

impl IpLocationSource {
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be constructed.
    pub fn new(url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            url: url.to_owned(),
        })
    }

    async fn lookup(&self) -> Result<Coordinate, LocateFailure> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(map_http_error)?;
        let body: IpLookupResponse = response
            .json()
            .await
            .map_err(|e| LocateFailure::Unavailable(format!("malformed lookup response: {e}")))?;

        if body.status != "success" {
            let reason = body.message.unwrap_or(body.status);
            return Err(LocateFailure::Unavailable(reason));
        }
        let (Some(lat), Some(lon)) = (body.lat, body.lon) else {
            return Err(LocateFailure::Unavailable(
                "lookup response missing coordinates".to_string(),
            ));
        };
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(LocateFailure::Unavailable(format!(
                "lookup returned out-of-range coordinate {lat},{lon}"
            )));
        }
        Ok(Coordinate::new(lat, lon))
    }
}

fn map_http_error(err: reqwest::Error) -> LocateFailure {
    if err.is_timeout() {
        LocateFailure::Timeout
    } else {
        LocateFailure::Unavailable(err.to_string())
    }
}

impl LocationSource for IpLocationSource {
    fn current_position(&self) -> impl Future<Output = Result<Coordinate, LocateFailure>> + Send {
        self.lookup()
    }
}
