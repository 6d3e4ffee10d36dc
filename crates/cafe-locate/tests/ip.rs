//! Integration tests for `IpLocationSource` and the locator fallback path,
//! using wiremock HTTP mocks.

use std::time::Duration;

use cafe_core::Coordinate;
use cafe_locate::{FixStatus, GeoLocator, IpLocationSource, LocateFailure, LocationSource};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const FALLBACK: Coordinate = Coordinate::new(19.076, 72.8777);

fn source(server: &MockServer) -> IpLocationSource {
    IpLocationSource::new(&format!("{}/json", server.uri()), 5, "cafe-finder-test")
        .expect("client construction should not fail")
}

#[tokio::test]
async fn success_response_yields_coordinate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "country": "India",
            "city": "Pune",
            "lat": 18.5204,
            "lon": 73.8567
        })))
        .expect(1)
        .mount(&server)
        .await;

    let position = source(&server).current_position().await;
    assert_eq!(position, Ok(Coordinate::new(18.5204, 73.8567)));
}

#[tokio::test]
async fn fail_status_is_unavailable_with_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "fail",
            "message": "private range"
        })))
        .mount(&server)
        .await;

    let position = source(&server).current_position().await;
    assert_eq!(
        position,
        Err(LocateFailure::Unavailable("private range".to_string()))
    );
}

#[tokio::test]
async fn http_error_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let position = source(&server).current_position().await;
    assert!(matches!(position, Err(LocateFailure::Unavailable(_))));
}

#[tokio::test]
async fn slow_lookup_times_out_in_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "success", "lat": 1.0, "lon": 2.0 }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let slow = IpLocationSource::new(&server.uri(), 1, "cafe-finder-test").unwrap();
    assert_eq!(slow.current_position().await, Err(LocateFailure::Timeout));
}

#[tokio::test]
async fn locator_falls_back_when_lookup_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "fail",
            "message": "reserved range"
        })))
        .mount(&server)
        .await;

    let geo = GeoLocator::new(
        source(&server),
        Duration::from_secs(15),
        Duration::from_secs(300),
        FALLBACK,
    );
    let fix = geo.locate().await;
    assert_eq!(fix.coordinate, FALLBACK);
    assert!(matches!(
        fix.status,
        FixStatus::Fallback(LocateFailure::Unavailable(_))
    ));
}
