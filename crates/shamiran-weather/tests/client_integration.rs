//! Integration tests for WeatherClient using wiremock.

use std::time::Duration;

use shamiran_core::NetworkError;
use shamiran_weather::{Coordinates, WeatherBackend, WeatherClient, WeatherReply};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn current(name: &str, main: &str) -> serde_json::Value {
    serde_json::json!({
        "error": null,
        "current": {
            "name": name,
            "weather": [{"main": main, "description": "whatever"}],
            "formatted_sunrise": "05:40 AM",
            "formatted_sunset": "06:12 PM",
            "coord": {"lat": 23.71, "lon": 90.41}
        },
        "forecast": {"list": []}
    })
}

fn client(server: &MockServer) -> WeatherClient {
    WeatherClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_weather_by_city_resolves() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("city", "Dhaka"))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current("Dhaka", "Haze")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let reply = client(&mock_server).weather_by_city("Dhaka").await.unwrap();

    match reply {
        WeatherReply::Resolved(current) => {
            assert_eq!(current.name, "Dhaka");
            assert_eq!(current.primary_condition(), "Haze");
            assert_eq!(current.sunset_text(), "06:12 PM");
        }
        other => panic!("unexpected reply: {other:?}"),
    }
}

#[tokio::test]
async fn test_weather_by_city_domain_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("city", "Paris"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"error": "City not found"})),
        )
        .mount(&mock_server)
        .await;

    let reply = client(&mock_server).weather_by_city("Paris").await.unwrap();
    assert_eq!(reply, WeatherReply::Failed("City not found".to_string()));
}

#[tokio::test]
async fn test_error_status_with_message_is_domain_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({"error": "City 'Atlantis' not found."})),
        )
        .mount(&mock_server)
        .await;

    let reply = client(&mock_server).weather_by_city("Atlantis").await.unwrap();
    assert_eq!(
        reply,
        WeatherReply::Failed("City 'Atlantis' not found.".to_string())
    );
}

#[tokio::test]
async fn test_server_error_without_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server).weather_by_city("Dhaka").await.unwrap_err();
    assert!(matches!(err, NetworkError::ServerError { status: 500, .. }));
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server).weather_by_city("Dhaka").await.unwrap_err();
    assert!(matches!(err, NetworkError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_weather_by_coords_sends_lat_lon() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather-by-coords"))
        .and(query_param("lat", "23.81"))
        .and(query_param("lon", "90.41"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current("Dhaka", "Clouds")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let reply = client(&mock_server)
        .weather_by_coords(Coordinates::new(23.81, 90.41))
        .await
        .unwrap();
    assert!(matches!(reply, WeatherReply::Resolved(_)));
}

#[tokio::test]
async fn test_suggestions() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search-suggestions"))
        .and(query_param("q", "Ch"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!(["Chittagong", "Chandpur", "Chuadanga"])),
        )
        .mount(&mock_server)
        .await;

    let names = client(&mock_server).suggestions("Ch").await.unwrap();
    assert_eq!(names, vec!["Chittagong", "Chandpur", "Chuadanga"]);
}

#[tokio::test]
async fn test_suggestions_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search-suggestions"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server).suggestions("Ch").await.unwrap_err();
    assert!(matches!(err, NetworkError::ServerError { status: 503, .. }));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Bind then drop a server so the port is closed
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let client = WeatherClient::new(&uri, Duration::from_secs(2)).unwrap();
    let err = client.weather_by_city("Dhaka").await.unwrap_err();
    assert!(matches!(
        err,
        NetworkError::ConnectionFailed(_) | NetworkError::Timeout
    ));
}
