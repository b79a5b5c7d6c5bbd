//! HTTP client for the dashboard's backend endpoints.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use shamiran_core::{ConfigError, NetworkError, ReqwestErrorExt};

use crate::types::{Coordinates, ReplyBody, WeatherReply};

/// Marks requests as script-initiated so the server answers with JSON
/// instead of a rendered page.
const REQUESTED_WITH: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");

/// The three queries the dashboard makes against its backend.
#[async_trait]
pub trait WeatherBackend: Send + Sync {
    /// `GET /weather?city=<city>`
    async fn weather_by_city(&self, city: &str) -> Result<WeatherReply, NetworkError>;

    /// `GET /weather-by-coords?lat=<lat>&lon=<lon>`
    async fn weather_by_coords(&self, at: Coordinates) -> Result<WeatherReply, NetworkError>;

    /// `GET /api/search-suggestions?q=<query>`
    async fn suggestions(&self, query: &str) -> Result<Vec<String>, NetworkError>;
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Arc<Client>,
    base_url: Url,
}

impl WeatherClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Invalid(format!("HTTP client: {e}")))?;

        Ok(Self {
            client: Arc::new(client),
            base_url,
        })
    }

    /// Address of the server-rendered results page for a city.
    pub fn results_page_url(&self, city: &str) -> Url {
        results_page_url(&self.base_url, city)
    }

    fn endpoint(&self, path: &str) -> Url {
        endpoint(&self.base_url, path)
    }

    async fn fetch_reply(&self, url: Url) -> Result<WeatherReply, NetworkError> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(REQUESTED_WITH.0, REQUESTED_WITH.1)
            .send()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        match serde_json::from_slice::<ReplyBody>(&bytes) {
            Ok(body) if status.is_success() => body.into_reply(),
            // Error pages that still carry an `error` message are domain errors
            Ok(ReplyBody {
                error: Some(message),
                ..
            }) if !message.is_empty() => Ok(WeatherReply::Failed(message)),
            Ok(_) => Err(server_error(status)),
            Err(e) if status.is_success() => Err(NetworkError::InvalidResponse(e.to_string())),
            Err(_) => Err(server_error(status)),
        }
    }
}

/// Parse the backend base URL, normalized to end in '/'.
pub fn parse_base_url(base_url: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ConfigError::Invalid(format!("backend URL {base_url}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::Invalid(format!(
            "backend URL {base_url}: cannot carry a path"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// `<base>/weather?city=<city>`, the page a resolved search navigates to.
pub fn results_page_url(base_url: &Url, city: &str) -> Url {
    let mut url = endpoint(base_url, "weather");
    url.query_pairs_mut().append_pair("city", city);
    url
}

fn endpoint(base_url: &Url, path: &str) -> Url {
    let mut url = base_url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().extend(path.split('/'));
    }
    url
}

fn server_error(status: StatusCode) -> NetworkError {
    NetworkError::ServerError {
        status: status.as_u16(),
        message: status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string(),
    }
}

#[async_trait]
impl WeatherBackend for WeatherClient {
    async fn weather_by_city(&self, city: &str) -> Result<WeatherReply, NetworkError> {
        let mut url = self.endpoint("weather");
        url.query_pairs_mut().append_pair("city", city);
        self.fetch_reply(url).await
    }

    async fn weather_by_coords(&self, at: Coordinates) -> Result<WeatherReply, NetworkError> {
        let mut url = self.endpoint("weather-by-coords");
        url.query_pairs_mut()
            .append_pair("lat", &at.lat.to_string())
            .append_pair("lon", &at.lon.to_string());
        self.fetch_reply(url).await
    }

    async fn suggestions(&self, query: &str) -> Result<Vec<String>, NetworkError> {
        let mut url = self.endpoint("api/search-suggestions");
        url.query_pairs_mut().append_pair("q", query);

        let response = self
            .client
            .get(url)
            .header(REQUESTED_WITH.0, REQUESTED_WITH.1)
            .send()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        if !response.status().is_success() {
            return Err(server_error(response.status()));
        }

        response
            .json::<Vec<String>>()
            .await
            .map_err(ReqwestErrorExt::into_network_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> WeatherClient {
        WeatherClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(WeatherClient::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_base_url_gains_trailing_slash() {
        let url = parse_base_url("https://example.com/dashboard").unwrap();
        assert_eq!(url.path(), "/dashboard/");
        assert!(parse_base_url("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_results_page_url_encodes_city() {
        let url = client("http://localhost:5000").results_page_url("Cox's Bazar");
        assert_eq!(url.path(), "/weather");
        assert_eq!(url.query(), Some("city=Cox%27s+Bazar"));
    }

    #[test]
    fn test_endpoints_respect_base_path() {
        let c = client("https://example.com/dashboard");
        assert_eq!(c.endpoint("weather").as_str(), "https://example.com/dashboard/weather");
        assert_eq!(
            c.endpoint("api/search-suggestions").as_str(),
            "https://example.com/dashboard/api/search-suggestions"
        );
    }
}
