//! Scripted backend, locators and a dashboard wired to headless surfaces.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use url::Url;

use shamiran_core::{LocationError, NetworkError};
use shamiran_services::MemoryStorage;
use shamiran_ui::{
    Dashboard, DashboardOptions, DashboardParts, HeadlessMap, HeadlessParticles, HeadlessSurface,
    PageContext,
};
use shamiran_weather::{
    ConditionSummary, Coordinates, CurrentConditions, Geolocator, WeatherBackend, WeatherReply,
};

pub const BASE_URL: &str = "http://localhost:5000/";

/// How the fake backend answers one request.
#[derive(Debug, Clone)]
pub enum Scripted {
    Reply(WeatherReply),
    Offline,
    Panic,
}

impl Scripted {
    fn play(self) -> Result<WeatherReply, NetworkError> {
        match self {
            Scripted::Reply(reply) => Ok(reply),
            Scripted::Offline => Err(NetworkError::ConnectionFailed("connection refused".into())),
            Scripted::Panic => panic!("backend blew up"),
        }
    }
}

pub fn resolved(name: &str, condition: &str) -> Scripted {
    Scripted::Reply(WeatherReply::Resolved(CurrentConditions {
        name: name.to_string(),
        weather: vec![ConditionSummary {
            main: condition.to_string(),
            description: None,
        }],
        formatted_sunrise: Some("06:01".into()),
        formatted_sunset: None,
        coord: Some(Coordinates::new(51.5, -0.12)),
    }))
}

pub fn rejected(message: &str) -> Scripted {
    Scripted::Reply(WeatherReply::Failed(message.to_string()))
}

pub struct FakeBackend {
    cities: Mutex<HashMap<String, (Duration, Scripted)>>,
    coords: Mutex<Scripted>,
    suggestions: Mutex<Option<Vec<String>>>,
    slow_suggestions: Mutex<HashMap<String, (Duration, Vec<String>)>>,
    suggestion_calls: Mutex<Vec<(String, Instant)>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            cities: Mutex::new(HashMap::new()),
            coords: Mutex::new(Scripted::Offline),
            suggestions: Mutex::new(Some(Vec::new())),
            slow_suggestions: Mutex::new(HashMap::new()),
            suggestion_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn city(self, name: &str, reply: Scripted) -> Self {
        self.slow_city(name, Duration::ZERO, reply)
    }

    pub fn slow_city(self, name: &str, delay: Duration, reply: Scripted) -> Self {
        self.cities.lock().insert(name.to_string(), (delay, reply));
        self
    }

    pub fn coords(self, reply: Scripted) -> Self {
        *self.coords.lock() = reply;
        self
    }

    pub fn suggesting(self, names: &[&str]) -> Self {
        *self.suggestions.lock() = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }

    /// Answer `query` with `names`, but only after `delay`.
    pub fn slow_suggestions(self, query: &str, delay: Duration, names: &[&str]) -> Self {
        self.slow_suggestions.lock().insert(
            query.to_string(),
            (delay, names.iter().map(|n| n.to_string()).collect()),
        );
        self
    }

    pub fn suggestions_offline(self) -> Self {
        *self.suggestions.lock() = None;
        self
    }

    pub fn suggestion_calls(&self) -> Vec<(String, Instant)> {
        self.suggestion_calls.lock().clone()
    }
}

#[async_trait]
impl WeatherBackend for FakeBackend {
    async fn weather_by_city(&self, city: &str) -> Result<WeatherReply, NetworkError> {
        let scripted = self.cities.lock().get(city).cloned();
        let (delay, reply) = scripted.unwrap_or((Duration::ZERO, rejected("City not found")));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply.play()
    }

    async fn weather_by_coords(&self, _at: Coordinates) -> Result<WeatherReply, NetworkError> {
        let reply = self.coords.lock().clone();
        reply.play()
    }

    async fn suggestions(&self, query: &str) -> Result<Vec<String>, NetworkError> {
        self.suggestion_calls
            .lock()
            .push((query.to_string(), Instant::now()));

        let slow = self.slow_suggestions.lock().get(query).cloned();
        if let Some((delay, names)) = slow {
            tokio::time::sleep(delay).await;
            return Ok(names);
        }

        let names = self.suggestions.lock().clone();
        names.ok_or_else(|| NetworkError::ServerError {
            status: 503,
            message: "Service Unavailable".into(),
        })
    }
}

/// Always fails with a fixed error.
pub struct FailingLocator(pub LocationError);

#[async_trait]
impl Geolocator for FailingLocator {
    fn is_supported(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(self.0.clone())
    }
}

/// Never answers.
pub struct StalledLocator;

#[async_trait]
impl Geolocator for StalledLocator {
    fn is_supported(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        std::future::pending::<Result<Coordinates, LocationError>>().await
    }
}

pub struct Harness {
    pub dashboard: Arc<Dashboard>,
    pub surface: Arc<HeadlessSurface>,
    pub particles: Arc<HeadlessParticles>,
    pub map: HeadlessMap,
    pub storage: Arc<MemoryStorage>,
    pub backend: Arc<FakeBackend>,
}

pub fn options() -> DashboardOptions {
    let mut options = DashboardOptions::new(Url::parse(BASE_URL).unwrap());
    options.radar_api_key = "radar-key".into();
    options
}

pub fn harness(
    backend: FakeBackend,
    geolocator: Arc<dyn Geolocator>,
    context: PageContext,
) -> Harness {
    harness_with(
        backend,
        geolocator,
        context,
        Arc::new(MemoryStorage::new()),
        options(),
    )
}

/// Must run inside a Tokio runtime.
pub fn harness_with(
    backend: FakeBackend,
    geolocator: Arc<dyn Geolocator>,
    context: PageContext,
    storage: Arc<MemoryStorage>,
    options: DashboardOptions,
) -> Harness {
    let surface = Arc::new(HeadlessSurface::new());
    let particles = Arc::new(HeadlessParticles::new());
    let map = HeadlessMap::with_container("weather-map");
    let backend = Arc::new(backend);

    let dashboard = Dashboard::new(
        DashboardParts {
            surface: surface.clone(),
            backend: backend.clone(),
            geolocator,
            storage: storage.clone(),
            particles: particles.clone(),
            map: Box::new(map.clone()),
        },
        options,
        context,
    )
    .unwrap();

    Harness {
        dashboard: Arc::new(dashboard),
        surface,
        particles,
        map,
        storage,
        backend,
    }
}
