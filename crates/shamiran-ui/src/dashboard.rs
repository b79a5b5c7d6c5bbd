//! Dashboard controller: the page's event handlers.
//!
//! Every user action (search, locate, favorite, theme, map) lands here and
//! is turned into backend calls plus updates to the [`Surface`]. Weather
//! requests are ordered by a [`RequestSequencer`]: a reply that arrives
//! after a newer request was issued is dropped without touching the page.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use url::Url;

use shamiran_core::{
    AppError, Config, ConfigError, LocationError, MapError, RequestSequencer, StorageError,
};
use shamiran_services::{FavoritesStore, KeyValueStore, Theme, ThemeManager};
use shamiran_weather::{
    locate_with_timeout, parse_base_url, results_page_url, Coordinates, Geolocator,
    WeatherBackend, WeatherReply,
};

use crate::map::{MapEngine, MapOverlay};
use crate::particles::{AnimationStatus, ParticleLayer, ParticleManager};
use crate::suggestions::SuggestionFetcher;
use crate::surface::{background_class, Content, FavoriteIndicator, Surface};

pub const LOADING_TEXT: &str = "Loading...";
pub const LOCATING_TEXT: &str = "Getting your location...";
pub const NETWORK_ERROR_TEXT: &str = "A network error occurred. Please try again.";
pub const LOCATION_FETCH_ERROR_TEXT: &str = "Could not fetch weather for your location.";

/// Condition restored after a failed search.
pub const FALLBACK_CONDITION: &str = "clouds";

/// Element id of the map container.
pub const MAP_CONTAINER: &str = "weather-map";

/// What the server rendered into the page on load.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContext {
    pub city: String,
    pub condition: String,
    pub coordinates: Option<Coordinates>,
}

impl PageContext {
    pub fn new(city: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            condition: condition.into(),
            coordinates: None,
        }
    }

    pub fn with_coordinates(mut self, at: Coordinates) -> Self {
        self.coordinates = Some(at);
        self
    }
}

/// Tunables, normally taken from [`Config`].
#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub base_url: Url,
    pub debounce: Duration,
    pub min_query_len: usize,
    pub geolocation_timeout: Duration,
    pub radar_api_key: String,
    pub map_zoom: u8,
    pub animation_enabled: bool,
    /// Theme used when none was saved
    pub system_theme: Theme,
}

impl DashboardOptions {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            debounce: Duration::from_millis(300),
            min_query_len: 2,
            geolocation_timeout: Duration::from_secs(10),
            radar_api_key: String::new(),
            map_zoom: 10,
            animation_enabled: true,
            system_theme: Theme::Light,
        }
    }

    /// # Errors
    /// Returns an error if the backend URL does not parse.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(&config.backend.base_url)?,
            debounce: Duration::from_millis(config.suggestions.debounce_ms),
            min_query_len: config.suggestions.min_query_len,
            geolocation_timeout: Duration::from_secs(config.geolocation.timeout_secs),
            radar_api_key: config.map.radar_api_key.clone(),
            map_zoom: config.map.zoom,
            animation_enabled: config.animation.enabled,
            system_theme: Theme::from_dark(config.ui.prefer_dark),
        })
    }
}

/// The collaborators a dashboard drives.
pub struct DashboardParts {
    pub surface: Arc<dyn Surface>,
    pub backend: Arc<dyn WeatherBackend>,
    pub geolocator: Arc<dyn Geolocator>,
    pub storage: Arc<dyn KeyValueStore>,
    pub particles: Arc<dyn ParticleLayer>,
    pub map: Box<dyn MapEngine>,
}

/// How a search or locate request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Empty input, nothing was sent
    Ignored,
    /// Resolved; the page moved to this URL
    Navigated(String),
    /// The backend answered with an error message
    Rejected(String),
    /// The request never produced a usable reply
    NetworkFailure,
    /// No position could be obtained
    LocationFailed(LocationError),
    /// A newer request was issued before this one finished
    Superseded,
}

struct PageState {
    city: String,
    condition: String,
    coordinates: Option<Coordinates>,
}

/// Disables the locate control until dropped, on every exit path.
struct LocateControlGuard {
    surface: Arc<dyn Surface>,
}

impl LocateControlGuard {
    fn engage(surface: Arc<dyn Surface>) -> Self {
        surface.set_locate_enabled(false);
        Self { surface }
    }
}

impl Drop for LocateControlGuard {
    fn drop(&mut self) {
        self.surface.set_locate_enabled(true);
    }
}

pub struct Dashboard {
    surface: Arc<dyn Surface>,
    backend: Arc<dyn WeatherBackend>,
    geolocator: Arc<dyn Geolocator>,
    favorites: FavoritesStore,
    theme: ThemeManager,
    suggestions: SuggestionFetcher,
    particles: ParticleManager,
    map: Mutex<MapOverlay>,
    requests: RequestSequencer,
    page: RwLock<PageState>,
    options: DashboardOptions,
}

impl Dashboard {
    /// Build a dashboard for a page that was rendered with `context`.
    ///
    /// # Errors
    /// Returns an error when called outside a Tokio runtime.
    pub fn new(
        parts: DashboardParts,
        options: DashboardOptions,
        context: PageContext,
    ) -> Result<Self, AppError> {
        let runtime = Handle::try_current().map_err(|e| {
            AppError::Other(anyhow::anyhow!("Dashboard needs a Tokio runtime: {}", e))
        })?;

        let favorites = FavoritesStore::new(parts.storage.clone());
        let theme = ThemeManager::new(parts.storage, options.system_theme);
        let suggestions = SuggestionFetcher::new(
            parts.backend.clone(),
            parts.surface.clone(),
            favorites.clone(),
            runtime.clone(),
            options.debounce,
            options.min_query_len,
        );
        let particles =
            ParticleManager::new(parts.particles, runtime, options.animation_enabled);
        let map = MapOverlay::new(parts.map, MAP_CONTAINER, options.map_zoom);

        Ok(Self {
            surface: parts.surface,
            backend: parts.backend,
            geolocator: parts.geolocator,
            favorites,
            theme,
            suggestions,
            particles,
            map: Mutex::new(map),
            requests: RequestSequencer::new(),
            page: RwLock::new(PageState {
                city: context.city.trim().to_string(),
                condition: context.condition,
                coordinates: context.coordinates,
            }),
            options,
        })
    }

    /// Page-load setup: theme, background, particles and favorites.
    pub fn init(&self) {
        self.surface.set_theme(self.theme.current());
        let condition = self.page.read().condition.clone();
        self.apply_condition(&condition);
        self.sync_favorites();
        tracing::info!("Dashboard ready for '{}'", self.current_city());
    }

    pub fn current_city(&self) -> String {
        self.page.read().city.clone()
    }

    pub fn current_condition(&self) -> String {
        self.page.read().condition.clone()
    }

    pub fn favorites(&self) -> Vec<String> {
        self.favorites.list()
    }

    pub fn theme(&self) -> Theme {
        self.theme.current()
    }

    pub fn animation_status(&self) -> AnimationStatus {
        self.particles.status()
    }

    // Search

    /// Submit the search box. Blank input is ignored.
    pub async fn submit(&self, input: &str) -> SearchOutcome {
        let city = input.trim();
        if city.is_empty() {
            tracing::debug!("Ignoring empty search");
            return SearchOutcome::Ignored;
        }

        self.suggestions.dismiss();
        let ticket = self.requests.begin();
        self.surface.set_content(Content::Loading(LOADING_TEXT.to_string()));
        self.surface.hide_error();

        let result = self.backend.weather_by_city(city).await;
        if !self.requests.is_current(ticket) {
            tracing::debug!("Dropping stale reply for '{}'", city);
            return SearchOutcome::Superseded;
        }

        match result {
            Ok(reply) => self.apply_reply(reply),
            Err(e) => {
                tracing::warn!("Weather request for '{}' failed: {}", city, e);
                self.fail(NETWORK_ERROR_TEXT);
                SearchOutcome::NetworkFailure
            }
        }
    }

    /// Look up the weather at the device's position.
    pub async fn locate(&self) -> SearchOutcome {
        if !self.geolocator.is_supported() {
            self.surface.show_error(LocationError::Unsupported.user_message());
            return SearchOutcome::LocationFailed(LocationError::Unsupported);
        }

        let _control = LocateControlGuard::engage(self.surface.clone());
        let ticket = self.requests.begin();
        self.surface.set_content(Content::Loading(LOCATING_TEXT.to_string()));
        self.surface.hide_error();

        let position =
            locate_with_timeout(self.geolocator.as_ref(), self.options.geolocation_timeout).await;
        if !self.requests.is_current(ticket) {
            return SearchOutcome::Superseded;
        }
        let position = match position {
            Ok(position) => position,
            Err(e) => {
                tracing::warn!("Geolocation failed: {}", e);
                self.surface.show_error(&format!("Error getting location: {e}"));
                self.surface.set_content(Content::Cleared);
                return SearchOutcome::LocationFailed(e);
            }
        };

        let result = self.backend.weather_by_coords(position).await;
        if !self.requests.is_current(ticket) {
            tracing::debug!("Dropping stale reply for {}, {}", position.lat, position.lon);
            return SearchOutcome::Superseded;
        }

        match result {
            Ok(reply) => self.apply_reply(reply),
            Err(e) => {
                tracing::warn!("Weather request by position failed: {}", e);
                self.fail(LOCATION_FETCH_ERROR_TEXT);
                SearchOutcome::NetworkFailure
            }
        }
    }

    fn apply_reply(&self, reply: WeatherReply) -> SearchOutcome {
        match reply {
            WeatherReply::Failed(message) => {
                tracing::info!("Backend rejected request: {}", message);
                self.fail(&message);
                SearchOutcome::Rejected(message)
            }
            WeatherReply::Resolved(current) => {
                let condition = current.primary_condition().to_string();
                self.apply_condition(&condition);
                self.surface
                    .set_sun_times(current.sunrise_text(), current.sunset_text());
                // Stored favorites are trimmed
                let city = current.name.trim().to_string();
                {
                    let mut page = self.page.write();
                    page.city = city.clone();
                    page.coordinates = current.coord;
                }
                self.sync_favorites();

                let url = results_page_url(&self.options.base_url, &city);
                self.surface.navigate(url.as_str());
                SearchOutcome::Navigated(url.into())
            }
        }
    }

    fn fail(&self, message: &str) {
        self.surface.show_error(message);
        self.surface.set_content(Content::Cleared);
        self.apply_condition(FALLBACK_CONDITION);
    }

    fn apply_condition(&self, condition: &str) {
        self.surface.set_background(&background_class(condition));
        self.particles.set_condition(condition);
        self.page.write().condition = condition.to_string();
    }

    // Suggestions

    pub fn on_search_input(&self, text: &str) {
        self.suggestions.on_input(text);
    }

    pub fn dismiss_suggestions(&self) {
        self.suggestions.dismiss();
    }

    /// Pick a dropdown entry: fill the input and search for it.
    pub async fn select_suggestion(&self, name: &str) -> SearchOutcome {
        self.surface.set_input(name);
        self.submit(name).await
    }

    // Favorites

    /// Pick a city from the favorites list.
    pub async fn select_favorite(&self, city: &str) -> SearchOutcome {
        self.surface.set_input(city);
        self.submit(city).await
    }

    /// Returns whether the city was added.
    ///
    /// # Errors
    /// Returns an error if the list could not be saved.
    pub fn add_favorite(&self, city: &str) -> Result<bool, StorageError> {
        let city = city.trim();
        if city.is_empty() {
            return Ok(false);
        }
        let result = self.favorites.add(city);
        self.sync_favorites();
        result
    }

    /// Returns whether the city was in the list.
    ///
    /// # Errors
    /// Returns an error if the list could not be saved.
    pub fn remove_favorite(&self, city: &str) -> Result<bool, StorageError> {
        let result = self.favorites.remove(city.trim());
        self.sync_favorites();
        result
    }

    /// Flip the current city's membership. Returns whether it is now a
    /// favorite.
    ///
    /// # Errors
    /// Returns an error if the list could not be saved.
    pub fn toggle_favorite(&self) -> Result<bool, StorageError> {
        let city = self.current_city();
        if city.is_empty() {
            tracing::debug!("No current city to favorite");
            return Ok(false);
        }

        if self.favorites.is_favorite(&city) {
            self.remove_favorite(&city).map(|_| false)
        } else {
            self.add_favorite(&city).map(|_| true)
        }
    }

    fn sync_favorites(&self) {
        let favorites = self.favorites.list();
        self.surface.render_favorites(&favorites);

        let city = self.current_city();
        let is_favorite = !city.is_empty() && favorites.contains(&city);
        self.surface
            .set_favorite_indicator(FavoriteIndicator::for_membership(is_favorite));
    }

    // Theme

    /// Apply and persist a theme. The page switches even if saving fails.
    ///
    /// # Errors
    /// Returns an error if the choice could not be saved.
    pub fn set_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.surface.set_theme(theme);
        self.theme.set(theme)
    }

    /// # Errors
    /// Returns an error if the choice could not be saved.
    pub fn toggle_theme(&self) -> Result<Theme, StorageError> {
        let next = self.theme.current().flipped();
        self.set_theme(next)?;
        Ok(next)
    }

    // Map

    /// Open the map on the current city.
    ///
    /// # Errors
    /// Returns an error if the container or coordinates are missing.
    pub fn open_map(&self) -> Result<(), MapError> {
        let (at, city) = {
            let page = self.page.read();
            (page.coordinates, page.city.clone())
        };
        self.map
            .lock()
            .show(at, &city, &self.options.radar_api_key)
    }

    /// Returns whether the radar layer is now visible.
    ///
    /// # Errors
    /// Returns an error without an open map or radar key.
    pub fn toggle_radar(&self) -> Result<bool, MapError> {
        self.map.lock().toggle_radar()
    }

    pub fn close_map(&self) {
        self.map.lock().close();
    }

    pub fn map_is_open(&self) -> bool {
        self.map.lock().is_open()
    }
}
