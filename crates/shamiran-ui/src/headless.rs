//! In-memory page, particle layer and map engine.
//!
//! These keep the state a browser would show and log every change through
//! `tracing`, so the dashboard can run from a terminal and be inspected
//! from tests.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use shamiran_services::Theme;
use shamiran_weather::Coordinates;

use crate::map::{LayerHandle, MapEngine, MapHandle};
use crate::particles::{Particle, ParticleId, ParticleLayer};
use crate::surface::{Content, FavoriteIndicator, Suggestion, Surface, EMPTY_FAVORITES_TEXT};

/// One call made against a [`HeadlessSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    ErrorShown(String),
    ErrorHidden,
    Content(Content),
    Background(String),
    SunTimes { sunrise: String, sunset: String },
    Favorites(Vec<String>),
    Indicator(FavoriteIndicator),
    Theme(Theme),
    SuggestionsShown(Vec<Suggestion>),
    SuggestionsHidden,
    Input(String),
    LocateEnabled(bool),
    Navigated(String),
}

/// What the page currently shows.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot {
    /// Visible error banner text
    pub error: Option<String>,
    pub content: Option<Content>,
    pub background: Option<String>,
    pub sun_times: Option<(String, String)>,
    pub favorites: Vec<String>,
    pub indicator: Option<FavoriteIndicator>,
    pub theme: Option<Theme>,
    /// Open dropdown entries; `None` while hidden
    pub suggestions: Option<Vec<Suggestion>>,
    pub input: String,
    pub locate_enabled: bool,
    /// Last page navigated to
    pub location: Option<String>,
}

impl Default for PageSnapshot {
    fn default() -> Self {
        Self {
            error: None,
            content: None,
            background: None,
            sun_times: None,
            favorites: Vec::new(),
            indicator: None,
            theme: None,
            suggestions: None,
            input: String::new(),
            locate_enabled: true,
            location: None,
        }
    }
}

#[derive(Default)]
struct SurfaceState {
    page: PageSnapshot,
    events: Vec<SurfaceEvent>,
}

/// A page kept in memory.
#[derive(Default)]
pub struct HeadlessSurface {
    state: Mutex<SurfaceState>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> PageSnapshot {
        self.state.lock().page.clone()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.state.lock().events.clone()
    }

    /// Drop the recorded events, keeping the page state.
    pub fn clear_events(&self) {
        self.state.lock().events.clear();
    }

    fn record(&self, event: SurfaceEvent) {
        let mut state = self.state.lock();
        let page = &mut state.page;
        match &event {
            SurfaceEvent::ErrorShown(message) => {
                tracing::warn!("Page error: {}", message);
                page.error = Some(message.clone());
            }
            SurfaceEvent::ErrorHidden => page.error = None,
            SurfaceEvent::Content(content) => {
                if let Content::Loading(text) = content {
                    tracing::info!("{}", text);
                }
                page.content = Some(content.clone());
            }
            SurfaceEvent::Background(class) => {
                tracing::debug!("Background: {}", class);
                page.background = Some(class.clone());
            }
            SurfaceEvent::SunTimes { sunrise, sunset } => {
                tracing::info!("Sunrise {}, sunset {}", sunrise, sunset);
                page.sun_times = Some((sunrise.clone(), sunset.clone()));
            }
            SurfaceEvent::Favorites(favorites) => {
                if favorites.is_empty() {
                    tracing::info!("{}", EMPTY_FAVORITES_TEXT);
                } else {
                    tracing::info!("Favorites: {}", favorites.join(", "));
                }
                page.favorites = favorites.clone();
            }
            SurfaceEvent::Indicator(indicator) => page.indicator = Some(*indicator),
            SurfaceEvent::Theme(theme) => {
                tracing::info!("Theme: {}", theme);
                page.theme = Some(*theme);
            }
            SurfaceEvent::SuggestionsShown(suggestions) => {
                tracing::info!("{} suggestions", suggestions.len());
                page.suggestions = Some(suggestions.clone());
            }
            SurfaceEvent::SuggestionsHidden => page.suggestions = None,
            SurfaceEvent::Input(text) => page.input = text.clone(),
            SurfaceEvent::LocateEnabled(enabled) => page.locate_enabled = *enabled,
            SurfaceEvent::Navigated(url) => {
                tracing::info!("Navigating to {}", url);
                page.location = Some(url.clone());
            }
        }
        state.events.push(event);
    }
}

impl Surface for HeadlessSurface {
    fn show_error(&self, message: &str) {
        self.record(SurfaceEvent::ErrorShown(message.to_string()));
    }

    fn hide_error(&self) {
        self.record(SurfaceEvent::ErrorHidden);
    }

    fn set_content(&self, content: Content) {
        self.record(SurfaceEvent::Content(content));
    }

    fn set_background(&self, class: &str) {
        self.record(SurfaceEvent::Background(class.to_string()));
    }

    fn set_sun_times(&self, sunrise: &str, sunset: &str) {
        self.record(SurfaceEvent::SunTimes {
            sunrise: sunrise.to_string(),
            sunset: sunset.to_string(),
        });
    }

    fn render_favorites(&self, favorites: &[String]) {
        self.record(SurfaceEvent::Favorites(favorites.to_vec()));
    }

    fn set_favorite_indicator(&self, indicator: FavoriteIndicator) {
        self.record(SurfaceEvent::Indicator(indicator));
    }

    fn set_theme(&self, theme: Theme) {
        self.record(SurfaceEvent::Theme(theme));
    }

    fn show_suggestions(&self, suggestions: &[Suggestion]) {
        self.record(SurfaceEvent::SuggestionsShown(suggestions.to_vec()));
    }

    fn hide_suggestions(&self) {
        self.record(SurfaceEvent::SuggestionsHidden);
    }

    fn set_input(&self, text: &str) {
        self.record(SurfaceEvent::Input(text.to_string()));
    }

    fn set_locate_enabled(&self, enabled: bool) {
        self.record(SurfaceEvent::LocateEnabled(enabled));
    }

    fn navigate(&self, url: &str) {
        self.record(SurfaceEvent::Navigated(url.to_string()));
    }
}

#[derive(Default)]
struct ParticleState {
    live: BTreeMap<ParticleId, Particle>,
    spawned: usize,
    removed: usize,
    flashes: usize,
}

/// Particle layer that tracks live nodes.
#[derive(Default)]
pub struct HeadlessParticles {
    state: Mutex<ParticleState>,
}

impl HeadlessParticles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.state.lock().live.len()
    }

    /// Distinct classes among live particles.
    pub fn live_classes(&self) -> BTreeSet<&'static str> {
        self.state.lock().live.values().map(|p| p.class).collect()
    }

    pub fn spawned(&self) -> usize {
        self.state.lock().spawned
    }

    pub fn removed(&self) -> usize {
        self.state.lock().removed
    }

    pub fn flashes(&self) -> usize {
        self.state.lock().flashes
    }
}

impl ParticleLayer for HeadlessParticles {
    fn spawn(&self, particle: &Particle) {
        tracing::trace!("Spawn {} #{}", particle.class, particle.id);
        let mut state = self.state.lock();
        state.spawned += 1;
        state.live.insert(particle.id, particle.clone());
    }

    fn remove(&self, id: ParticleId) {
        let mut state = self.state.lock();
        if state.live.remove(&id).is_some() {
            state.removed += 1;
        } else {
            tracing::warn!("Removing unknown particle #{}", id);
        }
    }

    fn flash(&self) {
        tracing::debug!("Lightning flash");
        self.state.lock().flashes += 1;
    }
}

/// One call made against a [`HeadlessMap`].
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    Created {
        map: MapHandle,
        container: String,
        center: Coordinates,
        zoom: u8,
    },
    TileLayer {
        map: MapHandle,
        layer: LayerHandle,
        url: String,
        opacity: f32,
    },
    LayerRemoved {
        map: MapHandle,
        layer: LayerHandle,
    },
    Marker {
        map: MapHandle,
        at: Coordinates,
        popup: String,
    },
    Disposed {
        map: MapHandle,
    },
    Placeholder {
        container: String,
        message: String,
    },
}

#[derive(Default)]
struct MapState {
    containers: HashSet<String>,
    open: HashSet<MapHandle>,
    next_handle: u64,
    events: Vec<MapEvent>,
}

impl MapState {
    fn next_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

/// Map engine that records calls. Clones share state, so a test can keep
/// one handle while the overlay owns another.
#[derive(Clone, Default)]
pub struct HeadlessMap {
    state: Arc<Mutex<MapState>>,
}

impl HeadlessMap {
    /// An engine whose page has a container with the given id.
    pub fn with_container(container: &str) -> Self {
        let engine = Self::default();
        engine.state.lock().containers.insert(container.to_string());
        engine
    }

    pub fn events(&self) -> Vec<MapEvent> {
        self.state.lock().events.clone()
    }

    /// Maps created and not yet disposed.
    pub fn open_maps(&self) -> usize {
        self.state.lock().open.len()
    }
}

impl MapEngine for HeadlessMap {
    fn has_container(&self, container: &str) -> bool {
        self.state.lock().containers.contains(container)
    }

    fn create_map(&mut self, container: &str, center: Coordinates, zoom: u8) -> MapHandle {
        let mut state = self.state.lock();
        let map = state.next_handle();
        state.open.insert(map);
        state.events.push(MapEvent::Created {
            map,
            container: container.to_string(),
            center,
            zoom,
        });
        map
    }

    fn add_tile_layer(&mut self, map: MapHandle, url_template: &str, opacity: f32) -> LayerHandle {
        let mut state = self.state.lock();
        let layer = state.next_handle();
        state.events.push(MapEvent::TileLayer {
            map,
            layer,
            url: url_template.to_string(),
            opacity,
        });
        layer
    }

    fn remove_layer(&mut self, map: MapHandle, layer: LayerHandle) {
        self.state
            .lock()
            .events
            .push(MapEvent::LayerRemoved { map, layer });
    }

    fn add_marker(&mut self, map: MapHandle, at: Coordinates, popup: &str) {
        self.state.lock().events.push(MapEvent::Marker {
            map,
            at,
            popup: popup.to_string(),
        });
    }

    fn dispose(&mut self, map: MapHandle) {
        let mut state = self.state.lock();
        state.open.remove(&map);
        state.events.push(MapEvent::Disposed { map });
    }

    fn show_placeholder(&mut self, container: &str, message: &str) {
        tracing::info!("Map placeholder: {}", message);
        self.state.lock().events.push(MapEvent::Placeholder {
            container: container.to_string(),
            message: message.to_string(),
        });
    }
}
