//! Map overlay: a marker on a tile map plus an optional radar layer.
//!
//! Tile rendering belongs to the engine; this wrapper only owns the
//! lifecycle (one map at a time) and the prerequisites checks.

use shamiran_core::MapError;
use shamiran_weather::Coordinates;

pub type MapHandle = u64;
pub type LayerHandle = u64;

pub const BASE_TILES: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const RADAR_TILES: &str = "https://tile.openweathermap.org/map/precipitation_new/{z}/{x}/{y}.png";
const RADAR_OPACITY: f32 = 0.6;

/// An external tile-map implementation.
pub trait MapEngine: Send {
    fn has_container(&self, container: &str) -> bool;

    fn create_map(&mut self, container: &str, center: Coordinates, zoom: u8) -> MapHandle;

    fn add_tile_layer(&mut self, map: MapHandle, url_template: &str, opacity: f32) -> LayerHandle;

    fn remove_layer(&mut self, map: MapHandle, layer: LayerHandle);

    fn add_marker(&mut self, map: MapHandle, at: Coordinates, popup: &str);

    fn dispose(&mut self, map: MapHandle);

    /// Replace the container's contents with a message.
    fn show_placeholder(&mut self, container: &str, message: &str);
}

/// Tile URL template for the precipitation radar.
pub fn radar_tile_url(api_key: &str) -> String {
    format!("{RADAR_TILES}?appid={api_key}")
}

struct MapView {
    map: MapHandle,
    api_key: String,
    radar: Option<LayerHandle>,
}

pub struct MapOverlay {
    engine: Box<dyn MapEngine>,
    container: String,
    zoom: u8,
    view: Option<MapView>,
}

impl MapOverlay {
    pub fn new(engine: Box<dyn MapEngine>, container: impl Into<String>, zoom: u8) -> Self {
        Self {
            engine,
            container: container.into(),
            zoom,
            view: None,
        }
    }

    /// (Re)initialize the map centered on `at` with a marker named `name`.
    ///
    /// Any previous map is disposed first. On a failed prerequisite the
    /// container shows a placeholder instead.
    ///
    /// # Errors
    /// `MissingContainer`, `MissingCoordinates` or `InvalidCoordinates`.
    pub fn show(
        &mut self,
        at: Option<Coordinates>,
        name: &str,
        api_key: &str,
    ) -> Result<(), MapError> {
        if !self.engine.has_container(&self.container) {
            tracing::warn!("Map container '{}' not found", self.container);
            return Err(MapError::MissingContainer(self.container.clone()));
        }

        let at = match at {
            Some(at) if at.is_valid() => at,
            Some(at) => {
                return Err(self.unavailable(MapError::InvalidCoordinates {
                    lat: at.lat,
                    lon: at.lon,
                }))
            }
            None => return Err(self.unavailable(MapError::MissingCoordinates)),
        };

        self.close();

        let map = self.engine.create_map(&self.container, at, self.zoom);
        self.engine.add_tile_layer(map, BASE_TILES, 1.0);
        self.engine.add_marker(map, at, name);
        self.view = Some(MapView {
            map,
            api_key: api_key.trim().to_string(),
            radar: None,
        });

        tracing::info!("Map shown for {} at {}, {}", name, at.lat, at.lon);
        Ok(())
    }

    fn unavailable(&mut self, err: MapError) -> MapError {
        tracing::warn!("Not showing map: {}", err);
        self.close();
        self.engine
            .show_placeholder(&self.container, err.user_message());
        err
    }

    /// Show or hide the radar overlay. Returns whether it is now visible.
    ///
    /// # Errors
    /// `NotOpen` without a map, `MissingApiKey` when the map was opened
    /// without a radar key.
    pub fn toggle_radar(&mut self) -> Result<bool, MapError> {
        let view = self.view.as_mut().ok_or(MapError::NotOpen)?;

        if let Some(layer) = view.radar.take() {
            self.engine.remove_layer(view.map, layer);
            return Ok(false);
        }

        if view.api_key.is_empty() {
            return Err(MapError::MissingApiKey);
        }

        let layer =
            self.engine
                .add_tile_layer(view.map, &radar_tile_url(&view.api_key), RADAR_OPACITY);
        view.radar = Some(layer);
        Ok(true)
    }

    /// Dispose the current map, if any.
    pub fn close(&mut self) {
        if let Some(view) = self.view.take() {
            self.engine.dispose(view.map);
        }
    }

    pub fn is_open(&self) -> bool {
        self.view.is_some()
    }

    pub fn radar_visible(&self) -> bool {
        self.view.as_ref().is_some_and(|v| v.radar.is_some())
    }
}

impl Drop for MapOverlay {
    fn drop(&mut self) {
        self.close();
    }
}
