use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding config.toml and the local storage file
    pub config_dir: PathBuf,

    /// Weather backend
    pub backend: BackendConfig,

    /// UI preferences
    #[serde(default)]
    pub ui: UiConfig,

    /// Search suggestion dropdown
    #[serde(default)]
    pub suggestions: SuggestionConfig,

    /// Geolocation source
    #[serde(default)]
    pub geolocation: GeolocationConfig,

    /// Map overlay
    #[serde(default)]
    pub map: MapConfig,

    /// Weather particle animation
    #[serde(default)]
    pub animation: AnimationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the server that renders results pages and answers JSON queries
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// City shown when the page context names none
    pub default_city: String,

    /// Stand-in for the OS color-scheme preference, used until a theme is stored
    pub prefer_dark: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_city: "Dhaka".to_string(),
            prefer_dark: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Quiet period after the last keystroke before a request is sent
    pub debounce_ms: u64,

    /// Queries shorter than this never reach the backend
    pub min_query_len: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_query_len: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    /// Give up on a position fix after this many seconds
    pub timeout_secs: u64,

    /// Fixed position reported by the headless locator. Geolocation is
    /// unsupported when either coordinate is missing.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

fn default_geolocation_timeout() -> u64 {
    10
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_geolocation_timeout(),
            latitude: None,
            longitude: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// OpenWeatherMap key for the radar tile layer
    pub radar_api_key: String,

    /// Initial zoom level
    pub zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            radar_api_key: String::new(),
            zoom: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub enabled: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shamiran");

        Self {
            config_dir,
            backend: BackendConfig::default(),
            ui: UiConfig::default(),
            suggestions: SuggestionConfig::default(),
            geolocation: GeolocationConfig::default(),
            map: MapConfig::default(),
            animation: AnimationConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the user config directory, creating a default
    /// file if none exists
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, creating a default file if
    /// none exists
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let mut config = Self::default();
            if let Some(parent) = path.parent() {
                config.config_dir = parent.to_path_buf();
            }
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Warnings are logged; errors fail the load.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_url(&self.backend.base_url, "backend.base_url", &mut result);

        if self.backend.request_timeout_secs == 0 {
            result.add_error(
                "backend.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if self.ui.default_city.trim().is_empty() {
            result.add_error("ui.default_city", "Default city must not be empty");
        }

        if self.suggestions.debounce_ms == 0 {
            result.add_warning(
                "suggestions.debounce_ms",
                "Debounce disabled: every keystroke sends a request",
            );
        }

        if self.suggestions.min_query_len == 0 {
            result.add_warning(
                "suggestions.min_query_len",
                "Empty queries will be sent to the backend",
            );
        }

        match (self.geolocation.latitude, self.geolocation.longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                    result.add_error(
                        "geolocation",
                        format!("Coordinates out of range: {lat}, {lon}"),
                    );
                }
            }
            (None, None) => {}
            _ => result.add_warning(
                "geolocation",
                "Only one coordinate configured - geolocation disabled",
            ),
        }

        if self.map.zoom > 19 {
            result.add_error("map.zoom", "Zoom must be between 0 and 19");
        }

        if self.map.radar_api_key.trim().is_empty() {
            result.add_warning(
                "map.radar_api_key",
                "Radar API key not configured - radar overlay unavailable",
            );
        }

        result
    }

    fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Path of the file backing the dashboard's local storage
    pub fn storage_path(&self) -> PathBuf {
        self.config_dir.join("local_storage.json")
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("shamiran");

        Ok(config_dir.join("config.toml"))
    }
}
