//! Centralized error types for the Shamiran dashboard.
//!
//! Every failure in the dashboard degrades to a visible message or a safe
//! default state; nothing here is fatal. Use `user_message()` to get the text
//! shown inline on the page.

use thiserror::Error;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Map error: {0}")]
    Map(#[from] MapError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for inline display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Storage(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Location(e) => e.user_message(),
            AppError::Map(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Transport-level failures talking to the weather backend.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) | NetworkError::Timeout => {
                "A network error occurred. Please try again."
            }
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Failures of the local key/value storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Stored data is corrupt: {0}")]
    Corrupt(String),

    #[error("Failed to write storage: {0}")]
    WriteFailed(String),
}

impl StorageError {
    pub fn user_message(&self) -> &'static str {
        match self {
            StorageError::Unavailable(_) => "Local data is unavailable.",
            StorageError::Corrupt(_) => "Local data was unreadable and has been ignored.",
            StorageError::WriteFailed(_) => "Could not save your changes locally.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration not found. Using defaults.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Geolocation failures. The display strings are the reasons shown after
/// "Error getting location: ".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Geolocation is not supported")]
    Unsupported,

    #[error("User denied Geolocation")]
    PermissionDenied,

    #[error("Position unavailable")]
    Unavailable,

    #[error("Timeout expired")]
    Timeout,

    #[error("{0}")]
    Other(String),
}

impl LocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::Unsupported => "Geolocation is not supported by your browser.",
            LocationError::PermissionDenied => "Location permission was denied.",
            LocationError::Unavailable => "Your location is currently unavailable.",
            LocationError::Timeout => "Finding your location took too long.",
            LocationError::Other(_) => "Could not determine your location.",
        }
    }
}

/// Map overlay prerequisites and state errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error("Map container not found: {0}")]
    MissingContainer(String),

    #[error("No coordinates to show")]
    MissingCoordinates,

    #[error("Invalid coordinates: lat={lat}, lon={lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    #[error("Radar overlay needs an API key")]
    MissingApiKey,

    #[error("No map is open")]
    NotOpen,
}

impl MapError {
    pub fn user_message(&self) -> &'static str {
        match self {
            MapError::MissingContainer(_) | MapError::NotOpen => "Map is not available.",
            MapError::MissingCoordinates | MapError::InvalidCoordinates { .. } => {
                "Map unavailable: location data is missing."
            }
            MapError::MissingApiKey => "Radar layer is not configured.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
