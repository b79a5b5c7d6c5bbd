//! Position sources for the "locate me" control.

use std::time::Duration;

use async_trait::async_trait;
use shamiran_core::LocationError;

use crate::types::Coordinates;

#[async_trait]
pub trait Geolocator: Send + Sync {
    /// False when the host has no position source at all.
    fn is_supported(&self) -> bool;

    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Reports a configured position; unsupported when none is configured.
#[derive(Debug, Clone, Default)]
pub struct FixedLocator {
    position: Option<Coordinates>,
}

impl FixedLocator {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }

    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Self {
        Self::new(lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon)))
    }
}

#[async_trait]
impl Geolocator for FixedLocator {
    fn is_supported(&self) -> bool {
        self.position.is_some()
    }

    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        let position = self.position.ok_or(LocationError::Unsupported)?;
        if !position.is_valid() {
            return Err(LocationError::Unavailable);
        }
        Ok(position)
    }
}

/// Ask for a position, giving up after `timeout`.
pub async fn locate_with_timeout(
    locator: &dyn Geolocator,
    timeout: Duration,
) -> Result<Coordinates, LocationError> {
    match tokio::time::timeout(timeout, locator.current_position()).await {
        Ok(result) => result,
        Err(_) => {
            tracing::debug!("Geolocation timed out after {:?}", timeout);
            Err(LocationError::Timeout)
        }
    }
}
