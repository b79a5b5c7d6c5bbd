pub mod config;
pub mod error;
pub mod request_state;

pub use config::{
    AnimationConfig, BackendConfig, Config, GeolocationConfig, MapConfig, SuggestionConfig,
    UiConfig, ValidationResult,
};
pub use error::{
    AppError, ConfigError, LocationError, MapError, NetworkError, ReqwestErrorExt, StorageError,
};
pub use request_state::{RequestSequencer, RequestTicket};

use anyhow::Result;

/// Initialize logging for the dashboard
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!("Shamiran core initialized");
    Ok(())
}
