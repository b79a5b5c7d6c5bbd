//! Weather backend access for the Shamiran dashboard
//!
//! Typed client for the server's JSON endpoints plus the geolocation seam
//! used by the "locate me" control.

pub mod client;
pub mod location;
pub mod types;

pub use client::{parse_base_url, results_page_url, WeatherBackend, WeatherClient};
pub use location::{locate_with_timeout, FixedLocator, Geolocator};
pub use types::*;
