//! Page-side behavior of the Shamiran weather dashboard
//!
//! The [`Dashboard`] wires the search box, "locate me" control, favorites,
//! theme, decorative particles and map overlay to a [`Surface`] that stands
//! in for the hosting page. [`headless`] provides in-memory surfaces used by
//! the command-line front end and by tests.

pub mod dashboard;
pub mod headless;
pub mod map;
pub mod particles;
pub mod suggestions;
pub mod surface;

pub use dashboard::{Dashboard, DashboardOptions, DashboardParts, PageContext, SearchOutcome};
pub use headless::{
    HeadlessMap, HeadlessParticles, HeadlessSurface, MapEvent, PageSnapshot, SurfaceEvent,
};
pub use map::{radar_tile_url, MapEngine, MapOverlay};
pub use particles::{AnimationStatus, Particle, ParticleKind, ParticleLayer, ParticleManager};
pub use suggestions::SuggestionFetcher;
pub use surface::{background_class, Content, FavoriteIndicator, Suggestion, Surface};
