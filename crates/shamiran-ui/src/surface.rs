//! The page the dashboard renders into.
//!
//! Each method corresponds to one DOM anchor of the hosting page (error
//! banner, content area, favorites list, search input, ...). Implementations
//! must be cheap and non-blocking: they are called from async handlers.

use shamiran_services::Theme;

/// Text shown in the favorites list when it is empty.
pub const EMPTY_FAVORITES_TEXT: &str = "No favorites added yet.";

/// Content area states the dashboard drives directly. Weather content
/// itself comes from the server-rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Placeholder while a request is in flight
    Loading(String),
    /// Empty content area
    Cleared,
}

/// State of the favorite toggle for the current city.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FavoriteIndicator {
    pub active: bool,
    pub title: &'static str,
}

impl FavoriteIndicator {
    pub fn for_membership(is_favorite: bool) -> Self {
        if is_favorite {
            Self {
                active: true,
                title: "Remove from Favorites",
            }
        } else {
            Self {
                active: false,
                title: "Add to Favorites",
            }
        }
    }
}

/// One dropdown entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub name: String,
    pub is_favorite: bool,
}

/// Visual class for a weather condition background, e.g. `weather-rain`.
pub fn background_class(condition: &str) -> String {
    format!("weather-{}", condition.trim().to_lowercase())
}

pub trait Surface: Send + Sync {
    fn show_error(&self, message: &str);

    fn hide_error(&self);

    fn set_content(&self, content: Content);

    /// Swap the background to the given condition's class.
    fn set_background(&self, class: &str);

    fn set_sun_times(&self, sunrise: &str, sunset: &str);

    /// Render the favorites list; an empty slice shows [`EMPTY_FAVORITES_TEXT`].
    fn render_favorites(&self, favorites: &[String]);

    fn set_favorite_indicator(&self, indicator: FavoriteIndicator);

    fn set_theme(&self, theme: Theme);

    fn show_suggestions(&self, suggestions: &[Suggestion]);

    fn hide_suggestions(&self);

    fn set_input(&self, text: &str);

    /// Enable or disable the "locate me" control.
    fn set_locate_enabled(&self, enabled: bool);

    /// Full navigation to another page.
    fn navigate(&self, url: &str);
}
