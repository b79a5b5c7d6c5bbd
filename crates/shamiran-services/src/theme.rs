//! Light/dark theme preference.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use shamiran_core::StorageError;

use crate::storage::KeyValueStore;

/// Storage key holding `"light"` or `"dark"`.
pub const THEME_KEY: &str = "shamiran_theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

/// Persists the theme choice, falling back to the system preference until
/// one has been stored.
#[derive(Clone)]
pub struct ThemeManager {
    storage: Arc<dyn KeyValueStore>,
    system: Theme,
}

impl ThemeManager {
    pub fn new(storage: Arc<dyn KeyValueStore>, system: Theme) -> Self {
        Self { storage, system }
    }

    /// Stored preference, or the system preference when none (or an
    /// unrecognized value) is stored.
    pub fn current(&self) -> Theme {
        match self.storage.get_item(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|e| {
                tracing::debug!("Ignoring stored theme: {}", e);
                self.system
            }),
            Ok(None) => self.system,
            Err(e) => {
                tracing::warn!("Theme unreadable, using system preference: {}", e);
                self.system
            }
        }
    }

    /// # Errors
    /// Returns an error if the preference could not be persisted.
    pub fn set(&self, theme: Theme) -> Result<(), StorageError> {
        self.storage.set_item(THEME_KEY, theme.as_str())?;
        tracing::info!("Theme set to {}", theme);
        Ok(())
    }

    /// Flip light/dark and persist. Returns the new theme.
    ///
    /// # Errors
    /// Returns an error if the preference could not be persisted.
    pub fn toggle(&self) -> Result<Theme, StorageError> {
        let next = self.current().flipped();
        self.set(next)?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_defaults_to_system_preference() {
        let storage = Arc::new(MemoryStorage::new());
        assert_eq!(ThemeManager::new(storage.clone(), Theme::Dark).current(), Theme::Dark);
        assert_eq!(ThemeManager::new(storage, Theme::Light).current(), Theme::Light);
    }

    #[test]
    fn test_toggle_flips_and_persists() {
        let storage = Arc::new(MemoryStorage::new());
        let manager = ThemeManager::new(storage.clone(), Theme::Light);

        assert_eq!(manager.toggle().unwrap(), Theme::Dark);
        assert_eq!(storage.get_item(THEME_KEY).unwrap().as_deref(), Some("dark"));

        assert_eq!(manager.toggle().unwrap(), Theme::Light);
        assert_eq!(storage.get_item(THEME_KEY).unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_stored_value_beats_system_preference() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(THEME_KEY, "light").unwrap();
        assert_eq!(ThemeManager::new(storage, Theme::Dark).current(), Theme::Light);
    }

    #[test]
    fn test_unrecognized_value_falls_back() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(THEME_KEY, "sepia").unwrap();
        assert_eq!(ThemeManager::new(storage, Theme::Dark).current(), Theme::Dark);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("dark".parse::<Theme>(), Ok(Theme::Dark));
        assert!("Dark".parse::<Theme>().is_err());
        assert_eq!(Theme::Light.to_string(), "light");
        assert_eq!(Theme::from_dark(true), Theme::Dark);
    }
}
