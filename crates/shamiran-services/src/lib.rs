pub mod favorites;
pub mod storage;
pub mod theme;

pub use favorites::{FavoritesStore, FAVORITES_KEY};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage};
pub use theme::{Theme, ThemeManager, THEME_KEY};
