//! Debounced search suggestions for the city input.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use shamiran_services::FavoritesStore;
use shamiran_weather::WeatherBackend;

use crate::surface::{Suggestion, Surface};

pub struct SuggestionFetcher {
    backend: Arc<dyn WeatherBackend>,
    surface: Arc<dyn Surface>,
    favorites: FavoritesStore,
    runtime: Handle,
    debounce: Duration,
    min_query_len: usize,
    pending: Arc<Mutex<Pending>>,
}

/// Timer plus request for the latest keystroke.
#[derive(Default)]
struct Pending {
    task: Option<JoinHandle<()>>,
    // Bumped on every keystroke and dismissal; a task may only render while
    // its generation is still the current one
    generation: u64,
}

impl Pending {
    fn supersede(&mut self) -> u64 {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation += 1;
        self.generation
    }
}

impl SuggestionFetcher {
    pub fn new(
        backend: Arc<dyn WeatherBackend>,
        surface: Arc<dyn Surface>,
        favorites: FavoritesStore,
        runtime: Handle,
        debounce: Duration,
        min_query_len: usize,
    ) -> Self {
        Self {
            backend,
            surface,
            favorites,
            runtime,
            debounce,
            min_query_len,
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    /// Handle a change of the input text.
    ///
    /// Supersedes any earlier keystroke whose request has not rendered yet,
    /// including one already waiting on the backend.
    pub fn on_input(&self, text: &str) {
        let mut pending = self.pending.lock();
        let generation = pending.supersede();

        let query = text.trim().to_string();
        if query.chars().count() < self.min_query_len {
            self.surface.hide_suggestions();
            return;
        }

        let backend = self.backend.clone();
        let surface = self.surface.clone();
        let favorites = self.favorites.clone();
        let debounce = self.debounce;
        let shared = self.pending.clone();

        pending.task = Some(self.runtime.spawn(async move {
            tokio::time::sleep(debounce).await;
            let result = backend.suggestions(&query).await;

            // Rendering under the lock orders it before any newer keystroke
            let current = shared.lock();
            if current.generation != generation {
                tracing::debug!("Dropping stale suggestions for '{}'", query);
                return;
            }

            match result {
                Ok(names) if names.is_empty() => surface.hide_suggestions(),
                Ok(names) => {
                    let favorite_names = favorites.list();
                    let suggestions: Vec<Suggestion> = names
                        .into_iter()
                        .map(|name| Suggestion {
                            is_favorite: favorite_names.contains(&name),
                            name,
                        })
                        .collect();
                    surface.show_suggestions(&suggestions);
                }
                Err(e) => {
                    tracing::debug!("Suggestions for '{}' failed: {}", query, e);
                    surface.hide_suggestions();
                }
            }
        }));
    }

    /// Hide the dropdown (click outside, or a suggestion was picked).
    pub fn dismiss(&self) {
        self.pending.lock().supersede();
        self.surface.hide_suggestions();
    }
}

impl Drop for SuggestionFetcher {
    fn drop(&mut self) {
        self.pending.lock().supersede();
    }
}
