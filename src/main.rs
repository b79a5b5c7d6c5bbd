use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};

use shamiran_core::Config;
use shamiran_services::{FileStorage, Theme};
use shamiran_ui::{
    Dashboard, DashboardOptions, DashboardParts, HeadlessMap, HeadlessParticles, HeadlessSurface,
    PageContext, SearchOutcome, SurfaceEvent,
};
use shamiran_weather::{FixedLocator, WeatherClient};

const USAGE: &str = "Usage: shamiran <command>

Commands:
  search <city>             Look up a city
  locate                    Look up the configured position
  suggest <text>            Show city suggestions
  favorites                 List favorite cities
  favorite add|remove <city>
  theme [light|dark|toggle] Show or change the theme";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    shamiran_core::init()?;

    let (config, _) = Config::load_validated()?;
    tracing::info!("Using backend {}", config.backend.base_url);

    let client = WeatherClient::new(
        &config.backend.base_url,
        Duration::from_secs(config.backend.request_timeout_secs),
    )?;
    let surface = Arc::new(HeadlessSurface::new());
    let options = DashboardOptions::from_config(&config)?;
    let suggestion_wait =
        options.debounce + Duration::from_secs(config.backend.request_timeout_secs);

    let dashboard = Dashboard::new(
        DashboardParts {
            surface: surface.clone(),
            backend: Arc::new(client),
            geolocator: Arc::new(FixedLocator::from_parts(
                config.geolocation.latitude,
                config.geolocation.longitude,
            )),
            storage: Arc::new(FileStorage::new(config.storage_path())),
            particles: Arc::new(HeadlessParticles::new()),
            map: Box::new(HeadlessMap::default()),
        },
        options,
        PageContext::new(config.ui.default_city.clone(), "Clear"),
    )?;
    dashboard.init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let rest = args.get(1..).unwrap_or_default().join(" ");

    match args.first().map(String::as_str) {
        Some("search") => report(dashboard.submit(&rest).await, &surface),
        Some("locate") => report(dashboard.locate().await, &surface),
        Some("suggest") => suggest(&dashboard, &surface, &rest, suggestion_wait).await,
        Some("favorites") => print_favorites(&dashboard.favorites()),
        Some("favorite") => {
            let city = args.get(2..).unwrap_or_default().join(" ");
            match args.get(1).map(String::as_str) {
                Some("add") => {
                    if !dashboard.add_favorite(&city)? {
                        println!("{} is already a favorite", city);
                    }
                }
                Some("remove") => {
                    if !dashboard.remove_favorite(&city)? {
                        println!("{} is not a favorite", city);
                    }
                }
                _ => bail!("Expected 'favorite add <city>' or 'favorite remove <city>'"),
            }
            print_favorites(&dashboard.favorites());
        }
        Some("theme") => {
            match args.get(1).map(String::as_str) {
                None => {}
                Some("toggle") => {
                    dashboard.toggle_theme()?;
                }
                Some(name) => {
                    let theme: Theme = name.parse().map_err(anyhow::Error::msg)?;
                    dashboard.set_theme(theme)?;
                }
            }
            println!("Theme: {}", dashboard.theme());
        }
        _ => println!("{USAGE}"),
    }

    Ok(())
}

fn report(outcome: SearchOutcome, surface: &HeadlessSurface) {
    let page = surface.snapshot();
    match outcome {
        SearchOutcome::Navigated(url) => {
            println!("Weather page: {}", url);
            if let Some((sunrise, sunset)) = page.sun_times {
                println!("  Sunrise: {}  Sunset: {}", sunrise, sunset);
            }
        }
        SearchOutcome::Ignored => println!("Please enter a city name."),
        _ => {
            if let Some(error) = page.error {
                println!("{}", error);
            }
        }
    }
}

async fn suggest(dashboard: &Dashboard, surface: &HeadlessSurface, text: &str, wait: Duration) {
    surface.clear_events();
    dashboard.on_search_input(text);

    let deadline = tokio::time::Instant::now() + wait;
    while tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let settled = surface.events().iter().any(|e| {
            matches!(
                e,
                SurfaceEvent::SuggestionsShown(_) | SurfaceEvent::SuggestionsHidden
            )
        });
        if settled {
            break;
        }
    }

    match surface.snapshot().suggestions {
        Some(suggestions) => {
            for suggestion in suggestions {
                let star = if suggestion.is_favorite { "*" } else { " " };
                println!("{} {}", star, suggestion.name);
            }
        }
        None => println!("No suggestions."),
    }
}

fn print_favorites(favorites: &[String]) {
    if favorites.is_empty() {
        println!("{}", shamiran_ui::surface::EMPTY_FAVORITES_TEXT);
        return;
    }
    for city in favorites {
        println!("- {}", city);
    }
}
