use serde::{Deserialize, Serialize};

use shamiran_core::NetworkError;

/// Coarse weather categories reported in `weather[].main`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeatherCondition {
    #[default]
    Clear,
    Clouds,
    Mist,
    Fog,
    Haze,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
    /// Anything else the backend reports (smoke, dust, tornado, ...)
    Other,
}

impl WeatherCondition {
    /// Case-insensitive parse of a condition string.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "clear" => Self::Clear,
            "clouds" => Self::Clouds,
            "mist" => Self::Mist,
            "fog" => Self::Fog,
            "haze" => Self::Haze,
            "drizzle" => Self::Drizzle,
            "rain" => Self::Rain,
            "snow" => Self::Snow,
            "thunderstorm" => Self::Thunderstorm,
            _ => Self::Other,
        }
    }
}

/// Geographic position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// One entry of the `weather` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSummary {
    pub main: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// The `current` object of a weather reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub name: String,
    #[serde(default)]
    pub weather: Vec<ConditionSummary>,
    #[serde(default)]
    pub formatted_sunrise: Option<String>,
    #[serde(default)]
    pub formatted_sunset: Option<String>,
    #[serde(default)]
    pub coord: Option<Coordinates>,
}

impl CurrentConditions {
    /// `weather[0].main`, or "Clear" when the backend sent no conditions.
    pub fn primary_condition(&self) -> &str {
        self.weather
            .first()
            .map(|w| w.main.as_str())
            .filter(|main| !main.trim().is_empty())
            .unwrap_or("Clear")
    }

    pub fn sunrise_text(&self) -> &str {
        self.formatted_sunrise.as_deref().unwrap_or("N/A")
    }

    pub fn sunset_text(&self) -> &str {
        self.formatted_sunset.as_deref().unwrap_or("N/A")
    }
}

/// Wire shape of `/weather` and `/weather-by-coords` bodies
#[derive(Debug, Deserialize)]
pub(crate) struct ReplyBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub current: Option<CurrentConditions>,
}

/// Outcome of a weather query the backend answered
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherReply {
    /// The backend reported a domain error (e.g. unknown city)
    Failed(String),
    /// The backend resolved the query
    Resolved(CurrentConditions),
}

impl ReplyBody {
    pub(crate) fn into_reply(self) -> Result<WeatherReply, NetworkError> {
        // The server sends `"error": null` next to successful data
        if let Some(message) = self.error.filter(|m| !m.is_empty()) {
            return Ok(WeatherReply::Failed(message));
        }
        self.current.map(WeatherReply::Resolved).ok_or_else(|| {
            NetworkError::InvalidResponse("reply has neither `error` nor `current`".into())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(json: &str) -> Result<WeatherReply, NetworkError> {
        let body: ReplyBody = serde_json::from_str(json).unwrap();
        body.into_reply()
    }

    #[test]
    fn test_condition_parse_is_case_insensitive() {
        assert_eq!(WeatherCondition::parse("Thunderstorm"), WeatherCondition::Thunderstorm);
        assert_eq!(WeatherCondition::parse("RAIN"), WeatherCondition::Rain);
        assert_eq!(WeatherCondition::parse(" haze "), WeatherCondition::Haze);
    }

    #[test]
    fn test_unknown_condition_is_other() {
        assert_eq!(WeatherCondition::parse("Tornado"), WeatherCondition::Other);
        assert_eq!(WeatherCondition::parse(""), WeatherCondition::Other);
    }

    #[test]
    fn test_error_reply() {
        let r = reply(r#"{"error": "City not found"}"#).unwrap();
        assert_eq!(r, WeatherReply::Failed("City not found".into()));
    }

    #[test]
    fn test_null_error_with_current_resolves() {
        let r = reply(
            r#"{"error": null, "forecast": {}, "current": {
                "name": "Dhaka",
                "weather": [{"main": "Rain", "description": "light rain"}],
                "formatted_sunrise": "05:41 AM",
                "coord": {"lat": 23.71, "lon": 90.41}
            }}"#,
        )
        .unwrap();

        let WeatherReply::Resolved(current) = r else {
            panic!("expected resolved reply");
        };
        assert_eq!(current.name, "Dhaka");
        assert_eq!(current.primary_condition(), "Rain");
        assert_eq!(current.sunrise_text(), "05:41 AM");
        assert_eq!(current.sunset_text(), "N/A");
        assert_eq!(current.coord, Some(Coordinates::new(23.71, 90.41)));
    }

    #[test]
    fn test_empty_weather_list_defaults_to_clear() {
        let r = reply(r#"{"current": {"name": "Khulna", "weather": []}}"#).unwrap();
        let WeatherReply::Resolved(current) = r else {
            panic!("expected resolved reply");
        };
        assert_eq!(current.primary_condition(), "Clear");
    }

    #[test]
    fn test_body_without_error_or_current_is_invalid() {
        let err = reply("{}").unwrap_err();
        assert!(matches!(err, NetworkError::InvalidResponse(_)));
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinates::new(23.8, 90.4).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
    }
}
