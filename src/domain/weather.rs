// Weather risk evaluator
use serde::{Deserialize, Serialize};

pub const MAX_WEATHER_BUMP: u8 = 4;

pub const LIGHT_PRECIPITATION_MM: f64 = 0.0;
pub const MODERATE_PRECIPITATION_MM: f64 = 2.0;
pub const HEAVY_PRECIPITATION_MM: f64 = 10.0;
pub const ELEVATED_WIND_MS: f64 = 8.0;
pub const STRONG_WIND_MS: f64 = 15.0;
pub const FREEZING_C: f64 = 0.0;
pub const EXTREME_HEAT_C: f64 = 35.0;

/// Normalized current conditions for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeatherReading {
    pub temperature: f64,
    pub wind_speed: f64,
    pub weather_main: String,
    pub weather_id: u32,
    /// mm over the last hour, rain or snow
    pub precipitation: f64,
}

impl Default for WeatherReading {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            wind_speed: 0.0,
            weather_main: "Unknown".to_string(),
            weather_id: 0,
            precipitation: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRisk {
    pub weather_risk_bump: u8,
    pub reasons: Vec<String>,
}

impl WeatherRisk {
    pub fn is_elevated(&self) -> bool {
        self.weather_risk_bump > 0
    }
}

fn precipitation_rule(mm: f64) -> Option<(u8, &'static str)> {
    if mm > HEAVY_PRECIPITATION_MM {
        Some((3, "Heavy precipitation"))
    } else if mm > MODERATE_PRECIPITATION_MM {
        Some((2, "Moderate precipitation"))
    } else if mm > LIGHT_PRECIPITATION_MM {
        Some((1, "Light precipitation"))
    } else {
        None
    }
}

fn wind_rule(ms: f64) -> Option<(u8, &'static str)> {
    if ms > STRONG_WIND_MS {
        Some((2, "Strong wind"))
    } else if ms >= ELEVATED_WIND_MS {
        Some((1, "Elevated wind speed"))
    } else {
        None
    }
}

fn temperature_rule(celsius: f64) -> Option<(u8, &'static str)> {
    if celsius < FREEZING_C {
        Some((1, "Sub-zero temperature"))
    } else if celsius > EXTREME_HEAT_C {
        Some((1, "Extreme heat"))
    } else {
        None
    }
}

fn condition_rule(weather_id: u32) -> Option<(u8, &'static str)> {
    match weather_id {
        200..=299 => Some((2, "Thunderstorm")),
        600..=699 => Some((2, "Snow conditions")),
        _ => None,
    }
}

/// Sum the four independent weather rules and clamp to `MAX_WEATHER_BUMP`.
pub fn evaluate_weather(reading: &WeatherReading) -> WeatherRisk {
    let hits: Vec<(u8, &'static str)> = [
        precipitation_rule(reading.precipitation),
        wind_rule(reading.wind_speed),
        temperature_rule(reading.temperature),
        condition_rule(reading.weather_id),
    ]
    .into_iter()
    .flatten()
    .collect();

    let score: u8 = hits.iter().map(|(points, _)| points).sum();

    WeatherRisk {
        weather_risk_bump: score.min(MAX_WEATHER_BUMP),
        reasons: hits.into_iter().map(|(_, label)| label.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(temperature: f64, wind_speed: f64, weather_id: u32, precipitation: f64) -> WeatherReading {
        WeatherReading {
            temperature,
            wind_speed,
            weather_main: "Test".to_string(),
            weather_id,
            precipitation,
        }
    }

    #[test]
    fn test_calm_weather_has_no_bump() {
        let risk = evaluate_weather(&reading(0.0, 0.0, 0, 0.0));
        assert_eq!(risk.weather_risk_bump, 0);
        assert!(risk.reasons.is_empty());
        assert!(!risk.is_elevated());
    }

    #[test]
    fn test_precipitation_bands() {
        assert_eq!(evaluate_weather(&reading(10.0, 0.0, 800, 0.5)).weather_risk_bump, 1);
        assert_eq!(evaluate_weather(&reading(10.0, 0.0, 800, 2.0)).weather_risk_bump, 1);
        assert_eq!(evaluate_weather(&reading(10.0, 0.0, 800, 2.1)).weather_risk_bump, 2);
        assert_eq!(evaluate_weather(&reading(10.0, 0.0, 800, 10.0)).weather_risk_bump, 2);
        assert_eq!(evaluate_weather(&reading(10.0, 0.0, 800, 10.1)).weather_risk_bump, 3);
    }

    #[test]
    fn test_wind_bands() {
        assert_eq!(evaluate_weather(&reading(10.0, 7.9, 800, 0.0)).weather_risk_bump, 0);
        assert_eq!(evaluate_weather(&reading(10.0, 8.0, 800, 0.0)).weather_risk_bump, 1);
        assert_eq!(evaluate_weather(&reading(10.0, 15.0, 800, 0.0)).weather_risk_bump, 1);
        assert_eq!(evaluate_weather(&reading(10.0, 15.1, 800, 0.0)).weather_risk_bump, 2);
    }

    #[test]
    fn test_temperature_and_conditions() {
        let freezing = evaluate_weather(&reading(-3.0, 0.0, 800, 0.0));
        assert_eq!(freezing.weather_risk_bump, 1);
        assert_eq!(freezing.reasons, vec!["Sub-zero temperature"]);

        let heat = evaluate_weather(&reading(36.0, 0.0, 800, 0.0));
        assert_eq!(heat.reasons, vec!["Extreme heat"]);

        let storm = evaluate_weather(&reading(20.0, 0.0, 211, 0.0));
        assert_eq!(storm.weather_risk_bump, 2);
        assert_eq!(storm.reasons, vec!["Thunderstorm"]);

        assert_eq!(evaluate_weather(&reading(20.0, 0.0, 700, 0.0)).weather_risk_bump, 0);
    }

    #[test]
    fn test_bump_is_clamped_but_reasons_are_kept() {
        let blizzard = evaluate_weather(&reading(-8.0, 20.0, 602, 12.0));
        assert_eq!(blizzard.weather_risk_bump, MAX_WEATHER_BUMP);
        assert_eq!(
            blizzard.reasons,
            vec!["Heavy precipitation", "Strong wind", "Sub-zero temperature", "Snow conditions"]
        );
    }

    #[test]
    fn test_missing_fields_default_to_neutral() {
        let parsed: WeatherReading = serde_json::from_str(r#"{"temperature": 12.5}"#).unwrap();
        assert_eq!(parsed.weather_main, "Unknown");
        assert_eq!(parsed.precipitation, 0.0);
        assert_eq!(evaluate_weather(&parsed).weather_risk_bump, 0);
    }
}
