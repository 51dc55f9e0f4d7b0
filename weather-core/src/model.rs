use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw decoded bodies of the two upstream calls.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamPayloads {
    pub weather: Value,
    pub forecast: Value,
}

/// Condensed current conditions as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp: f64,
    pub description: String,
    pub icon: String,
}

/// Current weather for a city, built from the provider's weather payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    /// Display name as reported by the provider.
    pub city: String,
    pub conditions: CurrentConditions,
}

/// One 3-hourly forecast slice.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    pub timestamp: NaiveDateTime,
    pub temp_max: f64,
    pub temp_min: f64,
    pub description: String,
    pub icon: String,
    /// Rain over the previous 3 hours, 0 when the provider omits it.
    pub rain_3h_mm: f64,
}

impl ForecastSample {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Aggregated forecast for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temp_max: f64,
    pub temp_min: f64,
    pub description: String,
    pub icon: String,
    pub rain_volume_mm: f64,
}

/// Response body of the weather endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub city: String,
    pub current_weather: CurrentConditions,
    pub weekly_forecast: Vec<DailyForecast>,
}
