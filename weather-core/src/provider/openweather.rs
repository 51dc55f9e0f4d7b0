use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{
    config::OpenWeatherConfig,
    error::ApiError,
    model::{CurrentConditions, CurrentWeather, ForecastSample, UpstreamPayloads},
};

use super::WeatherProvider;

/// Format of `dt_txt` in forecast samples.
const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Temperatures are always requested in Celsius.
const UNITS: &str = "metric";
/// Descriptions are always requested in Spanish.
const LANG: &str = "es";

/// The two OpenWeatherMap endpoints we call. Each has its own error wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Weather,
    Forecast,
}

impl Endpoint {
    fn service(self) -> &'static str {
        match self {
            Endpoint::Weather => "weather",
            Endpoint::Forecast => "forecast",
        }
    }

    /// Map a non-2xx upstream response to a typed error.
    pub fn status_error(self, status: StatusCode, city: &str, body: &str) -> ApiError {
        match (status, self) {
            (StatusCode::UNAUTHORIZED, Endpoint::Weather) => {
                ApiError::unauthorized("invalid or missing OpenWeatherMap API key")
            }
            (StatusCode::UNAUTHORIZED, Endpoint::Forecast) => {
                ApiError::unauthorized("invalid or missing OpenWeatherMap API key for forecast")
            }
            (StatusCode::NOT_FOUND, Endpoint::Weather) => {
                ApiError::not_found(format!("city '{city}' not found by weather service"))
            }
            (StatusCode::NOT_FOUND, Endpoint::Forecast) => ApiError::not_found(format!(
                "forecast for city '{city}' not found by weather service"
            )),
            (StatusCode::BAD_REQUEST, endpoint) => ApiError::bad_request(format!(
                "bad {} request to OpenWeatherMap",
                endpoint.service()
            )),
            (status, endpoint) => ApiError::internal(format!(
                "external {} service error: {} - {}",
                endpoint.service(),
                status.as_u16(),
                truncate_body(body),
            )),
        }
    }

    /// Map a transport failure (no usable HTTP response) to a typed error.
    pub fn transport_error(self, err: &reqwest::Error) -> ApiError {
        let service = self.service();
        if err.is_timeout() {
            ApiError::gateway_timeout(format!("{service} service took too long to respond"))
        } else if err.is_connect() {
            ApiError::service_unavailable(format!(
                "could not connect to the {service} service, check the internet connection"
            ))
        } else {
            ApiError::internal(format!(
                "unexpected error communicating with the {service} service: {err}"
            ))
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    weather_url: String,
    forecast_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: impl Into<String>, config: &OpenWeatherConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client for OpenWeatherMap")?;

        Ok(Self {
            api_key: api_key.into(),
            weather_url: config.weather_url.clone(),
            forecast_url: config.forecast_url.clone(),
            http,
        })
    }

    fn url(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Weather => &self.weather_url,
            Endpoint::Forecast => &self.forecast_url,
        }
    }

    /// One GET against `endpoint`, decoded as UTF-8 JSON whatever the declared charset.
    async fn get_json(&self, endpoint: Endpoint, city: &str) -> Result<Value, ApiError> {
        let res = self
            .http
            .get(self.url(endpoint))
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", UNITS),
                ("lang", LANG),
            ])
            .send()
            .await
            .map_err(|e| endpoint.transport_error(&e))?;

        let status = res.status();
        let body = res.bytes().await.map_err(|e| endpoint.transport_error(&e))?;

        if !status.is_success() {
            let err = endpoint.status_error(status, city, &String::from_utf8_lossy(&body));
            warn!(endpoint = endpoint.service(), status = status.as_u16(), "Upstream request failed");
            return Err(err);
        }

        debug!(endpoint = endpoint.service(), bytes = body.len(), "Upstream response received");

        serde_json::from_slice(&body).map_err(|e| {
            ApiError::internal(format!(
                "invalid JSON from the {} service: {e}",
                endpoint.service()
            ))
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[instrument(skip(self), fields(city = %city))]
    async fn fetch(&self, city: &str) -> Result<UpstreamPayloads, ApiError> {
        let weather = self.get_json(Endpoint::Weather, city).await?;
        let forecast = self.get_json(Endpoint::Forecast, city).await?;

        Ok(UpstreamPayloads { weather, forecast })
    }
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwCurrentMain,
    weather: Vec<OwCondition>,
}

#[derive(Debug, Deserialize)]
struct OwTempRange {
    temp_max: f64,
    temp_min: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwRain {
    #[serde(rename = "3h", default)]
    three_hours: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwTempRange,
    weather: Vec<OwCondition>,
    /// Absent means no rain; `null` is a structural fault.
    #[serde(default)]
    rain: OwRain,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

/// Extract the current conditions from a weather payload.
pub fn parse_current(payload: &Value) -> Result<CurrentWeather, ApiError> {
    let parsed = OwCurrentResponse::deserialize(payload).map_err(|e| {
        ApiError::internal(format!("unexpected current weather data structure: {e}"))
    })?;

    let condition = parsed.weather.into_iter().next().ok_or_else(|| {
        ApiError::internal("unexpected current weather data structure: empty `weather` list")
    })?;

    Ok(CurrentWeather {
        city: parsed.name,
        conditions: CurrentConditions {
            temp: parsed.main.temp,
            description: condition.description,
            icon: condition.icon,
        },
    })
}

/// Extract the samples of a forecast payload, in input order.
///
/// Any missing or mistyped field fails the whole payload.
pub fn parse_forecast(payload: &Value) -> Result<Vec<ForecastSample>, ApiError> {
    let parsed = OwForecastResponse::deserialize(payload).map_err(|e| {
        ApiError::internal(format!("error processing forecast data: unexpected structure: {e}"))
    })?;

    parsed
        .list
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let timestamp = NaiveDateTime::parse_from_str(&entry.dt_txt, DT_TXT_FORMAT)
                .map_err(|e| {
                    ApiError::internal(format!(
                        "error processing forecast data: sample {i} has invalid dt_txt '{}': {e}",
                        entry.dt_txt
                    ))
                })?;

            let condition = entry.weather.into_iter().next().ok_or_else(|| {
                ApiError::internal(format!(
                    "error processing forecast data: sample {i} has an empty `weather` list"
                ))
            })?;

            Ok(ForecastSample {
                timestamp,
                temp_max: entry.main.temp_max,
                temp_min: entry.main.temp_min,
                description: condition.description,
                icon: condition.icon,
                rain_3h_mm: entry.rain.three_hours,
            })
        })
        .collect()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
