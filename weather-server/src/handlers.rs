//! HTTP handlers
//!
//! Handlers only extract parameters and delegate to `weather_core`. Every
//! failure leaves through [`HttpError`].

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::Uri,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use weather_core::{ApiError, City, WeatherReport};

use crate::{error::HttpError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct WeatherParams {
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProvinceParams {
    pub province: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NameParams {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IsProvinceResponse {
    pub is_province: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DefaultCityResponse {
    pub province: String,
    pub city: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

fn reject_query(rejection: QueryRejection) -> ApiError {
    ApiError::bad_request(format!("invalid query string: {}", rejection.body_text()))
}

fn required_province(params: &ProvinceParams) -> Result<&str, ApiError> {
    params.province.as_deref().map(str::trim).filter(|p| !p.is_empty()).ok_or_else(|| {
        ApiError::validation("parameter 'province' is required", "province", "required")
    })
}

/// Current weather and daily forecast for a city.
///
/// GET /weather?city=<name>
#[instrument(skip(state, params))]
pub async fn weather(
    State(state): State<AppState>,
    params: Result<Query<WeatherParams>, QueryRejection>,
) -> Result<Json<WeatherReport>, HttpError> {
    let Query(params) = params.map_err(reject_query)?;
    let report = state.weather.report(params.city.as_deref()).await?;
    Ok(Json(report))
}

/// Cities of a province.
///
/// GET /cities_by_province?province=<name>
#[instrument(skip(state, params))]
pub async fn cities_by_province(
    State(state): State<AppState>,
    params: Result<Query<ProvinceParams>, QueryRejection>,
) -> Result<Json<Vec<City>>, HttpError> {
    let Query(params) = params.map_err(reject_query)?;
    let province = required_province(&params)?;

    let cities = state.provinces.cities(province)?;
    debug!(province, count = cities.len(), "Cities found");
    Ok(Json(cities.to_vec()))
}

/// The city a province preselects: the flagged one, else the first listed.
///
/// GET /default_city?province=<name>
#[instrument(skip(state, params))]
pub async fn default_city(
    State(state): State<AppState>,
    params: Result<Query<ProvinceParams>, QueryRejection>,
) -> Result<Json<DefaultCityResponse>, HttpError> {
    let Query(params) = params.map_err(reject_query)?;
    let province = required_province(&params)?;

    let city = state.provinces.default_city(province)?;
    Ok(Json(DefaultCityResponse { province: province.to_string(), city: city.name().to_string() }))
}

/// Whether `name` (trimmed) is a known province. Never fails.
///
/// GET /is_province?name=<name>
pub async fn is_province(
    State(state): State<AppState>,
    params: Result<Query<NameParams>, QueryRejection>,
) -> Json<IsProvinceResponse> {
    let is_province = params
        .ok()
        .and_then(|Query(p)| p.name)
        .is_some_and(|name| state.provinces.is_province(name.trim()));

    Json(IsProvinceResponse { is_province })
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Fallback for unknown routes.
pub async fn not_found(uri: Uri) -> HttpError {
    HttpError(ApiError::not_found(format!("no route for {}", uri.path())))
}
