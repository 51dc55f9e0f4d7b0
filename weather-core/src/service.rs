use std::sync::Arc;

use tracing::{info, instrument};

use crate::{
    error::ApiError,
    forecast::group_by_day,
    model::WeatherReport,
    provider::{WeatherProvider, openweather::parse_current},
};

/// Orchestrates one weather lookup: validate, fetch, aggregate, assemble.
#[derive(Debug, Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Build the report for `city`.
    ///
    /// A missing or blank city fails before the provider is called.
    #[instrument(skip(self))]
    pub async fn report(&self, city: Option<&str>) -> Result<WeatherReport, ApiError> {
        let city = city.map(str::trim).filter(|c| !c.is_empty()).ok_or_else(|| {
            ApiError::validation("parameter 'city' is required", "city", "required")
        })?;

        let payloads = self.provider.fetch(city).await?;

        let current = parse_current(&payloads.weather)?;
        let weekly_forecast = group_by_day(&payloads.forecast)?;

        info!(city = %current.city, days = weekly_forecast.len(), "Weather report assembled");

        Ok(WeatherReport {
            city: current.city,
            current_weather: current.conditions,
            weekly_forecast,
        })
    }
}
