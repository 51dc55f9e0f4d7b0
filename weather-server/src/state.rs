//! Application state shared across handlers

use std::sync::Arc;

use weather_core::{ProvinceDirectory, WeatherService};

/// Shared application state. Both parts are read-only after startup.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Weather lookups against the upstream provider
    pub weather: Arc<WeatherService>,
    /// Province -> cities table
    pub provinces: Arc<ProvinceDirectory>,
}

impl AppState {
    pub fn new(weather: WeatherService, provinces: ProvinceDirectory) -> Self {
        Self { weather: Arc::new(weather), provinces: Arc::new(provinces) }
    }
}
