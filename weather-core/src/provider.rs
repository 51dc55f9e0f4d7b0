use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::ApiError, model::UpstreamPayloads};

pub mod openweather;

/// Source of current weather and forecast payloads for a city.
///
/// Implementations classify every failure into an [`ApiError`] and never
/// retry.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch the current-weather and forecast payloads for `city`.
    ///
    /// Both must succeed; the first failure is returned as-is.
    async fn fetch(&self, city: &str) -> Result<UpstreamPayloads, ApiError>;
}
