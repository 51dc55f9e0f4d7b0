//! Core library for the weather proxy.
//!
//! This crate defines:
//! - The typed error taxonomy rendered by the HTTP boundary
//! - Configuration & credentials handling
//! - The OpenWeatherMap client and its payload parsing
//! - Daily aggregation of the 5-day/3-hour forecast
//! - The province -> cities lookup table
//!
//! It is used by `weather-server`, but has no dependency on any web framework.

pub mod cities;
pub mod config;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod service;

pub use cities::{City, ProvinceDirectory};
pub use config::{Config, OpenWeatherConfig, ServerConfig};
pub use error::{ApiError, FieldErrors};
pub use model::{CurrentConditions, DailyForecast, UpstreamPayloads, WeatherReport};
pub use provider::{WeatherProvider, openweather::OpenWeatherClient};
pub use service::WeatherService;
