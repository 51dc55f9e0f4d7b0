//! Daily aggregation of 3-hourly forecast samples.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::Value;

use crate::{
    error::ApiError,
    model::{DailyForecast, ForecastSample},
    provider::openweather::parse_forecast,
};

/// Maximum number of days returned.
pub const MAX_DAYS: usize = 7;

/// Group the samples of a forecast payload into daily summaries.
///
/// Structural problems in the payload are reported as internal errors, never
/// as a partial result. An empty `list` yields an empty summary.
pub fn group_by_day(payload: &Value) -> Result<Vec<DailyForecast>, ApiError> {
    let samples = parse_forecast(payload)?;
    Ok(summarize(&samples))
}

/// Fold samples into at most [`MAX_DAYS`] summaries sorted by date.
///
/// Temperatures widen with every sample of the day and rain accumulates.
/// Description and icon come from the first sample seen for each day.
pub fn summarize(samples: &[ForecastSample]) -> Vec<DailyForecast> {
    let mut daily: BTreeMap<NaiveDate, DailyForecast> = BTreeMap::new();

    for sample in samples {
        daily
            .entry(sample.date())
            .and_modify(|day| {
                day.temp_max = day.temp_max.max(sample.temp_max);
                day.temp_min = day.temp_min.min(sample.temp_min);
                day.rain_volume_mm += sample.rain_3h_mm;
            })
            .or_insert_with(|| DailyForecast {
                date: sample.date(),
                temp_max: sample.temp_max,
                temp_min: sample.temp_min,
                description: sample.description.clone(),
                icon: sample.icon.clone(),
                rain_volume_mm: sample.rain_3h_mm,
            });
    }

    daily.into_values().take(MAX_DAYS).collect()
}
