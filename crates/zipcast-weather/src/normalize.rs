//! Open-Meteo payload -> [`NormalizedForecast`].

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::MalformedPayloadError;
use crate::types::{DailyForecastEntry, NormalizedForecast, RawForecastPayload};

/// Normalize a raw forecast body.
///
/// Zips `daily.time`, `daily.temperature_2m_max` and `daily.temperature_2m_min`
/// positionally, keeping provider order. Temperatures and dates are passed
/// through as-is.
///
/// # Errors
/// Returns [`MalformedPayloadError`] when the body is not JSON, a required
/// field is missing or has the wrong type, the daily arrays differ in length,
/// or there are no days.
pub fn normalize(payload: &RawForecastPayload) -> Result<NormalizedForecast, MalformedPayloadError> {
    let root: Value = serde_json::from_str(payload.as_str())
        .map_err(|e| MalformedPayloadError::NotJson(e.to_string()))?;

    let current = field(&root, "current", "current")?;
    let current_temperature: f64 = extract(current, "temperature_2m", "current.temperature_2m")?;

    let daily = field(&root, "daily", "daily")?;
    let time: Vec<String> = extract(daily, "time", "daily.time")?;
    let max: Vec<f64> = extract(daily, "temperature_2m_max", "daily.temperature_2m_max")?;
    let min: Vec<f64> = extract(daily, "temperature_2m_min", "daily.temperature_2m_min")?;

    if time.len() != max.len() || time.len() != min.len() {
        return Err(MalformedPayloadError::LengthMismatch {
            time: time.len(),
            max: max.len(),
            min: min.len(),
        });
    }

    let daily_forecast: Vec<DailyForecastEntry> = time
        .into_iter()
        .zip(max)
        .zip(min)
        .map(|((date, high), low)| DailyForecastEntry { date, high, low })
        .collect();

    NormalizedForecast::from_daily(current_temperature, daily_forecast)
        .ok_or(MalformedPayloadError::EmptyForecast)
}

fn field<'a>(
    parent: &'a Value,
    key: &str,
    path: &'static str,
) -> Result<&'a Value, MalformedPayloadError> {
    match parent.get(key) {
        Some(Value::Null) | None => Err(MalformedPayloadError::MissingField(path)),
        Some(v) => Ok(v),
    }
}

fn extract<T: DeserializeOwned>(
    parent: &Value,
    key: &str,
    path: &'static str,
) -> Result<T, MalformedPayloadError> {
    let value = field(parent, key, path)?;
    T::deserialize(value).map_err(|e| MalformedPayloadError::WrongType {
        field: path,
        message: e.to_string(),
    })
}
