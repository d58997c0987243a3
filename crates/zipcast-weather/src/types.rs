use serde::Serialize;
use std::fmt;

/// Postal code returned by the geocoder. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PostalCode(String);

impl PostalCode {
    /// Build a postal code from provider text. Returns `None` for blank input.
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Returns `None` unless latitude is within [-90, 90] and longitude within [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let lat_ok = (-90.0..=90.0).contains(&latitude);
        let lon_ok = (-180.0..=180.0).contains(&longitude);
        if lat_ok && lon_ok {
            Some(Self {
                latitude,
                longitude,
            })
        } else {
            None
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Forecast body exactly as the weather provider returned it. Not parsed
/// until normalization, so a non-JSON body is a payload problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawForecastPayload(String);

impl RawForecastPayload {
    pub fn new(body: impl Into<String>) -> Self {
        Self(body.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<serde_json::Value> for RawForecastPayload {
    fn from(value: serde_json::Value) -> Self {
        Self(value.to_string())
    }
}

/// Daily forecast entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecastEntry {
    /// Calendar date as sent by the provider (not reparsed)
    pub date: String,
    pub high: f64,
    pub low: f64,
}

/// Forecast after normalization.
///
/// `high_temperature` and `low_temperature` always mirror the first daily
/// entry, and there is always at least one. Build with
/// [`NormalizedForecast::from_daily`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedForecast {
    current_temperature: f64,
    high_temperature: f64,
    low_temperature: f64,
    daily_forecast: Vec<DailyForecastEntry>,
}

impl NormalizedForecast {
    /// Returns `None` when `daily_forecast` is empty.
    pub fn from_daily(current_temperature: f64, daily_forecast: Vec<DailyForecastEntry>) -> Option<Self> {
        let today = daily_forecast.first()?;
        Some(Self {
            current_temperature,
            high_temperature: today.high,
            low_temperature: today.low,
            daily_forecast,
        })
    }

    pub fn current_temperature(&self) -> f64 {
        self.current_temperature
    }

    /// Today's high, same as `daily_forecast()[0].high`
    pub fn high_temperature(&self) -> f64 {
        self.high_temperature
    }

    /// Today's low, same as `daily_forecast()[0].low`
    pub fn low_temperature(&self) -> f64 {
        self.low_temperature
    }

    /// Never empty
    pub fn daily_forecast(&self) -> &[DailyForecastEntry] {
        &self.daily_forecast
    }
}

/// Outcome of resolving one address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionResult {
    pub postal_code: Option<PostalCode>,
    pub forecast: Option<NormalizedForecast>,
    pub served_from_cache: bool,
}

impl ResolutionResult {
    /// Nothing resolvable: blank address or no postal code.
    pub fn not_found() -> Self {
        Self {
            postal_code: None,
            forecast: None,
            served_from_cache: false,
        }
    }

    pub fn found(postal_code: PostalCode, forecast: NormalizedForecast, served_from_cache: bool) -> Self {
        Self {
            postal_code: Some(postal_code),
            forecast: Some(forecast),
            served_from_cache,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.postal_code.is_none()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_postal_code_rejects_blank() {
        assert!(PostalCode::new("").is_none());
        assert!(PostalCode::new("   ").is_none());
    }

    #[test]
    fn test_postal_code_trims() {
        let code = PostalCode::new(" 99362 ").unwrap();
        assert_eq!(code.as_str(), "99362");
        assert_eq!(code.to_string(), "99362");
    }

    #[test]
    fn test_coordinates_range() {
        assert!(Coordinates::new(46.06, -118.34).is_some());
        assert!(Coordinates::new(90.0, 180.0).is_some());
        assert!(Coordinates::new(-90.0, -180.0).is_some());
        assert!(Coordinates::new(90.5, 0.0).is_none());
        assert!(Coordinates::new(0.0, -180.5).is_none());
        assert!(Coordinates::new(f64::NAN, 0.0).is_none());
    }

    #[test]
    fn test_forecast_high_low_follow_first_day() {
        let daily = vec![
            DailyForecastEntry { date: "2024-01-01".into(), high: 75.0, low: 65.0 },
            DailyForecastEntry { date: "2024-01-02".into(), high: 55.0, low: 35.0 },
        ];
        let forecast = NormalizedForecast::from_daily(70.0, daily).unwrap();
        assert_eq!(forecast.current_temperature(), 70.0);
        assert_eq!(forecast.high_temperature(), 75.0);
        assert_eq!(forecast.low_temperature(), 65.0);
        assert_eq!(forecast.daily_forecast().len(), 2);
    }

    #[test]
    fn test_serialized_forecast_keeps_first_day_high_low() {
        let daily = vec![
            DailyForecastEntry { date: "2024-01-01".into(), high: 75.0, low: 65.0 },
            DailyForecastEntry { date: "2024-01-02".into(), high: 55.0, low: 35.0 },
        ];
        let json = serde_json::to_value(NormalizedForecast::from_daily(70.0, daily).unwrap()).unwrap();

        assert_eq!(json["high_temperature"], json["daily_forecast"][0]["high"]);
        assert_eq!(json["low_temperature"], json["daily_forecast"][0]["low"]);
        assert_eq!(json["daily_forecast"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_coordinates_accessors() {
        let coords = Coordinates::new(46.06, -118.34).unwrap();
        assert_eq!(coords.latitude(), 46.06);
        assert_eq!(coords.longitude(), -118.34);
    }

    #[test]
    fn test_raw_payload_keeps_body_text() {
        let raw = RawForecastPayload::new("<html>busy</html>");
        assert_eq!(raw.as_str(), "<html>busy</html>");
        let from_json = RawForecastPayload::from(serde_json::json!({"daily": {}}));
        assert_eq!(from_json.as_str(), r#"{"daily":{}}"#);
    }

    #[test]
    fn test_forecast_requires_a_day() {
        assert!(NormalizedForecast::from_daily(70.0, Vec::new()).is_none());
    }

    #[test]
    fn test_result_serialization() {
        let result = ResolutionResult::not_found();
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"postal_code":null,"forecast":null,"served_from_cache":false}"#);
        assert!(result.is_not_found());
    }
}
