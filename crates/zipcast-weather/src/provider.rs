//! Weather provider: coordinates to raw Open-Meteo forecast JSON.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::error::TransportError;
use crate::types::{Coordinates, RawForecastPayload};

pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Weather capability used by the resolver.
///
/// One outbound request per call; no caching at this layer.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch_raw_forecast(&self, coordinates: Coordinates) -> Result<RawForecastPayload, TransportError>;
}

/// Open-Meteo forecast client. Always requests Fahrenheit.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    client: Arc<Client>,
    forecast_url: String,
}

impl OpenMeteoProvider {
    /// # Errors
    /// Fails if the HTTP client cannot be built.
    pub fn with_options(forecast_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            forecast_url: forecast_url.to_string(),
        })
    }

    fn query(coordinates: Coordinates) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", coordinates.latitude().to_string()),
            ("longitude", coordinates.longitude().to_string()),
            ("temperature_unit", "fahrenheit".to_string()),
            ("current", "temperature_2m".to_string()),
            ("daily", "temperature_2m_max,temperature_2m_min".to_string()),
            ("timezone", "auto".to_string()),
        ]
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn fetch_raw_forecast(&self, coordinates: Coordinates) -> Result<RawForecastPayload, TransportError> {
        tracing::debug!(
            latitude = coordinates.latitude(),
            longitude = coordinates.longitude(),
            "Requesting forecast"
        );

        let response = self
            .client
            .get(&self.forecast_url)
            .query(&Self::query(coordinates))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // Shape, including whether it is JSON at all, is checked by `normalize`.
        let body = response.text().await?;

        Ok(RawForecastPayload::new(body))
    }
}
