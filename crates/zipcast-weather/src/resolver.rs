//! Cache-aside forecast resolution: address -> postal code -> coordinates -> forecast.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::ForecastCache;
use crate::error::ForecastFetchError;
use crate::geocode::GeocodingProvider;
use crate::normalize::normalize;
use crate::provider::WeatherProvider;
use crate::types::{NormalizedForecast, PostalCode, ResolutionResult};

/// How long a fetched forecast stays in the cache.
pub const FORECAST_TTL: Duration = Duration::from_secs(30 * 60);

/// Resolves addresses to forecasts, consulting the cache before the providers.
///
/// Holds only shared handles, so clones are cheap and concurrent calls are
/// independent. Two concurrent misses for the same postal code both fetch;
/// the later write wins.
#[derive(Clone)]
pub struct ForecastResolver {
    geocoder: Arc<dyn GeocodingProvider>,
    weather: Arc<dyn WeatherProvider>,
    cache: Arc<dyn ForecastCache>,
}

impl ForecastResolver {
    pub fn new(
        geocoder: Arc<dyn GeocodingProvider>,
        weather: Arc<dyn WeatherProvider>,
        cache: Arc<dyn ForecastCache>,
    ) -> Self {
        Self {
            geocoder,
            weather,
            cache,
        }
    }

    /// Resolve `address` to a forecast.
    ///
    /// Blank or ungeocodable addresses yield [`ResolutionResult::not_found`].
    ///
    /// # Errors
    /// Any geocoding, transport or payload failure is returned as a
    /// [`ForecastFetchError`]. Nothing is cached in that case.
    pub async fn resolve(&self, address: &str) -> Result<ResolutionResult, ForecastFetchError> {
        if address.trim().is_empty() {
            return Ok(ResolutionResult::not_found());
        }

        let result = self.resolve_inner(address).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, cause = ?e, "Error fetching forecast data");
        }
        result
    }

    async fn resolve_inner(&self, address: &str) -> Result<ResolutionResult, ForecastFetchError> {
        let postal_code = self
            .geocoder
            .resolve_postal_code(address)
            .await
            .map_err(ForecastFetchError::Geocoding)?;

        let Some(postal_code) = postal_code else {
            tracing::info!("No postal code found for address");
            return Ok(ResolutionResult::not_found());
        };

        if let Some(cached) = self.cache.get(&postal_code) {
            tracing::debug!(postal_code = %postal_code, "Forecast cache hit");
            return Ok(ResolutionResult::found(postal_code, cached, true));
        }

        tracing::debug!(postal_code = %postal_code, "Forecast cache miss");
        let forecast = self.fetch(address, &postal_code).await?;
        self.cache.put(&postal_code, forecast.clone(), FORECAST_TTL);

        tracing::info!(postal_code = %postal_code, days = forecast.daily_forecast().len(), "Fetched fresh forecast");
        Ok(ResolutionResult::found(postal_code, forecast, false))
    }

    async fn fetch(
        &self,
        address: &str,
        postal_code: &PostalCode,
    ) -> Result<NormalizedForecast, ForecastFetchError> {
        let coordinates = self
            .geocoder
            .resolve_coordinates(address)
            .await
            .map_err(ForecastFetchError::Geocoding)?
            .ok_or_else(|| ForecastFetchError::CoordinatesUnavailable {
                postal_code: postal_code.to_string(),
            })?;

        let raw = self
            .weather
            .fetch_raw_forecast(coordinates)
            .await
            .map_err(ForecastFetchError::Weather)?;

        Ok(normalize(&raw)?)
    }
}
