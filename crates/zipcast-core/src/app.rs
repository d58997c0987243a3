use serde::Serialize;
use std::sync::Arc;

use zipcast_weather::{
    ForecastResolver, MemoryForecastCache, NominatimGeocoder, OpenMeteoProvider, ResolutionResult,
};

use crate::{AppError, Config};

/// Shown when the geocoder has no postal code for the address.
pub const NOT_FOUND_MESSAGE: &str = "Couldn't find a zip code for that address";

/// What the front end should show for one address.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Lookup {
    /// Nothing was entered
    Empty,
    NotFound { message: &'static str },
    Forecast(ResolutionResult),
    Failed { message: &'static str },
}

/// Application wiring: one shared resolver and cache built from config.
pub struct App {
    resolver: ForecastResolver,
}

impl App {
    /// Build the providers and resolver from `config`.
    ///
    /// # Errors
    /// Fails when an HTTP client cannot be constructed.
    pub fn with_config(config: &Config) -> Result<Self, AppError> {
        let geocoder = NominatimGeocoder::with_options(
            &config.geocoding.base_url,
            &config.geocoding.user_agent,
            config.geocoding.timeout(),
        )?;
        let weather =
            OpenMeteoProvider::with_options(&config.weather.forecast_url, config.weather.timeout())?;
        let cache = Arc::new(MemoryForecastCache::new());

        let resolver = ForecastResolver::new(Arc::new(geocoder), Arc::new(weather), cache);
        tracing::debug!(
            geocoding = %config.geocoding.base_url,
            weather = %config.weather.forecast_url,
            "Forecast resolver ready"
        );

        Ok(Self { resolver })
    }

    /// Resolve one address into something displayable. Never fails; errors
    /// are logged by the resolver and reported with a generic message.
    pub async fn lookup(&self, address: &str) -> Lookup {
        if address.trim().is_empty() {
            return Lookup::Empty;
        }

        match self.resolver.resolve(address).await {
            Ok(result) if result.is_not_found() => Lookup::NotFound {
                message: NOT_FOUND_MESSAGE,
            },
            Ok(result) => Lookup::Forecast(result),
            Err(e) => Lookup::Failed {
                message: AppError::from(e).user_message(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn app_against(server: &MockServer) -> App {
        let mut config = Config::default();
        config.geocoding.base_url = server.uri();
        config.weather.forecast_url = format!("{}/v1/forecast", server.uri());
        App::with_config(&config).unwrap()
    }

    async fn mount_search(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_blank_address_is_empty() {
        let server = MockServer::start().await;
        let app = app_against(&server).await;

        assert_eq!(app.lookup("  ").await, Lookup::Empty);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_address_reports_not_found() {
        let server = MockServer::start().await;
        mount_search(&server, serde_json::json!([])).await;
        let app = app_against(&server).await;

        let lookup = app.lookup("invalid address").await;
        assert_eq!(lookup, Lookup::NotFound { message: NOT_FOUND_MESSAGE });
    }

    #[tokio::test]
    async fn test_service_error_reports_generic_failure() {
        let server = MockServer::start().await;
        mount_search(
            &server,
            serde_json::json!([{"lat": "45.0", "lon": "-93.0", "address": {"postcode": "12345"}}]),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let app = app_against(&server).await;

        let lookup = app.lookup("valid address").await;
        assert_eq!(
            lookup,
            Lookup::Failed {
                message: "Error fetching forecast data. Please try again later."
            }
        );
    }

    #[tokio::test]
    async fn test_valid_address_returns_forecast() {
        let server = MockServer::start().await;
        mount_search(
            &server,
            serde_json::json!([{"lat": "45.0", "lon": "-93.0", "address": {"postcode": "12345"}}]),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "current": {"temperature_2m": 70},
                "daily": {"time": ["2024-01-01"], "temperature_2m_max": [75], "temperature_2m_min": [65]}
            })))
            .mount(&server)
            .await;
        let app = app_against(&server).await;

        match app.lookup("valid address").await {
            Lookup::Forecast(result) => {
                assert!(!result.served_from_cache);
                assert_eq!(result.forecast.unwrap().current_temperature(), 70.0);
            }
            other => panic!("expected forecast, got {other:?}"),
        }
    }

    #[test]
    fn test_lookup_json_shape() {
        let json = serde_json::to_value(Lookup::NotFound { message: NOT_FOUND_MESSAGE }).unwrap();
        assert_eq!(json["status"], "not_found");
        assert_eq!(json["message"], NOT_FOUND_MESSAGE);
    }
}
