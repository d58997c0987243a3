//! Forward geocoding: free-text address to postal code and coordinates.
//! The bundled adapter uses Nominatim (OpenStreetMap) - free, no API key required.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::error::TransportError;
use crate::types::{Coordinates, PostalCode};

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Geocoding capability used by the resolver.
///
/// "Not found" is `Ok(None)`. `Err` is reserved for transport failures.
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    async fn resolve_postal_code(&self, address: &str) -> Result<Option<PostalCode>, TransportError>;

    async fn resolve_coordinates(&self, address: &str) -> Result<Option<Coordinates>, TransportError>;
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: Option<String>,
    lon: Option<String>,
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    postcode: Option<String>,
}

/// Nominatim forward-search client.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Arc<Client>,
    base_url: String,
}

impl NominatimGeocoder {
    /// # Errors
    /// Fails if the HTTP client cannot be built.
    pub fn with_options(
        base_url: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// First search hit for `address`, if any.
    async fn search(&self, address: &str) -> Result<Option<NominatimPlace>, TransportError> {
        let url = format!("{}/search", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", address),
                ("format", "jsonv2"),
                ("addressdetails", "1"),
                ("limit", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Geocode search returned status {}", status);
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        Ok(places.into_iter().next())
    }
}

#[async_trait]
impl GeocodingProvider for NominatimGeocoder {
    async fn resolve_postal_code(&self, address: &str) -> Result<Option<PostalCode>, TransportError> {
        let code = self
            .search(address)
            .await?
            .and_then(|place| place.address)
            .and_then(|addr| addr.postcode)
            .and_then(PostalCode::new);

        match &code {
            Some(code) => tracing::debug!("Geocoded postal code {}", code),
            None => tracing::debug!("No postal code for address"),
        }
        Ok(code)
    }

    async fn resolve_coordinates(&self, address: &str) -> Result<Option<Coordinates>, TransportError> {
        let Some(place) = self.search(address).await? else {
            return Ok(None);
        };

        let lat = place.lat.as_deref().and_then(|s| s.trim().parse::<f64>().ok());
        let lon = place.lon.as_deref().and_then(|s| s.trim().parse::<f64>().ok());

        let coords = match (lat, lon) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon),
            _ => None,
        };

        if coords.is_none() {
            tracing::debug!(lat = ?place.lat, lon = ?place.lon, "Unusable coordinates from geocoder");
        }
        Ok(coords)
    }
}
