//! Forecast lookup for zipcast
//!
//! Resolves a free-text address to a postal code, then serves a short-range
//! forecast from a 30 minute cache keyed on that postal code, falling back to
//! Nominatim geocoding and the Open-Meteo API on a miss.

pub mod cache;
pub mod error;
pub mod geocode;
pub mod normalize;
pub mod provider;
pub mod resolver;
pub mod types;

pub use cache::{CacheKey, ForecastCache, MemoryForecastCache, FORECAST_NAMESPACE};
pub use error::{ForecastFetchError, MalformedPayloadError, ReqwestErrorExt, TransportError};
pub use geocode::{GeocodingProvider, NominatimGeocoder, NOMINATIM_URL};
pub use normalize::normalize;
pub use provider::{OpenMeteoProvider, WeatherProvider, OPEN_METEO_URL};
pub use resolver::{ForecastResolver, FORECAST_TTL};
pub use types::*;
