//! Error types for the forecast pipeline.
//!
//! "Address not resolvable" is not an error here: it travels as an absent
//! postal code in [`crate::ResolutionResult`].

use thiserror::Error;

/// Network or provider failure from either adapter.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Client setup failed: {0}")]
    Client(String),
}

/// Extension trait for converting reqwest errors to transport errors.
pub trait ReqwestErrorExt {
    fn into_transport_error(self) -> TransportError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_transport_error(self) -> TransportError {
        if self.is_timeout() {
            TransportError::Timeout
        } else if self.is_connect() {
            TransportError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            TransportError::Status {
                status: status.as_u16(),
                body: self.to_string(),
            }
        } else if self.is_decode() {
            TransportError::InvalidResponse(self.to_string())
        } else if self.is_builder() {
            TransportError::Client(self.to_string())
        } else {
            TransportError::ConnectionFailed(self.to_string())
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        e.into_transport_error()
    }
}

/// Weather payload did not have the expected shape.
#[derive(Debug, Error, PartialEq)]
pub enum MalformedPayloadError {
    #[error("body is not JSON: {0}")]
    NotJson(String),

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` has the wrong type: {message}")]
    WrongType { field: &'static str, message: String },

    #[error("daily arrays differ in length (time={time}, max={max}, min={min})")]
    LengthMismatch { time: usize, max: usize, min: usize },

    #[error("daily forecast is empty")]
    EmptyForecast,
}

/// Single failure surfaced by the resolver. Carries the underlying cause.
#[derive(Debug, Error)]
pub enum ForecastFetchError {
    #[error("geocoding failed: {0}")]
    Geocoding(#[source] TransportError),

    #[error("no coordinates for address with postal code {postal_code}")]
    CoordinatesUnavailable { postal_code: String },

    #[error("weather request failed: {0}")]
    Weather(#[source] TransportError),

    #[error("malformed forecast payload: {0}")]
    MalformedPayload(#[from] MalformedPayloadError),
}

impl ForecastFetchError {
    /// The generic text shown to end users for any failed lookup.
    pub fn user_message(&self) -> &'static str {
        "Error fetching forecast data. Please try again later."
    }
}
