pub mod app;
pub mod config;
pub mod error;

pub use app::{App, Lookup, NOT_FOUND_MESSAGE};
pub use config::{
    Config, ConfigValidationError, GeocodingConfig, LoggingConfig, ValidationResult, WeatherConfig,
};
pub use error::{AppError, ConfigError};

/// Initialize tracing/logging.
///
/// `RUST_LOG` wins over `default_filter`; an unparsable filter falls back to
/// `info`. Output goes to stderr.
pub fn init(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("zipcast core initialized");
}
