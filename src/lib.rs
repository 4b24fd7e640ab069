//! `WeatherHub` - unified weather aggregation backend
//!
//! This library resolves location queries (city name or coordinates) and
//! merges current conditions, multi-day forecast and air quality from the
//! OpenWeatherMap APIs into one composite report.

pub mod aggregator;
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod owm;
pub mod resolver;
pub mod web;

// Re-export core types for public API
pub use aggregator::WeatherAggregator;
pub use client::OwmClient;
pub use config::{AppConfig, LoggingConfig, OwmConfig, ServerConfig};
pub use error::WeatherError;
pub use models::{
    AirQualitySample, CurrentConditions, ForecastEntry, LocationInfo, ResolvedLocation,
    WeatherReport, WeatherSnapshot,
};
pub use resolver::LocationResolver;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherError>;
