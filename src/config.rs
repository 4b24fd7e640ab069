//! Configuration management for the `WeatherHub` service
//!
//! Handles loading configuration from files and environment variables,
//! and validates all settings before the service starts.

use crate::WeatherError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `WeatherHub` service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// OpenWeatherMap API configuration
    #[serde(default)]
    pub owm: OwmConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// OpenWeatherMap API configuration
///
/// Read-only after startup; the four endpoint URLs and the API key are the
/// only state shared between requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwmConfig {
    /// OpenWeatherMap API key (secret, only ever logged masked)
    #[serde(default)]
    pub api_key: String,
    /// Current weather endpoint
    #[serde(default = "default_current_url")]
    pub current_url: String,
    /// 5-day / 3-hour forecast endpoint
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,
    /// Air pollution endpoint
    #[serde(default = "default_air_pollution_url")]
    pub air_pollution_url: String,
    /// Direct geocoding endpoint
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_current_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".to_string()
}

fn default_forecast_url() -> String {
    "https://api.openweathermap.org/data/2.5/forecast".to_string()
}

fn default_air_pollution_url() -> String {
    "https://api.openweathermap.org/data/2.5/air_pollution".to_string()
}

fn default_geocoding_url() -> String {
    "https://api.openweathermap.org/geo/1.0/direct".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for OwmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            current_url: default_current_url(),
            forecast_url: default_forecast_url(),
            air_pollution_url: default_air_pollution_url(),
            geocoding_url: default_geocoding_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            owm: OwmConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl OwmConfig {
    /// API key with all but the first four characters masked, safe for logs
    #[must_use]
    pub fn masked_api_key(&self) -> String {
        if self.api_key.is_empty() {
            "(not set)".to_string()
        } else if self.api_key.len() <= 4 {
            "****".to_string()
        } else {
            format!("{}****", &self.api_key[..4])
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from the specified path, falling back to the
    /// default location and `WEATHERHUB_`-prefixed environment variables
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. WEATHERHUB_OWM__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("WEATHERHUB")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weatherhub").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.owm.api_key.trim().is_empty() {
            return Err(WeatherError::internal(
                "OpenWeatherMap API key is required. Set owm.api_key or WEATHERHUB_OWM__API_KEY.",
            )
            .into());
        }

        for (name, url) in [
            ("current", &self.owm.current_url),
            ("forecast", &self.owm.forecast_url),
            ("air_pollution", &self.owm.air_pollution_url),
            ("geocoding", &self.owm.geocoding_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WeatherError::internal(format!(
                    "The {name} endpoint URL must be a valid HTTP or HTTPS URL, got '{url}'"
                ))
                .into());
            }
        }

        if self.owm.timeout_seconds == 0 || self.owm.timeout_seconds > 300 {
            return Err(WeatherError::internal(
                "Request timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherError::internal(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}
