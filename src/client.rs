//! HTTP client for the `OpenWeatherMap` upstream APIs
//!
//! Builds endpoint URLs from configuration, performs the GET calls, and
//! classifies failures: transport errors become `UpstreamUnavailable`,
//! non-2xx statuses go through the shared status mapping.

use crate::config::OwmConfig;
use crate::error::WeatherError;
use crate::models::format_coordinates;
use crate::owm;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};

/// Client for the four `OpenWeatherMap` endpoints, cheap to clone
#[derive(Debug, Clone)]
pub struct OwmClient {
    http: Client,
    config: OwmConfig,
}

impl OwmClient {
    /// Create a new upstream client from configuration
    pub fn new(config: OwmConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("WeatherHub/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self { http, config })
    }

    /// Look up geocoding matches for a city name, constrained to one result
    pub async fn geocode(&self, city: &str) -> Result<Vec<owm::GeocodingEntry>, WeatherError> {
        let url = format!(
            "{}?q={}&limit=1&appid={}",
            self.config.geocoding_url,
            urlencoding::encode(city),
            self.config.api_key
        );
        self.get_json(&url, &format!("city '{city}'")).await
    }

    /// Fetch current conditions, returning both the decoded response and the
    /// raw payload for passthrough. Units are metric.
    pub async fn current_weather(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<(owm::CurrentResponse, serde_json::Value), WeatherError> {
        let context = format!("current weather at {}", format_coordinates(lat, lon));
        let url = format!(
            "{}?lat={lat}&lon={lon}&appid={}&units=metric",
            self.config.current_url, self.config.api_key
        );
        let raw: serde_json::Value = self.get_json(&url, &context).await?;
        let response = serde_json::from_value(raw.clone()).map_err(|e| {
            error!("Failed to decode current weather response: {}", e);
            WeatherError::unavailable(format!("Invalid response from weather service for {context}"))
        })?;
        Ok((response, raw))
    }

    /// Fetch the 5-day / 3-hour forecast. Units are metric.
    pub async fn forecast(&self, lat: f64, lon: f64) -> Result<owm::ForecastResponse, WeatherError> {
        let context = format!("forecast at {}", format_coordinates(lat, lon));
        let url = format!(
            "{}?lat={lat}&lon={lon}&appid={}&units=metric",
            self.config.forecast_url, self.config.api_key
        );
        self.get_json(&url, &context).await
    }

    /// Fetch the air pollution sequence for the coordinates
    pub async fn air_pollution(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<owm::AirPollutionResponse, WeatherError> {
        let context = format!("air quality at {}", format_coordinates(lat, lon));
        let url = format!(
            "{}?lat={lat}&lon={lon}&appid={}",
            self.config.air_pollution_url, self.config.api_key
        );
        self.get_json(&url, &context).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        context: &str,
    ) -> Result<T, WeatherError> {
        debug!("GET {}", redact_api_key(url));

        let response = self.http.get(url).send().await.map_err(|e| {
            WeatherError::unavailable(format!(
                "Could not connect to weather service for {context}: {e}"
            ))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherError::from_status(status.as_u16(), context, &body));
        }

        response.json::<T>().await.map_err(|e| {
            error!("Failed to decode upstream response for {}: {}", context, e);
            WeatherError::unavailable(format!("Invalid response from weather service for {context}"))
        })
    }
}

/// Mask the `appid` query parameter so request URLs are safe to log
fn redact_api_key(url: &str) -> String {
    match url.split_once("appid=") {
        Some((head, tail)) => {
            let rest = tail.split_once('&').map(|(_, rest)| format!("&{rest}"));
            format!("{head}appid=****{}", rest.unwrap_or_default())
        }
        None => url.to_string(),
    }
}
