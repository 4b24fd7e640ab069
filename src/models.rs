//! Internal weather models
//!
//! One normalized snapshot shape is shared by current conditions and
//! forecast entries; every upstream response variant decodes into it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Format a coordinate pair the way it appears as a display-name fallback
#[must_use]
pub fn format_coordinates(lat: f64, lon: f64) -> String {
    format!("[{lat:.2}, {lon:.2}]")
}

/// A location resolved via geocoding
///
/// Requests that start from raw coordinates skip this entirely; the
/// aggregator falls back to a formatted coordinate string instead.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResolvedLocation {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Display name (city, region, etc.)
    pub name: String,
    /// Country code (ISO 3166-1 alpha-2)
    pub country: Option<String>,
}

/// Normalized weather snapshot, shared by current conditions and each
/// forecast entry. Optional fields are omitted when the upstream response
/// does not carry them.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Temperature in Celsius
    pub temperature: f64,
    /// Perceived temperature in Celsius
    pub feels_like: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_max: Option<f64>,
    /// Atmospheric pressure in hPa
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    /// Relative humidity in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Wind direction in degrees (0-360, where 0/360 is North)
    pub wind_direction: u16,
    /// Wind gust speed in m/s
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_gust: Option<f64>,
    /// Cloud cover percentage (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_cover: Option<u8>,
    /// Visibility in meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<u32>,
    /// Probability of precipitation (0-1, forecast entries only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pop: Option<f64>,
    /// Short condition group, e.g. "Rain"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Human-readable description of weather conditions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Upstream icon code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Current conditions at the requested coordinates
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CurrentConditions {
    #[serde(flatten)]
    pub snapshot: WeatherSnapshot,
    /// City name as reported by the current-weather upstream
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_name: Option<String>,
    /// Country code as reported by the current-weather upstream
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Shift in seconds from UTC
    pub timezone_offset: i32,
    /// Sunrise time, unix seconds UTC
    pub sunrise: i64,
    /// Sunset time, unix seconds UTC
    pub sunset: i64,
    /// Raw upstream payload, passed through for callers that need fields
    /// the normalized snapshot drops
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub raw: serde_json::Value,
}

/// One time-stamped point of the multi-day forecast (3-hour granularity)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ForecastEntry {
    /// Forecasted time, UTC
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub snapshot: WeatherSnapshot,
}

/// The most recent air-quality sample for the requested coordinates
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AirQualitySample {
    /// Sample time, UTC
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    /// Air Quality Index category (1 = good .. 5 = very poor)
    pub aqi: u8,
    /// Pollutant concentrations, e.g. {"co": 201.94, "no2": 0.77}
    pub components: HashMap<String, f64>,
}

/// Location summary attached to every successful report
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LocationInfo {
    /// The city name the caller searched for, when the request went
    /// through geocoding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searched_city: Option<String>,
    /// Display name for the location
    pub resolved_name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Shift in seconds from UTC, from the current-weather response
    pub timezone_offset: i32,
    /// Sunrise time, unix seconds UTC
    pub sunrise: i64,
    /// Sunset time, unix seconds UTC
    pub sunset: i64,
}

/// Composite result of one aggregation, the sole output of the core
///
/// `current` and `forecast` are always present on success; a missing
/// `air_quality` is a valid, degraded-but-successful outcome.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WeatherReport {
    pub location: LocationInfo,
    pub current: CurrentConditions,
    pub forecast: Vec<ForecastEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_quality: Option<AirQualitySample>,
}
