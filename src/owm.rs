//! `OpenWeatherMap` API response structures and conversion utilities
//!
//! Decoding is tolerant on purpose: unknown fields are ignored and optional
//! fields default, so every upstream schema variant maps into the one
//! normalized [`WeatherSnapshot`] shape.

use crate::models::{AirQualitySample, CurrentConditions, ForecastEntry, WeatherSnapshot};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// One match from the direct geocoding endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingEntry {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub country: Option<String>,
    pub state: Option<String>,
}

/// Condition tag shared by the current-weather and forecast responses
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionTag {
    pub main: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

/// The `main` block: temperatures, pressure, humidity
#[derive(Debug, Clone, Deserialize)]
pub struct Thermals {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: f64,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub pressure: Option<f64>,
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Wind {
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub deg: u16,
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Clouds {
    #[serde(default)]
    pub all: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SysBlock {
    pub country: Option<String>,
    #[serde(default)]
    pub sunrise: i64,
    #[serde(default)]
    pub sunset: i64,
}

/// Response from the current-weather endpoint
#[derive(Debug, Deserialize)]
pub struct CurrentResponse {
    #[serde(default)]
    pub weather: Vec<ConditionTag>,
    pub main: Thermals,
    #[serde(default)]
    pub wind: Wind,
    pub clouds: Option<Clouds>,
    pub visibility: Option<u32>,
    pub sys: Option<SysBlock>,
    #[serde(default)]
    pub timezone: i32,
    /// City name the upstream independently resolved for the coordinates
    pub name: Option<String>,
}

/// Response from the 5-day / 3-hour forecast endpoint
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub list: Vec<ForecastItem>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastItem {
    pub dt: i64,
    pub main: Thermals,
    #[serde(default)]
    pub weather: Vec<ConditionTag>,
    #[serde(default)]
    pub wind: Wind,
    pub clouds: Option<Clouds>,
    pub visibility: Option<u32>,
    pub pop: Option<f64>,
}

/// Response from the air pollution endpoint: a short time-indexed sequence
#[derive(Debug, Deserialize)]
pub struct AirPollutionResponse {
    #[serde(default)]
    pub list: Vec<AirPollutionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AirPollutionEntry {
    pub dt: i64,
    pub main: AqiBlock,
    #[serde(default)]
    pub components: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
pub struct AqiBlock {
    pub aqi: u8,
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

fn snapshot(
    main: Thermals,
    weather: Vec<ConditionTag>,
    wind: Wind,
    clouds: Option<Clouds>,
    visibility: Option<u32>,
    pop: Option<f64>,
) -> WeatherSnapshot {
    let tag = weather.into_iter().next();
    WeatherSnapshot {
        temperature: main.temp,
        feels_like: main.feels_like,
        temp_min: main.temp_min,
        temp_max: main.temp_max,
        pressure: main.pressure,
        humidity: main.humidity,
        wind_speed: wind.speed,
        wind_direction: wind.deg,
        wind_gust: wind.gust,
        cloud_cover: clouds.map(|c| c.all),
        visibility,
        pop,
        condition: tag.as_ref().and_then(|t| t.main.clone()),
        description: tag.as_ref().and_then(|t| t.description.clone()),
        icon: tag.and_then(|t| t.icon),
    }
}

impl CurrentResponse {
    /// Normalize into [`CurrentConditions`], keeping the raw payload for
    /// passthrough
    #[must_use]
    pub fn into_conditions(self, raw: serde_json::Value) -> CurrentConditions {
        let (country, sunrise, sunset) = match &self.sys {
            Some(sys) => (sys.country.clone(), sys.sunrise, sys.sunset),
            None => (None, 0, 0),
        };
        CurrentConditions {
            snapshot: snapshot(
                self.main,
                self.weather,
                self.wind,
                self.clouds,
                self.visibility,
                None,
            ),
            city_name: self.name,
            country,
            timezone_offset: self.timezone,
            sunrise,
            sunset,
            raw,
        }
    }
}

impl From<ForecastItem> for ForecastEntry {
    fn from(item: ForecastItem) -> Self {
        Self {
            timestamp: timestamp(item.dt),
            snapshot: snapshot(
                item.main,
                item.weather,
                item.wind,
                item.clouds,
                item.visibility,
                item.pop,
            ),
        }
    }
}

impl From<AirPollutionEntry> for AirQualitySample {
    fn from(entry: AirPollutionEntry) -> Self {
        Self {
            timestamp: timestamp(entry.dt),
            aqi: entry.main.aqi,
            components: entry.components,
        }
    }
}
