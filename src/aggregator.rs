//! Aggregation orchestrator
//!
//! Issues the three upstream calls for one coordinate pair and merges their
//! heterogeneous responses into a single [`WeatherReport`]. Current weather
//! and forecast are load-bearing; air quality is best-effort and its
//! failures are absorbed here, never surfaced to the caller.

use crate::client::OwmClient;
use crate::error::WeatherError;
use crate::models::{
    AirQualitySample, ForecastEntry, LocationInfo, ResolvedLocation, WeatherReport,
    format_coordinates,
};
use tracing::{info, warn};

/// Orchestrates the current-weather, forecast and air-quality calls
pub struct WeatherAggregator {
    client: OwmClient,
}

impl WeatherAggregator {
    #[must_use]
    pub fn new(client: OwmClient) -> Self {
        Self { client }
    }

    /// The upstream client, shared with the resolver
    #[must_use]
    pub fn client(&self) -> &OwmClient {
        &self.client
    }

    /// Fetch and merge all weather data for a coordinate pair
    ///
    /// When `resolved` is supplied (the request came in as a city name),
    /// its display name and country take precedence over whatever the
    /// current-weather response reports for the coordinates.
    pub async fn aggregate(
        &self,
        lat: f64,
        lon: f64,
        resolved: Option<ResolvedLocation>,
    ) -> Result<WeatherReport, WeatherError> {
        let log_context = resolved
            .as_ref()
            .map_or_else(|| format_coordinates(lat, lon), |r| r.name.clone());
        info!("Aggregating weather data for {}", log_context);

        // Independent calls, one coordinate pair
        let (current, forecast, air) = tokio::join!(
            self.client.current_weather(lat, lon),
            self.client.forecast(lat, lon),
            self.client.air_pollution(lat, lon),
        );

        let (current, raw) = current?;
        let forecast = forecast?;

        // Best-effort: absorb every air-quality failure and degrade
        let air_quality: Option<AirQualitySample> = match air {
            Ok(response) => response.list.into_iter().next().map(AirQualitySample::from),
            Err(e) => {
                warn!(
                    "Air quality lookup failed for {}: {}. Proceeding without AQI data.",
                    log_context, e
                );
                None
            }
        };

        let searched_city = resolved.as_ref().map(|r| r.name.clone());
        let resolved_name = resolved
            .as_ref()
            .map(|r| r.name.clone())
            .or_else(|| current.name.clone())
            .unwrap_or_else(|| format_coordinates(lat, lon));
        let country = match &resolved {
            Some(r) => r.country.clone(),
            None => current.sys.as_ref().and_then(|s| s.country.clone()),
        };
        let (sunrise, sunset) = current
            .sys
            .as_ref()
            .map_or((0, 0), |s| (s.sunrise, s.sunset));

        let location = LocationInfo {
            searched_city,
            resolved_name,
            latitude: lat,
            longitude: lon,
            country,
            timezone_offset: current.timezone,
            sunrise,
            sunset,
        };

        let entries: Vec<ForecastEntry> =
            forecast.list.into_iter().map(ForecastEntry::from).collect();

        info!(
            "Aggregated weather for {}: {} forecast entries, air quality {}",
            log_context,
            entries.len(),
            if air_quality.is_some() { "present" } else { "absent" }
        );

        Ok(WeatherReport {
            location,
            current: current.into_conditions(raw),
            forecast: entries,
            air_quality,
        })
    }
}
