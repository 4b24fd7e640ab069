//! City-name resolution via the geocoding upstream
//!
//! Turns a free-text city name into coordinates plus a display name and
//! country. Zero matches is a distinct `NotFound`, never conflated with a
//! transport failure. Results are not cached; repeated calls re-query.

use crate::client::OwmClient;
use crate::error::WeatherError;
use crate::models::ResolvedLocation;
use tracing::{debug, info, warn};

/// Service for resolving city names into locations
pub struct LocationResolver;

impl LocationResolver {
    /// Resolve a city name into a [`ResolvedLocation`]
    ///
    /// The caller is responsible for rejecting empty input before this is
    /// invoked; an upstream "zero results" response still maps to
    /// `NotFound` here.
    pub async fn resolve(
        client: &OwmClient,
        city: &str,
    ) -> Result<ResolvedLocation, WeatherError> {
        debug!("Geocoding city: {}", city);

        let matches = client.geocode(city).await?;
        let Some(hit) = matches.into_iter().next() else {
            warn!("Geocoding returned no results for city: {}", city);
            return Err(WeatherError::not_found(format!("City not found: {city}")));
        };

        info!(
            "Geocoded '{}' to {} ({:.4}, {:.4})",
            city, hit.name, hit.lat, hit.lon
        );

        Ok(ResolvedLocation {
            latitude: hit.lat,
            longitude: hit.lon,
            name: hit.name,
            country: hit.country,
        })
    }
}
