//! HTTP API surface
//!
//! A single query endpoint accepting either a city name or a lat/lon pair.
//! Validation happens here, before the resolver or aggregator run.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::aggregator::WeatherAggregator;
use crate::error::WeatherError;
use crate::models::WeatherReport;
use crate::resolver::LocationResolver;

/// Shared request-handling state
#[derive(Clone)]
pub struct AppState {
    aggregator: Arc<WeatherAggregator>,
}

impl AppState {
    #[must_use]
    pub fn new(aggregator: WeatherAggregator) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weather/location", get(get_weather))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct WeatherQuery {
    city: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherReport>, WeatherError> {
    info!(
        "Weather request - city: {:?}, lat: {:?}, lon: {:?}",
        query.city, query.lat, query.lon
    );

    let city = query
        .city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let report = match (city, query.lat, query.lon) {
        // Coordinates win when both forms are supplied
        (_, Some(lat), Some(lon)) => state.aggregator.aggregate(lat, lon, None).await?,
        (Some(city), _, _) => {
            let resolved = LocationResolver::resolve(state.aggregator.client(), city).await?;
            let (lat, lon) = (resolved.latitude, resolved.longitude);
            state.aggregator.aggregate(lat, lon, Some(resolved)).await?
        }
        _ => {
            return Err(WeatherError::invalid_request(
                "Please provide either a 'city' name or 'lat' and 'lon' coordinates.",
            ));
        }
    };

    Ok(Json(report))
}

impl IntoResponse for WeatherError {
    fn into_response(self) -> Response {
        let status = match &self {
            WeatherError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            WeatherError::NotFound { .. } => StatusCode::NOT_FOUND,
            WeatherError::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            // Pass the upstream's own status through to the caller
            WeatherError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            WeatherError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed with {}: {}", status, self);
        } else {
            warn!("Request rejected with {}: {}", status, self);
        }

        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
