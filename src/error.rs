//! Error types and handling for the `WeatherHub` service

use thiserror::Error;

/// Main error type for the `WeatherHub` service
#[derive(Error, Debug)]
pub enum WeatherError {
    /// Caller supplied neither a city name nor coordinates
    #[error("{message}")]
    InvalidRequest { message: String },

    /// No geocoding match, or upstream reported not-found
    #[error("{message}")]
    NotFound { message: String },

    /// Network-level failure reaching an upstream (DNS, refused, timeout)
    #[error("{message}")]
    UpstreamUnavailable { message: String },

    /// Upstream reachable but returned an HTTP error status
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// Unanticipated failures, surfaced generically
    #[error("{message}")]
    Internal { message: String },
}

impl WeatherError {
    /// Create a new invalid-request error
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new upstream-unavailable error
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Map an upstream HTTP error status into an `Upstream` error with a
    /// human-readable message. `context` describes what was being fetched,
    /// e.g. `city 'London'` or `current weather at [51.51, -0.13]`.
    ///
    /// Shared by the resolver and the aggregator so both produce identical
    /// messages for the same upstream failure.
    #[must_use]
    pub fn from_status(status: u16, context: &str, body: &str) -> Self {
        let message = match status {
            404 => format!("Could not find data for {context}. Please check the location or coordinates."),
            401 | 403 => format!(
                "Invalid API key or unauthorized request for {context}. Check the configured OpenWeatherMap credentials."
            ),
            429 => format!("API rate limit exceeded for {context}. Please wait and try again later."),
            400..=499 => format!("Invalid request [{status}] for {context}. Details: {body}"),
            500..=599 => format!(
                "Weather service unavailable [{status}] while fetching {context}. Please try again later."
            ),
            _ => format!("An error occurred [{status}] while contacting the weather service for {context}."),
        };
        Self::Upstream { status, message }
    }

    /// The upstream HTTP status carried by this error, if any
    #[must_use]
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}
