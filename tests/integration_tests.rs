//! Integration tests for the resolver and aggregator
//!
//! Each test stands up a stub OpenWeatherMap upstream with axum on an
//! ephemeral port and drives the real client against it.

use axum::{Json, Router, http::StatusCode, routing::get};
use serde_json::{Value, json};
use weatherhub::api::{self, AppState};
use weatherhub::{LocationResolver, OwmClient, OwmConfig, WeatherAggregator, WeatherError};

const LAT: f64 = 51.51;
const LON: f64 = -0.13;

fn current_body() -> Value {
    json!({
        "coord": {"lon": LON, "lat": LAT},
        "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
        "main": {"temp": 12.3, "feels_like": 11.6, "temp_min": 11.0, "temp_max": 13.4, "pressure": 1012, "humidity": 81},
        "visibility": 10000,
        "wind": {"speed": 4.1, "deg": 250},
        "clouds": {"all": 75},
        "dt": 1700000000i64,
        "sys": {"country": "GB", "sunrise": 1699996000i64, "sunset": 1700029000i64},
        "timezone": 0,
        "id": 2643743,
        "name": "Westminster",
        "cod": 200
    })
}

fn forecast_body() -> Value {
    json!({
        "cod": "200",
        "cnt": 2,
        "list": [
            {"dt": 1700006400i64, "main": {"temp": 10.0, "feels_like": 9.0}, "weather": [{"main": "Clouds", "description": "overcast clouds", "icon": "04n"}], "wind": {"speed": 3.0, "deg": 180}, "clouds": {"all": 90}, "pop": 0.2},
            {"dt": 1700017200i64, "main": {"temp": 9.1, "feels_like": 8.0}, "weather": [{"main": "Clear", "description": "clear sky", "icon": "01n"}], "wind": {"speed": 2.5, "deg": 170}, "pop": 0.0}
        ]
    })
}

fn air_body() -> Value {
    json!({
        "coord": {"lon": LON, "lat": LAT},
        "list": [
            {"dt": 1700000000i64, "main": {"aqi": 2}, "components": {"co": 201.94, "no2": 0.77, "pm2_5": 4.1}}
        ]
    })
}

fn geocoding_body() -> Value {
    json!([{"name": "London", "lat": 51.5074, "lon": -0.1278, "country": "GB"}])
}

async fn spawn_stub(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn stub_config(base: &str) -> OwmConfig {
    OwmConfig {
        api_key: "test-key".into(),
        current_url: format!("{base}/data/2.5/weather"),
        forecast_url: format!("{base}/data/2.5/forecast"),
        air_pollution_url: format!("{base}/data/2.5/air_pollution"),
        geocoding_url: format!("{base}/geo/1.0/direct"),
        timeout_seconds: 5,
    }
}

async fn client_for(app: Router) -> OwmClient {
    let base = spawn_stub(app).await;
    OwmClient::new(stub_config(&base)).unwrap()
}

/// Stub where all four upstream endpoints answer successfully
fn healthy_upstream() -> Router {
    Router::new()
        .route("/data/2.5/weather", get(|| async { Json(current_body()) }))
        .route("/data/2.5/forecast", get(|| async { Json(forecast_body()) }))
        .route("/data/2.5/air_pollution", get(|| async { Json(air_body()) }))
        .route("/geo/1.0/direct", get(|| async { Json(geocoding_body()) }))
}

#[tokio::test]
async fn aggregate_merges_all_three_upstreams() {
    let aggregator = WeatherAggregator::new(client_for(healthy_upstream()).await);

    let report = aggregator.aggregate(LAT, LON, None).await.unwrap();

    assert_eq!(report.location.latitude, LAT);
    assert_eq!(report.location.longitude, LON);
    assert_eq!(report.location.resolved_name, "Westminster");
    assert_eq!(report.location.country.as_deref(), Some("GB"));
    assert_eq!(report.location.sunrise, 1699996000);
    assert_eq!(report.location.sunset, 1700029000);
    assert!(report.location.searched_city.is_none());

    assert_eq!(report.current.snapshot.temperature, 12.3);
    assert_eq!(report.current.snapshot.description.as_deref(), Some("light rain"));
    assert_eq!(report.current.raw["id"], 2643743);

    assert_eq!(report.forecast.len(), 2);
    assert!(report.forecast[0].timestamp < report.forecast[1].timestamp);

    let air = report.air_quality.expect("air quality should be present");
    assert_eq!(air.aqi, 2);
    assert_eq!(air.components.get("co"), Some(&201.94));
}

#[tokio::test]
async fn aggregate_tolerates_air_quality_http_error() {
    let app = Router::new()
        .route("/data/2.5/weather", get(|| async { Json(current_body()) }))
        .route("/data/2.5/forecast", get(|| async { Json(forecast_body()) }))
        .route(
            "/data/2.5/air_pollution",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
    let aggregator = WeatherAggregator::new(client_for(app).await);

    let report = aggregator.aggregate(LAT, LON, None).await.unwrap();
    assert!(report.air_quality.is_none());
    assert_eq!(report.forecast.len(), 2);
}

#[tokio::test]
async fn aggregate_tolerates_empty_air_quality_list() {
    let app = Router::new()
        .route("/data/2.5/weather", get(|| async { Json(current_body()) }))
        .route("/data/2.5/forecast", get(|| async { Json(forecast_body()) }))
        .route(
            "/data/2.5/air_pollution",
            get(|| async { Json(json!({"list": []})) }),
        );
    let aggregator = WeatherAggregator::new(client_for(app).await);

    let report = aggregator.aggregate(LAT, LON, None).await.unwrap();
    assert!(report.air_quality.is_none());
}

#[tokio::test]
async fn aggregate_tolerates_unreachable_air_quality_endpoint() {
    let base = spawn_stub(
        Router::new()
            .route("/data/2.5/weather", get(|| async { Json(current_body()) }))
            .route("/data/2.5/forecast", get(|| async { Json(forecast_body()) })),
    )
    .await;
    let mut config = stub_config(&base);
    // Point only the air pollution endpoint at a dead port
    config.air_pollution_url = format!("http://{}/air", dead_addr().await);
    let aggregator = WeatherAggregator::new(OwmClient::new(config).unwrap());

    let report = aggregator.aggregate(LAT, LON, None).await.unwrap();
    assert!(report.air_quality.is_none());
}

#[tokio::test]
async fn aggregate_fails_when_forecast_fails() {
    let app = Router::new()
        .route("/data/2.5/weather", get(|| async { Json(current_body()) }))
        .route(
            "/data/2.5/forecast",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/data/2.5/air_pollution", get(|| async { Json(air_body()) }));
    let aggregator = WeatherAggregator::new(client_for(app).await);

    let err = aggregator.aggregate(LAT, LON, None).await.unwrap_err();
    assert_eq!(err.upstream_status(), Some(500));
    assert!(err.to_string().contains("unavailable"));
}

#[tokio::test]
async fn aggregate_maps_current_weather_rate_limit_distinctly() {
    let limited = Router::new()
        .route(
            "/data/2.5/weather",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "limit") }),
        )
        .route("/data/2.5/forecast", get(|| async { Json(forecast_body()) }))
        .route("/data/2.5/air_pollution", get(|| async { Json(air_body()) }));
    let aggregator = WeatherAggregator::new(client_for(limited).await);

    let err = aggregator.aggregate(LAT, LON, None).await.unwrap_err();
    assert_eq!(err.upstream_status(), Some(429));
    assert!(err.to_string().contains("rate limit"));

    let missing = Router::new()
        .route(
            "/data/2.5/weather",
            get(|| async { (StatusCode::NOT_FOUND, "nope") }),
        )
        .route("/data/2.5/forecast", get(|| async { Json(forecast_body()) }))
        .route("/data/2.5/air_pollution", get(|| async { Json(air_body()) }));
    let aggregator = WeatherAggregator::new(client_for(missing).await);

    let err = aggregator.aggregate(LAT, LON, None).await.unwrap_err();
    assert_eq!(err.upstream_status(), Some(404));
    assert!(err.to_string().contains("Could not find data"));
}

#[tokio::test]
async fn aggregate_fails_on_network_error() {
    let config = stub_config(&format!("http://{}", dead_addr().await));
    let aggregator = WeatherAggregator::new(OwmClient::new(config).unwrap());

    let err = aggregator.aggregate(LAT, LON, None).await.unwrap_err();
    assert!(matches!(err, WeatherError::UpstreamUnavailable { .. }));
    assert_eq!(err.upstream_status(), None);
}

#[tokio::test]
async fn resolved_override_takes_precedence_over_current_weather_name() {
    let client = client_for(healthy_upstream()).await;
    let resolved = LocationResolver::resolve(&client, "London").await.unwrap();
    assert_eq!(resolved.name, "London");
    assert_eq!(resolved.country.as_deref(), Some("GB"));

    let aggregator = WeatherAggregator::new(client);
    let (lat, lon) = (resolved.latitude, resolved.longitude);
    let report = aggregator.aggregate(lat, lon, Some(resolved)).await.unwrap();

    // Current weather reports "Westminster" for these coordinates, but the
    // geocoded name wins
    assert_eq!(report.location.resolved_name, "London");
    assert_eq!(report.location.country.as_deref(), Some("GB"));
    assert_eq!(report.location.searched_city.as_deref(), Some("London"));
    assert_eq!(report.location.latitude, lat);
    assert_eq!(report.location.longitude, lon);
    assert_eq!(report.current.city_name.as_deref(), Some("Westminster"));
}

#[tokio::test]
async fn aggregate_falls_back_to_formatted_coordinates() {
    // Current weather response carries no city name at all
    let app = Router::new()
        .route(
            "/data/2.5/weather",
            get(|| async {
                Json(json!({
                    "main": {"temp": 5.0, "feels_like": 3.0},
                    "wind": {"speed": 1.0, "deg": 90},
                    "timezone": 3600
                }))
            }),
        )
        .route("/data/2.5/forecast", get(|| async { Json(forecast_body()) }))
        .route("/data/2.5/air_pollution", get(|| async { Json(air_body()) }));
    let aggregator = WeatherAggregator::new(client_for(app).await);

    let report = aggregator.aggregate(LAT, LON, None).await.unwrap();
    assert_eq!(report.location.resolved_name, "[51.51, -0.13]");
    assert!(report.location.country.is_none());
    assert_eq!(report.location.timezone_offset, 3600);
}

#[tokio::test]
async fn resolve_fails_with_not_found_for_zero_matches() {
    let app = Router::new().route("/geo/1.0/direct", get(|| async { Json(json!([])) }));
    let client = client_for(app).await;

    let err = LocationResolver::resolve(&client, "Nonexistent City XYZ")
        .await
        .unwrap_err();
    assert!(matches!(err, WeatherError::NotFound { .. }));
    assert!(err.to_string().contains("Nonexistent City XYZ"));
}

#[tokio::test]
async fn resolve_distinguishes_network_failure_from_not_found() {
    let config = stub_config(&format!("http://{}", dead_addr().await));
    let client = OwmClient::new(config).unwrap();

    let err = LocationResolver::resolve(&client, "London").await.unwrap_err();
    assert!(matches!(err, WeatherError::UpstreamUnavailable { .. }));
}

#[tokio::test]
async fn resolve_maps_unauthorized_geocoding_response() {
    let app = Router::new().route(
        "/geo/1.0/direct",
        get(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
    );
    let client = client_for(app).await;

    let err = LocationResolver::resolve(&client, "London").await.unwrap_err();
    assert_eq!(err.upstream_status(), Some(401));
    assert!(err.to_string().contains("Invalid API key"));
    assert!(err.to_string().contains("city 'London'"));
}

/// Serve the real API router, backed by the given upstream client
async fn serve_api(client: OwmClient) -> String {
    let state = AppState::new(WeatherAggregator::new(client));
    spawn_stub(api::router(state)).await
}

#[tokio::test]
async fn handler_prefers_coordinates_when_both_forms_supplied() {
    let base = serve_api(client_for(healthy_upstream()).await).await;
    let http = reqwest::Client::new();

    let response = http
        .get(format!(
            "{base}/weather/location?city=London&lat={LAT}&lon={LON}"
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    // Coordinate path: no geocoding, so the current-weather name wins and
    // there is no searched city
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["location"]["resolved_name"], "Westminster");
    assert!(body["location"].get("searched_city").is_none());
    assert_eq!(body["location"]["latitude"], LAT);
    assert_eq!(body["location"]["longitude"], LON);
}

#[tokio::test]
async fn handler_resolves_city_queries_through_geocoding() {
    let base = serve_api(client_for(healthy_upstream()).await).await;
    let http = reqwest::Client::new();

    let response = http
        .get(format!("{base}/weather/location?city=London"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["location"]["resolved_name"], "London");
    assert_eq!(body["location"]["searched_city"], "London");
    assert_eq!(body["location"]["latitude"], 51.5074);
}

#[tokio::test]
async fn handler_rejects_missing_and_blank_location_query() {
    let base = serve_api(client_for(healthy_upstream()).await).await;
    let http = reqwest::Client::new();

    // No query at all, and a whitespace-only city, both count as neither form
    for query in ["", "?city=%20%20"] {
        let response = http
            .get(format!("{base}/weather/location{query}"))
            .send()
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            reqwest::StatusCode::BAD_REQUEST,
            "query {query:?}"
        );
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("'city'"));
    }
}

/// An address nothing is listening on: bind an ephemeral port, then drop it
async fn dead_addr() -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
