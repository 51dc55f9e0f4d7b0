//! Integration tests for HTTP handlers
#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use weather_core::{
    ApiError, ProvinceDirectory, ServerConfig, UpstreamPayloads, WeatherProvider, WeatherService,
};
use weather_server::{AppState, create_app};

/// Provider returning a canned result and recording requested cities.
#[derive(Debug)]
struct MockProvider {
    result: Result<UpstreamPayloads, ApiError>,
    cities: Mutex<Vec<String>>,
}

impl MockProvider {
    fn new(result: Result<UpstreamPayloads, ApiError>) -> Arc<Self> {
        Arc::new(Self { result, cities: Mutex::new(Vec::new()) })
    }

    fn requested(&self) -> Vec<String> {
        self.cities.lock().expect("lock").clone()
    }
}

#[async_trait]
impl WeatherProvider for MockProvider {
    async fn fetch(&self, city: &str) -> Result<UpstreamPayloads, ApiError> {
        self.cities.lock().expect("lock").push(city.to_string());
        self.result.clone()
    }
}

fn forecast_item(dt_txt: &str, max: f64, min: f64, desc: &str, rain: Option<f64>) -> Value {
    let mut item = json!({
        "dt_txt": dt_txt,
        "main": { "temp": max, "temp_max": max, "temp_min": min },
        "weather": [{ "description": desc, "icon": "10d" }]
    });
    if let Some(mm) = rain {
        item["rain"] = json!({ "3h": mm });
    }
    item
}

fn upstream() -> UpstreamPayloads {
    UpstreamPayloads {
        weather: json!({
            "name": "Mendoza",
            "main": { "temp": 27.4 },
            "weather": [{ "description": "cielo claro", "icon": "01d" }]
        }),
        forecast: json!({ "list": [
            forecast_item("2024-01-01 00:00:00", 10.0, 5.0, "lluvia", Some(0.0)),
            forecast_item("2024-01-01 03:00:00", 14.0, 4.0, "sol", Some(2.0)),
            forecast_item("2024-01-01 06:00:00", 9.0, 6.0, "nubes", None),
            forecast_item("2024-01-02 00:00:00", 20.0, 11.0, "sol", None),
        ]}),
    }
}

fn provinces() -> ProvinceDirectory {
    ProvinceDirectory::from_json_str(
        r#"{
            "Mendoza": ["Mendoza", "San Rafael", "Malargüe"],
            "Córdoba": [{ "name": "Córdoba", "default": true }, { "name": "Villa María" }]
        }"#,
    )
    .expect("valid provinces")
}

fn create_test_server(provider: Arc<MockProvider>) -> TestServer {
    let state = AppState::new(WeatherService::new(provider), provinces());
    TestServer::new(create_app(state, &ServerConfig::default()))
        .expect("Failed to create test server")
}

// ============================================================================
// /weather
// ============================================================================

#[tokio::test]
async fn weather_returns_current_and_weekly_forecast() {
    let provider = MockProvider::new(Ok(upstream()));
    let server = create_test_server(provider.clone());

    let response = server.get("/weather").add_query_param("city", "Mendoza").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({
            "city": "Mendoza",
            "current_weather": { "temp": 27.4, "description": "cielo claro", "icon": "01d" },
            "weekly_forecast": [
                {
                    "date": "2024-01-01",
                    "temp_max": 14.0,
                    "temp_min": 4.0,
                    "description": "lluvia",
                    "icon": "10d",
                    "rain_volume_mm": 2.0
                },
                {
                    "date": "2024-01-02",
                    "temp_max": 20.0,
                    "temp_min": 11.0,
                    "description": "sol",
                    "icon": "10d",
                    "rain_volume_mm": 0.0
                }
            ]
        })
    );
    assert_eq!(provider.requested(), vec!["Mendoza".to_string()]);
}

#[tokio::test]
async fn weather_without_city_is_bad_request_and_skips_upstream() {
    let provider = MockProvider::new(Ok(upstream()));
    let server = create_test_server(provider.clone());

    for response in [
        server.get("/weather").await,
        server.get("/weather").add_query_param("city", "").await,
    ] {
        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["error"], "parameter 'city' is required");
        assert_eq!(body["errors"], json!({ "city": ["required"] }));
    }

    assert!(provider.requested().is_empty());
}

#[tokio::test]
async fn upstream_errors_render_with_their_status() {
    let cases = [
        (ApiError::not_found("city 'Atlantis' not found by weather service"), StatusCode::NOT_FOUND),
        (ApiError::unauthorized("invalid or missing OpenWeatherMap API key"), StatusCode::UNAUTHORIZED),
        (ApiError::service_unavailable("could not connect"), StatusCode::SERVICE_UNAVAILABLE),
        (ApiError::gateway_timeout("too slow"), StatusCode::GATEWAY_TIMEOUT),
        (ApiError::internal("external weather service error: 502 - x"), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (err, status) in cases {
        let message = err.message().to_string();
        let server = create_test_server(MockProvider::new(Err(err)));

        let response = server.get("/weather").add_query_param("city", "Atlantis").await;

        assert_eq!(response.status_code(), status);
        let body: Value = response.json();
        assert_eq!(body, json!({ "error": message }));
    }
}

#[tokio::test]
async fn malformed_forecast_renders_internal_error() {
    let mut payloads = upstream();
    payloads.forecast = json!({ "list": [{ "dt_txt": "2024-01-01 00:00:00" }] });
    let server = create_test_server(MockProvider::new(Ok(payloads)));

    let response = server.get("/weather").add_query_param("city", "Mendoza").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert!(body["error"].as_str().expect("message").contains("main"));
}

// ============================================================================
// Province lookup
// ============================================================================

#[tokio::test]
async fn cities_by_province_lists_entries_as_stored() {
    let server = create_test_server(MockProvider::new(Ok(upstream())));

    let response = server.get("/cities_by_province").add_query_param("province", "Córdoba").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!([{ "name": "Córdoba", "default": true }, { "name": "Villa María" }]));
}

#[tokio::test]
async fn cities_by_province_errors() {
    let server = create_test_server(MockProvider::new(Ok(upstream())));

    let missing = server.get("/cities_by_province").await;
    missing.assert_status_bad_request();

    let unknown = server.get("/cities_by_province").add_query_param("province", "Atlantis").await;
    unknown.assert_status_not_found();
    let body: Value = unknown.json();
    assert_eq!(body["error"], "no cities found for province: Atlantis");
}

#[tokio::test]
async fn is_province_never_fails() {
    let server = create_test_server(MockProvider::new(Ok(upstream())));

    let known = server.get("/is_province").add_query_param("name", "Mendoza").await;
    known.assert_status_ok();
    assert_eq!(known.json::<Value>(), json!({ "is_province": true }));

    let city = server.get("/is_province").add_query_param("name", "San Rafael").await;
    assert_eq!(city.json::<Value>(), json!({ "is_province": false }));

    let padded = server.get("/is_province").add_query_param("name", " Mendoza ").await;
    assert_eq!(padded.json::<Value>(), json!({ "is_province": true }));

    let missing = server.get("/is_province").await;
    missing.assert_status_ok();
    assert_eq!(missing.json::<Value>(), json!({ "is_province": false }));
}

#[tokio::test]
async fn default_city_prefers_flag_then_first_entry() {
    let server = create_test_server(MockProvider::new(Ok(upstream())));

    let flagged = server.get("/default_city").add_query_param("province", "Córdoba").await;
    flagged.assert_status_ok();
    assert_eq!(flagged.json::<Value>(), json!({ "province": "Córdoba", "city": "Córdoba" }));

    let first = server.get("/default_city").add_query_param("province", " Mendoza ").await;
    first.assert_status_ok();
    assert_eq!(first.json::<Value>(), json!({ "province": "Mendoza", "city": "Mendoza" }));
}

#[tokio::test]
async fn default_city_errors() {
    let server = create_test_server(MockProvider::new(Ok(upstream())));

    let missing = server.get("/default_city").await;
    missing.assert_status_bad_request();
    assert_eq!(missing.json::<Value>()["errors"], json!({ "province": ["required"] }));

    let unknown = server.get("/default_city").add_query_param("province", "Atlantis").await;
    unknown.assert_status_not_found();
    assert_eq!(unknown.json::<Value>()["error"], "no cities found for province: Atlantis");
}

// ============================================================================
// Misc
// ============================================================================

#[tokio::test]
async fn health_reports_ok() {
    let server = create_test_server(MockProvider::new(Ok(upstream())));

    let response = server.get("/health").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn unknown_route_is_json_not_found() {
    let server = create_test_server(MockProvider::new(Ok(upstream())));

    let response = server.get("/nope").await;

    response.assert_status_not_found();
    assert_eq!(response.json::<Value>(), json!({ "error": "no route for /nope" }));
}
