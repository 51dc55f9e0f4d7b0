//! Route definitions

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;
use weather_core::ServerConfig;

use crate::{error::panic_response, handlers, state::AppState};

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/weather", get(handlers::weather))
        .route("/cities_by_province", get(handlers::cities_by_province))
        .route("/default_city", get(handlers::default_city))
        .route("/is_province", get(handlers::is_province))
        .fallback(handlers::not_found)
        .with_state(state)
}

/// Router plus tracing, CORS and panic recovery.
pub fn create_app(state: AppState, server: &ServerConfig) -> Router {
    create_router(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer(&server.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::new().allow_origin(Any).allow_methods([Method::GET]).allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new().allow_origin(origins).allow_methods([Method::GET]).allow_headers(Any)
}
