//! HTTP boundary for the weather proxy.
//!
//! This crate focuses on:
//! - Route registration and query extraction
//! - Rendering `weather_core::ApiError` as JSON responses
//! - CORS, request tracing and panic recovery

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::HttpError;
pub use routes::{create_app, create_router};
pub use state::AppState;
