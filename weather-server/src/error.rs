//! The boundary where typed errors become HTTP responses.

use std::any::Any;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use tracing::{error, warn};
use weather_core::ApiError;

/// Wrapper so handlers can return `ApiError` with `?`.
#[derive(Debug)]
pub struct HttpError(pub ApiError);

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (code, message, payload) = self.0.render();
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(status = code, error = %message, "Request failed");
        } else {
            warn!(status = code, error = %message, "Request rejected");
        }

        (status, Json(error_body(message, payload))).into_response()
    }
}

/// `{"error": message}` plus the payload's fields. A non-object payload is
/// kept under `"payload"`.
fn error_body(message: &str, payload: Option<Value>) -> Value {
    let mut body = Map::new();
    body.insert("error".to_string(), Value::String(message.to_string()));

    match payload {
        Some(Value::Object(fields)) => {
            for (key, value) in fields {
                body.entry(key).or_insert(value);
            }
        }
        Some(other) => {
            body.insert("payload".to_string(), other);
        }
        None => {}
    }

    Value::Object(body)
}

/// Response for a handler panic, used by the catch-panic layer.
pub fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    HttpError(ApiError::internal("unexpected internal server error")).into_response()
}
