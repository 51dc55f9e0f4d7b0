//! Typed API errors.
//!
//! Every failure that can reach a caller is one of these variants. Each variant
//! has a fixed HTTP-style status code, a crafted message and an optional
//! structured payload. Only the HTTP boundary turns them into responses.

use std::collections::BTreeMap;

use serde_json::{Value, json};
use thiserror::Error;

/// Field name -> reasons the field was rejected.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Message and optional payload carried by most variants.
#[derive(Debug, Clone, PartialEq)]
pub struct Detail {
    pub message: String,
    pub payload: Option<Value>,
}

impl Detail {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), payload: None }
    }
}

impl std::fmt::Display for Detail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Malformed or missing caller input.
    #[error("{0}")]
    BadRequest(Detail),

    /// The upstream provider rejected our credential.
    #[error("{0}")]
    Unauthorized(Detail),

    #[error("{0}")]
    Forbidden(Detail),

    /// City or province does not exist.
    #[error("{0}")]
    NotFound(Detail),

    #[error("{0}")]
    Conflict(Detail),

    /// A bad request with per-field reasons.
    #[error("{message}")]
    Validation { message: String, errors: FieldErrors },

    /// Unexpected failure, including structurally invalid upstream data.
    #[error("{0}")]
    InternalServerError(Detail),

    /// Upstream could not be reached.
    #[error("{0}")]
    ServiceUnavailable(Detail),

    /// Upstream did not answer within the configured timeout.
    #[error("{0}")]
    GatewayTimeout(Detail),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(Detail::new(message))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(Detail::new(message))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(Detail::new(message))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(Detail::new(message))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(Detail::new(message))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalServerError(Detail::new(message))
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(Detail::new(message))
    }

    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::GatewayTimeout(Detail::new(message))
    }

    /// Validation failure for a single field.
    pub fn validation(
        message: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.into(), vec![reason.into()]);
        Self::Validation { message: message.into(), errors }
    }

    /// Attach a structured payload. Validation errors already carry theirs
    /// and are returned unchanged.
    pub fn with_payload(mut self, value: Value) -> Self {
        if let Some(detail) = self.detail_mut() {
            detail.payload = Some(value);
        }
        self
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::Validation { .. } => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::InternalServerError(_) => 500,
            Self::ServiceUnavailable(_) => 503,
            Self::GatewayTimeout(_) => 504,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message, .. } => message,
            Self::BadRequest(d)
            | Self::Unauthorized(d)
            | Self::Forbidden(d)
            | Self::NotFound(d)
            | Self::Conflict(d)
            | Self::InternalServerError(d)
            | Self::ServiceUnavailable(d)
            | Self::GatewayTimeout(d) => &d.message,
        }
    }

    pub fn payload(&self) -> Option<Value> {
        match self {
            Self::Validation { errors, .. } if errors.is_empty() => None,
            Self::Validation { errors, .. } => Some(json!({ "errors": errors })),
            Self::BadRequest(d)
            | Self::Unauthorized(d)
            | Self::Forbidden(d)
            | Self::NotFound(d)
            | Self::Conflict(d)
            | Self::InternalServerError(d)
            | Self::ServiceUnavailable(d)
            | Self::GatewayTimeout(d) => d.payload.clone(),
        }
    }

    /// `(status_code, message, payload)`, the only view the boundary needs.
    pub fn render(&self) -> (u16, &str, Option<Value>) {
        (self.status_code(), self.message(), self.payload())
    }

    /// True for `BadRequest` and its `Validation` specialization.
    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::BadRequest(_) | Self::Validation { .. })
    }

    fn detail_mut(&mut self) -> Option<&mut Detail> {
        match self {
            Self::Validation { .. } => None,
            Self::BadRequest(d)
            | Self::Unauthorized(d)
            | Self::Forbidden(d)
            | Self::NotFound(d)
            | Self::Conflict(d)
            | Self::InternalServerError(d)
            | Self::ServiceUnavailable(d)
            | Self::GatewayTimeout(d) => Some(d),
        }
    }
}

/// Anything that is not already typed becomes a 500.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(format!("unexpected internal error: {err:#}"))
    }
}
