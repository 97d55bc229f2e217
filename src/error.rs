// src/error.rs

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;

use crate::backend::BackendError;
use crate::models::EstadoDevolucion;

/// Application error taxonomy. Every request handler returns
/// `Result<HttpResponse, Error>`; the `ResponseError` impl maps each
/// variant to its status code and a `{"error": ...}` body.
#[derive(Debug, Error)]
pub enum Error {
    #[error("authentication required")]
    NotAuthenticated,

    #[error("forbidden")]
    Forbidden,

    #[error("backend credentials are not configured")]
    NotConfigured,

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("{0}")]
    ValidationFailed(String),

    #[error("the 30-day return window for this order has expired")]
    WindowExpired,

    #[error("a pending return already exists for this product in this order")]
    DuplicatePending,

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: EstadoDevolucion,
        to: EstadoDevolucion,
    },
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::ValidationFailed(msg.into())
    }
}

impl From<BackendError> for Error {
    fn from(value: BackendError) -> Self {
        Error::BackendUnavailable(value.to_string())
    }
}

impl actix_web::ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            Error::BackendUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            Error::WindowExpired => StatusCode::BAD_REQUEST,
            Error::DuplicatePending => StatusCode::CONFLICT,
            Error::InvalidTransition { .. } => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
