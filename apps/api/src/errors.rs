use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::coaching::generator::GenerationError;
use crate::interviews::recorder::RecordError;
use crate::roster::index::LookupError;
use crate::roster::schema::SchemaError;
use crate::roster::snapshot::LoadError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Only `Schema` ends the session; every other variant is local to the
/// request and safe to retry.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Write error: {0}")]
    Write(StoreError),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<RecordError> for AppError {
    fn from(e: RecordError) -> Self {
        match e {
            RecordError::Validation(msg) => AppError::Validation(msg),
            RecordError::Write(source) => AppError::Write(source),
        }
    }
}

impl From<LoadError> for AppError {
    fn from(e: LoadError) -> Self {
        match e {
            LoadError::Schema(schema) => AppError::Schema(schema),
            store @ LoadError::Store { .. } => AppError::Store(store.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Schema(e) => {
                tracing::error!("Schema error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SCHEMA_ERROR",
                    format!("The interview data cannot be used until it is fixed and reloaded: {e}"),
                )
            }
            AppError::Lookup(e) => (StatusCode::NOT_FOUND, "LOOKUP_ERROR", e.to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Generation(e) => {
                tracing::error!("Generation error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_ERROR",
                    format!("Coaching text could not be generated, please retry: {e}"),
                )
            }
            AppError::Write(e) => {
                tracing::error!("Write error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "WRITE_ERROR",
                    format!("The interview record was not saved, please retry: {e}"),
                )
            }
            AppError::Store(msg) => {
                tracing::error!("Store error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "STORE_ERROR",
                    format!("The interview data could not be read: {msg}"),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
