//! Extractor wrappers whose rejections go through `AppError`, so malformed
//! bodies and path segments get the same JSON error body as every other failure.

use axum::extract::{FromRequest, FromRequestParts};

use crate::errors::AppError;

/// `axum::Json` with an `AppError` rejection.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `axum::extract::Path` with an `AppError` rejection.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
