//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("not found: {0}")]
  NotFound(String),

  /// The completion provider failed or returned unusable output.
  #[error("upstream failure: {0}")]
  Upstream(String),

  #[error("store error: {0}")]
  Store(String),
}

impl From<encore_engine::Error> for ApiError {
  fn from(e: encore_engine::Error) -> Self {
    match e {
      encore_engine::Error::Validation(m) => ApiError::BadRequest(m),
      encore_engine::Error::NotFound(m) => ApiError::NotFound(m),
      encore_engine::Error::Completion(e) => ApiError::Upstream(e.to_string()),
      encore_engine::Error::MalformedCompletion(m) => ApiError::Upstream(m),
      encore_engine::Error::Store(e) => ApiError::Store(e.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Upstream(m) => (StatusCode::BAD_GATEWAY, m.clone()),
      ApiError::Store(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
