//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Boundary status classes: missing message/archive/thread → 404,
//! malformed archive insert → 400, slot or thread-id conflict → 409,
//! invariant violations and backend failures → 500.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use skein_compile::DialogError;
use skein_summarize::SummarizeError;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<DialogError> for ApiError {
  fn from(err: DialogError) -> Self {
    use DialogError as E;
    match &err {
      E::MessageNotFound { .. }
      | E::ArchiveNotFound { .. }
      | E::ThreadNotFound { .. } => Self::NotFound(err.to_string()),
      E::ArchiveTargetMissing { .. } | E::MalformedArchive(_) => {
        Self::BadRequest(err.to_string())
      }
      E::DuplicateRecord { .. } | E::ArchiveOverlap { .. } => {
        Self::Conflict(err.to_string())
      }
      E::Internal(_) => Self::Internal(Box::new(err)),
    }
  }
}

impl From<SummarizeError> for ApiError {
  fn from(err: SummarizeError) -> Self {
    use SummarizeError as E;
    match &err {
      E::EmptyScene | E::Core(skein_core::Error::MalformedArchive(_)) => {
        Self::BadRequest(err.to_string())
      }
      _ => Self::Internal(Box::new(err)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "internal error in API handler");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
