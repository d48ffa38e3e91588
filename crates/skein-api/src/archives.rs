//! Archive handlers: candidate suggestion and archive-record insertion.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/threads/{uid}/archives/suggest?orders=…&orders=…` | Invokes the summarizer; nothing is persisted |
//! | `POST` | `/threads/{uid}/messages` | Archive-role inserts only |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use skein_core::{Message, Role, ThreadUid, store::RecordStore};
use skein_summarize::Summarizer as _;

use crate::{AppState, error::ApiError};

/// `GET /threads/{uid}/archives/suggest?orders=2&orders=3`
///
/// Compiles the background strictly before the scene, reads the scene's
/// raw messages, and asks the configured summarizer for one
/// archive-candidate covering those positions. The candidate is returned,
/// not stored; persisting it is a separate `POST`.
pub async fn suggest<S>(
  State(state): State<AppState<S>>,
  Path(uid): Path<String>,
  Query(params): Query<Vec<(String, u64)>>,
) -> Result<Json<Message>, ApiError>
where
  S: RecordStore + 'static,
{
  let thread = ThreadUid::from(uid);

  if let Some((key, _)) = params.iter().find(|(key, _)| key != "orders") {
    return Err(ApiError::BadRequest(format!(
      "unknown query parameter {key:?}"
    )));
  }
  let mut orders: Vec<u64> = params.into_iter().map(|(_, v)| v).collect();
  orders.sort_unstable();
  orders.dedup();
  let Some(&first) = orders.first() else {
    return Err(ApiError::BadRequest(
      "at least one orders= parameter is required".into(),
    ));
  };

  let background = state.dialog.compile_background(&thread, first).await?;
  let scene = state.dialog.scene_messages(&thread, &orders).await?;
  let instruction = state.dialog.archiving_instruction(&thread).await?;

  let candidate = state
    .summarizer
    .archive_candidate(&instruction, &background, &scene, &[])
    .await?;
  Ok(Json(candidate))
}

/// `POST /threads/{uid}/messages`
///
/// Only archive-role records may be inserted over the API; raw messages
/// enter the store out of band. The path and body thread ids must agree.
pub async fn insert<S>(
  State(state): State<AppState<S>>,
  Path(uid): Path<String>,
  Json(record): Json<Message>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + 'static,
{
  let thread = ThreadUid::from(uid);

  if record.thread_uid != thread {
    return Err(ApiError::Conflict(format!(
      "body thread id {} does not match path thread id {thread}",
      record.thread_uid
    )));
  }
  if record.role != Role::Archive {
    return Err(ApiError::BadRequest(format!(
      "only archive records may be posted, got role {}",
      record.role
    )));
  }

  let stored = state.dialog.append_archive(record).await?;
  Ok((StatusCode::CREATED, Json(stored)))
}
