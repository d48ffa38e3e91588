//! Read handlers for `/threads` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/threads/{uid}/messages` | Full sorted record listing |
//! | `GET` | `/threads/{uid}/messages/{order}` | 404 if absent |
//! | `GET` | `/threads/{uid}/compiled` | The materialized view |
//! | `GET` | `/threads/{uid}/instructions/archiving` | Singleton instruction |

use axum::{
  Json,
  extract::{Path, State},
};
use skein_core::{
  Message, ThreadUid, compiled::CompiledThread, store::RecordStore,
};

use crate::{AppState, error::ApiError};

/// `GET /threads/{uid}/messages`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Path(uid): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError>
where
  S: RecordStore + 'static,
{
  let thread = ThreadUid::from(uid);
  Ok(Json(state.dialog.messages(&thread).await?))
}

/// `GET /threads/{uid}/messages/{order}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path((uid, order)): Path<(String, u64)>,
) -> Result<Json<Message>, ApiError>
where
  S: RecordStore + 'static,
{
  let thread = ThreadUid::from(uid);
  Ok(Json(state.dialog.message_at(&thread, order).await?))
}

/// `GET /threads/{uid}/compiled`
pub async fn compiled<S>(
  State(state): State<AppState<S>>,
  Path(uid): Path<String>,
) -> Result<Json<CompiledThread>, ApiError>
where
  S: RecordStore + 'static,
{
  let thread = ThreadUid::from(uid);
  Ok(Json(state.dialog.compile_thread(&thread).await?))
}

/// `GET /threads/{uid}/instructions/archiving`
pub async fn instruction<S>(
  State(state): State<AppState<S>>,
  Path(uid): Path<String>,
) -> Result<Json<Message>, ApiError>
where
  S: RecordStore + 'static,
{
  let thread = ThreadUid::from(uid);
  Ok(Json(state.dialog.archiving_instruction(&thread).await?))
}
