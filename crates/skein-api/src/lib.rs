//! JSON REST API for Skein.
//!
//! Exposes an axum [`Router`] backed by any [`skein_core::store::RecordStore`]
//! plus a configured [`Summarizer`](skein_summarize::Summarizer). TLS and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", skein_api::router(state))
//! ```

pub mod archives;
pub mod error;
pub mod threads;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use serde::Deserialize;
use skein_compile::DialogManager;
use skein_core::store::RecordStore;
use skein_summarize::AnySummarizer;

pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// `SKEIN_*` environment.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  #[serde(default)]
  pub summarizer: SummarizerConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerKind {
  #[default]
  Mock,
  OpenAi,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummarizerConfig {
  #[serde(default)]
  pub kind:     SummarizerKind,
  /// Required when `kind = "openai"`; validated at startup, not first use.
  pub api_key:  Option<String>,
  pub model:    Option<String>,
  pub base_url: Option<String>,
  pub log_dir:  Option<PathBuf>,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub dialog:     Arc<DialogManager<S>>,
  pub summarizer: Arc<AnySummarizer>,
}

// Manual impl: `S` itself is behind `Arc`s and need not be `Clone`.
impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      dialog:     Arc::clone(&self.dialog),
      summarizer: Arc::clone(&self.summarizer),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn router<S>(state: AppState<S>) -> Router<()>
where
  S: RecordStore + 'static,
{
  Router::new()
    .route(
      "/threads/{uid}/messages",
      get(threads::list::<S>).post(archives::insert::<S>),
    )
    .route("/threads/{uid}/messages/{order}", get(threads::get_one::<S>))
    .route("/threads/{uid}/compiled", get(threads::compiled::<S>))
    .route(
      "/threads/{uid}/instructions/archiving",
      get(threads::instruction::<S>),
    )
    .route("/threads/{uid}/archives/suggest", get(archives::suggest::<S>))
    .with_state(state)
}
