//! Error type for `skein-summarize`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummarizeError {
  #[error("scene is empty; nothing to archive")]
  EmptyScene,

  #[error("summarizer transport error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("summarizer API returned status {status}: {body}")]
  Api { status: u16, body: String },

  #[error("malformed summarizer response: {0}")]
  MalformedResponse(String),

  /// The generated candidate failed archive-shape validation (e.g. the
  /// requested scene positions were not contiguous).
  #[error(transparent)]
  Core(#[from] skein_core::Error),
}

pub type Result<T, E = SummarizeError> = std::result::Result<T, E>;
