//! Façade-level error kinds with a stable subject classification.
//!
//! The conversion from [`skein_core::Error`] is an exhaustive match over a
//! closed enum: a new store-level kind without a handler here is a compile
//! error, not a silently swallowed value.

use skein_core::{Subject, ThreadUid};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DialogError {
  #[error("there is no message {order} in thread {thread}")]
  MessageNotFound { thread: ThreadUid, order: u64 },

  #[error("there is no archive anchored at {order} in thread {thread}")]
  ArchiveNotFound { thread: ThreadUid, order: u64 },

  #[error("there is no thread {thread}")]
  ThreadNotFound { thread: ThreadUid },

  #[error("position {order} in thread {thread} is already occupied")]
  DuplicateRecord { thread: ThreadUid, order: u64 },

  #[error("archive covers position {order} in thread {thread}, which holds no record")]
  ArchiveTargetMissing { thread: ThreadUid, order: u64 },

  #[error("archive covers position {order} in thread {thread}, already owned by another archive")]
  ArchiveOverlap { thread: ThreadUid, order: u64 },

  #[error("malformed archive record: {0}")]
  MalformedArchive(String),

  /// Invariant violations and backend failures. Never mapped to a request
  /// error; these fail loudly.
  #[error("internal error: {0}")]
  Internal(#[source] skein_core::Error),
}

impl From<skein_core::Error> for DialogError {
  fn from(err: skein_core::Error) -> Self {
    use skein_core::Error as E;
    match err {
      E::NotFound { subject: Subject::Message, thread, order } => {
        Self::MessageNotFound { thread, order }
      }
      E::NotFound { subject: Subject::Archive, thread, order } => {
        Self::ArchiveNotFound { thread, order }
      }
      E::NotFound { subject: Subject::Thread, thread, .. } => {
        Self::ThreadNotFound { thread }
      }
      E::DuplicateRecord { thread, order, .. } => {
        Self::DuplicateRecord { thread, order }
      }
      E::ArchiveTargetMissing { thread, order } => {
        Self::ArchiveTargetMissing { thread, order }
      }
      E::ArchiveOverlap { thread, order } => {
        Self::ArchiveOverlap { thread, order }
      }
      E::MalformedArchive(reason) => Self::MalformedArchive(reason),
      err @ (E::InvariantViolation(_) | E::Storage(_)) => Self::Internal(err),
    }
  }
}

pub type Result<T, E = DialogError> = std::result::Result<T, E>;
