//! Error taxonomy shared by all Skein crates.
//!
//! The store trait returns this concrete type rather than an associated
//! error: the materializer has to distinguish frontier termination
//! (`NotFound`) from fatal corruption (`InvariantViolation`), so the
//! taxonomy is part of the storage contract.

use thiserror::Error;

use crate::message::{Role, ThreadUid};

/// What a [`Error::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
  Message,
  Archive,
  Thread,
}

impl std::fmt::Display for Subject {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      Subject::Message => "message",
      Subject::Archive => "archive",
      Subject::Thread => "thread",
    };
    f.write_str(s)
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("{subject} not found at position {order} in thread {thread}")]
  NotFound {
    subject: Subject,
    thread:  ThreadUid,
    order:   u64,
  },

  /// The (thread, position, role-class) slot is already occupied.
  #[error("duplicate {role} record at position {order} in thread {thread}")]
  DuplicateRecord {
    thread: ThreadUid,
    order:  u64,
    role:   Role,
  },

  /// An archive insert covered a position with no prior record.
  #[error("archive covers position {order} in thread {thread}, which holds no record")]
  ArchiveTargetMissing { thread: ThreadUid, order: u64 },

  /// An archive insert covered a position already owned by another archive.
  #[error("archive covers position {order} in thread {thread}, already owned by another archive")]
  ArchiveOverlap { thread: ThreadUid, order: u64 },

  /// The archive record itself is malformed (empty, unsorted, or
  /// non-contiguous range; anchor not at the range minimum).
  #[error("malformed archive record: {0}")]
  MalformedArchive(String),

  /// Fatal internal-consistency failure. Never user-facing; a bug or
  /// on-disk corruption, not a request error.
  #[error("invariant violation: {0}")]
  InvariantViolation(String),

  #[error("storage backend error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn not_found(subject: Subject, thread: &ThreadUid, order: u64) -> Self {
    Self::NotFound { subject, thread: thread.clone(), order }
  }

  pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Storage(Box::new(err))
  }

  /// `true` for the kinds the materializer treats as frontier termination.
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::NotFound { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
