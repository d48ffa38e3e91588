//! The `RecordStore` trait.
//!
//! Implemented by storage backends (e.g. `skein-store-fs`). Higher layers
//! (`skein-compile`, `skein-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::{
  Result,
  message::{Message, ThreadUid},
};

/// Abstraction over a Skein record store backend.
///
/// Records are append-only and immutable: there is no update or delete.
/// Missing records are reported as typed [`crate::Error::NotFound`] values,
/// which the materializer treats as frontier termination.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  /// Append a raw (non-archive) message.
  ///
  /// Fails with [`crate::Error::DuplicateRecord`] if the
  /// (thread, position, raw) slot is already occupied, and with
  /// [`crate::Error::MalformedArchive`] when handed an archive-role
  /// record — those go through [`RecordStore::append_archive`].
  fn append(
    &self,
    message: Message,
  ) -> impl Future<Output = Result<Message>> + Send + '_;

  /// The raw message at `order`, or `NotFound{message}`.
  fn message_at<'a>(
    &'a self,
    thread: &'a ThreadUid,
    order: u64,
  ) -> impl Future<Output = Result<Message>> + Send + 'a;

  /// The archive record anchored at `order` (i.e. whose range starts
  /// there), or `NotFound{archive}`.
  fn archive_at<'a>(
    &'a self,
    thread: &'a ThreadUid,
    order: u64,
  ) -> impl Future<Output = Result<Message>> + Send + 'a;

  /// Unordered full scan of every record in the thread. Used for archive
  /// index rebuilds and by the listing endpoint.
  fn list_all<'a>(
    &'a self,
    thread: &'a ThreadUid,
  ) -> impl Future<Output = Result<Vec<Message>>> + Send + 'a;

  /// Append an archive record after validating that every covered position
  /// holds a prior record and that no existing archive owns any of them.
  /// The write is all-or-nothing; the store's archive index is rebuilt and
  /// swapped atomically before the call returns.
  ///
  /// Serialized per thread: concurrent reads observe either the pre- or
  /// post-append index, never a torn intermediate state.
  fn append_archive(
    &self,
    record: Message,
  ) -> impl Future<Output = Result<Message>> + Send + '_;

  /// The thread-scoped archiving instruction — a singleton system message
  /// living outside the positional namespace.
  fn archiving_instruction<'a>(
    &'a self,
    thread: &'a ThreadUid,
  ) -> impl Future<Output = Result<Message>> + Send + 'a;
}
