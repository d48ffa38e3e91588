//! The compiled thread — the archive-aware read model. Never stored,
//! always derived by the materializer.

use serde::{Deserialize, Serialize};

use crate::message::{Message, ThreadUid};

/// The resolved, ordered view of a thread: at each resolved position either
/// the raw message or the archive anchored there. Entries are strictly
/// increasing in `order` and their covered ranges never overlap; the
/// sequence ends at the frontier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledThread {
  pub thread_uid: ThreadUid,
  pub messages:   Vec<Message>,
}

impl CompiledThread {
  pub fn is_empty(&self) -> bool { self.messages.is_empty() }

  pub fn len(&self) -> usize { self.messages.len() }

  /// The first unresolved position — one past the last entry's covered
  /// range, or 1 for an empty view.
  pub fn frontier(&self) -> u64 {
    match self.messages.last() {
      Some(last) => match last.archive_range() {
        Ok(range) => *range.end() + 1,
        Err(_) => last.order + 1,
      },
      None => 1,
    }
  }
}
