//! Message types — the fundamental unit of the Skein thread store.
//!
//! A message is an immutable, position-addressed record in a conversation
//! thread. Messages are never updated or deleted; corrections happen by
//! appending archive records that supersede a contiguous range of
//! positions.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── ThreadUid ───────────────────────────────────────────────────────────────

/// Opaque identifier for a conversation thread.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ThreadUid(String);

impl ThreadUid {
  pub fn new(uid: impl Into<String>) -> Self { Self(uid.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl std::fmt::Display for ThreadUid {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for ThreadUid {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for ThreadUid {
  fn from(s: String) -> Self { Self(s) }
}

// ─── Role ────────────────────────────────────────────────────────────────────

/// The closed set of message roles. The lowercase name doubles as the role
/// tag in storage filenames.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  System,
  User,
  Assistant,
  Archive,
  Hidden,
}

impl Role {
  /// The lowercase tag used in filenames and wire payloads.
  /// Must match the `rename_all = "lowercase"` serde tags above.
  pub fn tag(&self) -> &'static str {
    match self {
      Role::System => "system",
      Role::User => "user",
      Role::Assistant => "assistant",
      Role::Archive => "archive",
      Role::Hidden => "hidden",
    }
  }
}

impl std::fmt::Display for Role {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.tag())
  }
}

impl std::str::FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "system" => Ok(Role::System),
      "user" => Ok(Role::User),
      "assistant" => Ok(Role::Assistant),
      "archive" => Ok(Role::Archive),
      "hidden" => Ok(Role::Hidden),
      other => {
        Err(Error::InvariantViolation(format!("unknown role tag {other:?}")))
      }
    }
  }
}

// ─── Message ─────────────────────────────────────────────────────────────────

/// An immutable record at one position of a thread.
///
/// `archive_for` is present iff `role == Role::Archive`, in which case it is
/// a sorted, non-empty, contiguous list of the positions the archive
/// supersedes, and `order` equals its minimum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  pub thread_uid:  ThreadUid,
  pub order:       u64,
  pub role:        Role,
  pub text:        String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub archive_for: Option<Vec<u64>>,
}

impl Message {
  /// Construct a raw (non-archive) message.
  pub fn raw(
    thread_uid: impl Into<ThreadUid>,
    order: u64,
    role: Role,
    text: impl Into<String>,
  ) -> Self {
    Self {
      thread_uid: thread_uid.into(),
      order,
      role,
      text: text.into(),
      archive_for: None,
    }
  }

  /// Construct an archive record covering `archive_for`. The anchor order
  /// is derived from the range minimum. Fails if the covered positions are
  /// not a non-empty, sorted, contiguous run.
  pub fn archive(
    thread_uid: impl Into<ThreadUid>,
    text: impl Into<String>,
    archive_for: Vec<u64>,
  ) -> Result<Self> {
    let message = Self {
      thread_uid:  thread_uid.into(),
      order:       archive_for.first().copied().unwrap_or(0),
      role:        Role::Archive,
      text:        text.into(),
      archive_for: Some(archive_for),
    };
    message.validate()?;
    Ok(message)
  }

  pub fn is_archive(&self) -> bool { self.role == Role::Archive }

  /// Check the archive-shape invariants. A no-op for raw messages other
  /// than rejecting a stray `archive_for`.
  pub fn validate(&self) -> Result<()> {
    match (&self.role, &self.archive_for) {
      (Role::Archive, Some(covered)) => {
        let Some(&min) = covered.first() else {
          return Err(Error::MalformedArchive(
            "archive_for must not be empty".into(),
          ));
        };
        if !covered.windows(2).all(|w| w[1] == w[0] + 1) {
          return Err(Error::MalformedArchive(format!(
            "archive_for {covered:?} is not a sorted contiguous range"
          )));
        }
        if self.order != min {
          return Err(Error::MalformedArchive(format!(
            "archive anchored at {} but its range starts at {min}",
            self.order
          )));
        }
        Ok(())
      }
      (Role::Archive, None) => Err(Error::MalformedArchive(
        "archive record without archive_for".into(),
      )),
      (_, Some(_)) => Err(Error::MalformedArchive(format!(
        "{} record carries archive_for",
        self.role
      ))),
      (_, None) => Ok(()),
    }
  }

  /// The closed range `[min, max]` an archive record supersedes.
  ///
  /// Selecting an archive with an unset or invalid range during a merge is
  /// an internal-consistency violation — append-time validation makes it
  /// unreachable — so this returns [`Error::InvariantViolation`] rather
  /// than a user-facing kind.
  pub fn archive_range(&self) -> Result<RangeInclusive<u64>> {
    let covered = self
      .archive_for
      .as_ref()
      .filter(|_| self.role == Role::Archive)
      .ok_or_else(|| {
        Error::InvariantViolation(format!(
          "{} record at position {} treated as archive",
          self.role, self.order
        ))
      })?;
    match (covered.first(), covered.last()) {
      (Some(&min), Some(&max)) if min == self.order && min <= max => {
        Ok(min..=max)
      }
      _ => Err(Error::InvariantViolation(format!(
        "archive at position {} has invalid range {covered:?}",
        self.order
      ))),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn archive_constructor_derives_anchor() {
    let a = Message::archive("t", "compacted", vec![2, 3, 4]).unwrap();
    assert_eq!(a.order, 2);
    assert_eq!(a.archive_range().unwrap(), 2..=4);
  }

  #[test]
  fn archive_rejects_empty_range() {
    assert!(matches!(
      Message::archive("t", "compacted", vec![]),
      Err(Error::MalformedArchive(_))
    ));
  }

  #[test]
  fn archive_rejects_gap_in_range() {
    assert!(matches!(
      Message::archive("t", "compacted", vec![2, 4]),
      Err(Error::MalformedArchive(_))
    ));
  }

  #[test]
  fn archive_rejects_anchor_off_minimum() {
    let mut a = Message::archive("t", "compacted", vec![2, 3]).unwrap();
    a.order = 3;
    assert!(matches!(a.validate(), Err(Error::MalformedArchive(_))));
  }

  #[test]
  fn raw_message_rejects_stray_archive_for() {
    let mut m = Message::raw("t", 1, Role::User, "hi");
    m.archive_for = Some(vec![1]);
    assert!(matches!(m.validate(), Err(Error::MalformedArchive(_))));
  }

  #[test]
  fn role_tag_round_trip() {
    for role in
      [Role::System, Role::User, Role::Assistant, Role::Archive, Role::Hidden]
    {
      assert_eq!(role.tag().parse::<Role>().unwrap(), role);
    }
  }
}
