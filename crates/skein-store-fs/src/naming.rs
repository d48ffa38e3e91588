//! The filename codec for on-disk records.
//!
//! Raw records:     `{order:06}_{role}.txt`        e.g. `000003_user.txt`
//! Archive records: `{min:06}-{max:06}_archive.txt` e.g. `000002-000004_archive.txt`
//!
//! The thread-scoped archiving instruction lives outside the positional
//! namespace as `archiving_instruction.txt`.

use std::str::FromStr;

use skein_core::{Error, Message, Result, Role, ThreadUid};

/// Singleton instruction file, not part of the positional record set.
pub const INSTRUCTION_FILE: &str = "archiving_instruction.txt";

const EXTENSION: &str = ".txt";
const PAD: usize = 6;

/// The parsed form of a record filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordName {
  pub order:     u64,
  /// Inclusive range end; present iff the record is an archive.
  pub range_end: Option<u64>,
  pub role:      Role,
}

impl RecordName {
  /// The storage name for a validated message.
  pub fn of(message: &Message) -> Result<Self> {
    message.validate()?;
    let range_end = if message.is_archive() {
      Some(*message.archive_range()?.end())
    } else {
      None
    };
    Ok(Self { order: message.order, range_end, role: message.role })
  }

  pub fn file_name(&self) -> String {
    match self.range_end {
      Some(end) => format!(
        "{:0PAD$}-{:0PAD$}_{}{EXTENSION}",
        self.order, end, self.role
      ),
      None => format!("{:0PAD$}_{}{EXTENSION}", self.order, self.role),
    }
  }

  /// Parse a directory entry name. Returns `None` for files that are not
  /// positional records (the instruction file, editor droppings, etc.).
  pub fn parse(name: &str) -> Option<Self> {
    let stem = name.strip_suffix(EXTENSION)?;
    let (positions, role) = stem.split_once('_')?;
    let role = Role::from_str(role).ok()?;

    let (order, range_end) = match positions.split_once('-') {
      Some((start, end)) => {
        (parse_padded(start)?, Some(parse_padded(end)?))
      }
      None => (parse_padded(positions)?, None),
    };

    // The role tag and the name shape must agree.
    if (role == Role::Archive) != range_end.is_some() {
      return None;
    }

    Some(Self { order, range_end, role })
  }

  pub fn is_archive(&self) -> bool { self.range_end.is_some() }

  /// Rebuild the record from its parsed name and file contents.
  pub fn into_message(
    self,
    thread: &ThreadUid,
    text: String,
  ) -> Result<Message> {
    match self.range_end {
      Some(end) if end >= self.order => {
        Message::archive(thread.clone(), text, (self.order..=end).collect())
      }
      Some(end) => Err(Error::InvariantViolation(format!(
        "archive artifact with inverted range {}-{end}",
        self.order
      ))),
      None => Ok(Message::raw(thread.clone(), self.order, self.role, text)),
    }
  }
}

fn parse_padded(s: &str) -> Option<u64> {
  if s.len() != PAD || !s.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  s.parse().ok()
}
