//! The derived archive index: covered position → owning archive record.
//!
//! Rebuilt in full from a directory scan on every successful archive
//! append, then swapped atomically so concurrent readers never observe a
//! torn intermediate state.

use std::{collections::HashMap, ops::RangeInclusive};

use skein_core::{Error, Message, Result};

#[derive(Debug, Default)]
pub struct ArchiveIndex {
  owners: HashMap<u64, Message>,
}

impl ArchiveIndex {
  /// Build the index from an unordered record scan. Two archives claiming
  /// the same position is on-disk corruption, not a request error.
  pub fn build(records: &[Message]) -> Result<Self> {
    let mut owners = HashMap::new();

    for record in records.iter().filter(|r| r.is_archive()) {
      for position in record.archive_range()? {
        if let Some(previous) = owners.insert(position, record.clone()) {
          return Err(Error::InvariantViolation(format!(
            "archives at {} and {} both cover position {position}",
            previous.order, record.order
          )));
        }
      }
    }

    Ok(Self { owners })
  }

  /// The archive owning `position`, whether anchored there or covering it.
  pub fn owner_of(&self, position: u64) -> Option<&Message> {
    self.owners.get(&position)
  }

  /// The archive anchored at `position` (its range minimum).
  pub fn anchored_at(&self, position: u64) -> Option<&Message> {
    self.owners.get(&position).filter(|a| a.order == position)
  }

  /// The first position in `range` already owned by an existing archive.
  pub fn first_owned(&self, range: RangeInclusive<u64>) -> Option<u64> {
    range.into_iter().find(|p| self.owners.contains_key(p))
  }
}
