//! File-backed record store for Skein.
//!
//! One artifact per record, named deterministically by zero-padded position
//! (and, for archives, the zero-padded range end) plus a role tag, so a
//! directory listing alone reconstructs the full record set. No separate
//! index file is ever written; the archive index is derived in memory.

mod index;
mod naming;
mod store;

pub use store::FsStore;
