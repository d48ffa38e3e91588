//! Thread materialization and the dialog façade.
//!
//! [`Materializer`] resolves the archive-aware compiled view of a thread
//! with bounded-concurrency prefetch; [`DialogManager`] is the thin
//! orchestration layer the API speaks to.

pub mod dialog;
pub mod error;
pub mod materialize;

pub use dialog::DialogManager;
pub use error::DialogError;
pub use materialize::Materializer;

#[cfg(test)]
mod tests;
