//! Core types and trait definitions for the Skein thread archive store.
//!
//! This crate is deliberately free of HTTP, filesystem, and runtime
//! dependencies. All other crates depend on it; it depends on nothing
//! proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod compiled;
pub mod error;
pub mod message;
pub mod store;

pub use error::{Error, Result, Subject};
pub use message::{Message, Role, ThreadUid};
