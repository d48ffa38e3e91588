//! The Summarizer boundary: turns an instruction, a compiled background,
//! and a current scene into one archive-candidate message covering the
//! scene's positions.
//!
//! Only the façade/API layer invokes a summarizer; the materializer never
//! does.

#![allow(async_fn_in_trait)]

pub mod error;
pub mod mock;
pub mod openai;
pub mod prompt;

pub use error::{Result, SummarizeError};
pub use mock::MockSummarizer;
pub use openai::{OpenAiConfig, OpenAiSummarizer};

use std::future::Future;

use skein_core::Message;

/// A complete background + scene + archive triple used to steer the
/// summarizer's output.
#[derive(Debug, Clone)]
pub struct Exemplar {
  pub background: Vec<Message>,
  pub scene:      Vec<Message>,
  pub archive:    Message,
}

/// An archive-candidate generator. Implementations are external
/// collaborators (LLM-backed or canned); the returned record covers exactly
/// the scene's positions and is not persisted here.
pub trait Summarizer: Send + Sync {
  fn archive_candidate<'a>(
    &'a self,
    instruction: &'a Message,
    background: &'a [Message],
    scene: &'a [Message],
    few_shots: &'a [Exemplar],
  ) -> impl Future<Output = Result<Message>> + Send + 'a;
}

/// Closed dispatch over the configured summarizer backends.
pub enum AnySummarizer {
  Mock(MockSummarizer),
  OpenAi(OpenAiSummarizer),
}

impl Summarizer for AnySummarizer {
  async fn archive_candidate(
    &self,
    instruction: &Message,
    background: &[Message],
    scene: &[Message],
    few_shots: &[Exemplar],
  ) -> Result<Message> {
    match self {
      Self::Mock(s) => {
        s.archive_candidate(instruction, background, scene, few_shots).await
      }
      Self::OpenAi(s) => {
        s.archive_candidate(instruction, background, scene, few_shots).await
      }
    }
  }
}
