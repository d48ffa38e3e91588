//! Canned summarizer for development and tests. Produces a recognisable
//! placeholder text covering exactly the scene's positions.

use skein_core::Message;
use uuid::Uuid;

use crate::{Exemplar, Result, SummarizeError, Summarizer};

#[derive(Debug, Clone, Copy, Default)]
pub struct MockSummarizer;

impl Summarizer for MockSummarizer {
  async fn archive_candidate(
    &self,
    _instruction: &Message,
    _background: &[Message],
    scene: &[Message],
    _few_shots: &[Exemplar],
  ) -> Result<Message> {
    let first = scene.first().ok_or(SummarizeError::EmptyScene)?;
    let covered: Vec<u64> = scene.iter().map(|m| m.order).collect();
    let text = format!("Some generated {} for {covered:?}", Uuid::new_v4());
    Ok(Message::archive(first.thread_uid.clone(), text, covered)?)
  }
}

#[cfg(test)]
mod tests {
  use skein_core::{Role, ThreadUid};

  use super::*;

  #[tokio::test]
  async fn candidate_covers_the_scene_positions() {
    let uid = ThreadUid::from("t");
    let instruction = Message::raw(uid.clone(), 0, Role::System, "archive");
    let scene = vec![
      Message::raw(uid.clone(), 2, Role::User, "a"),
      Message::raw(uid.clone(), 3, Role::Assistant, "b"),
    ];

    let candidate = MockSummarizer
      .archive_candidate(&instruction, &[], &scene, &[])
      .await
      .unwrap();
    assert_eq!(candidate.role, Role::Archive);
    assert_eq!(candidate.order, 2);
    assert_eq!(candidate.archive_for, Some(vec![2, 3]));
  }

  #[tokio::test]
  async fn empty_scene_is_rejected() {
    let instruction = Message::raw("t", 0, Role::System, "archive");
    let err = MockSummarizer
      .archive_candidate(&instruction, &[], &[], &[])
      .await
      .unwrap_err();
    assert!(matches!(err, SummarizeError::EmptyScene));
  }

  #[tokio::test]
  async fn non_contiguous_scene_fails_shape_validation() {
    let instruction = Message::raw("t", 0, Role::System, "archive");
    let scene = vec![
      Message::raw("t", 2, Role::User, "a"),
      Message::raw("t", 5, Role::User, "b"),
    ];
    let err = MockSummarizer
      .archive_candidate(&instruction, &[], &scene, &[])
      .await
      .unwrap_err();
    assert!(matches!(err, SummarizeError::Core(_)));
  }
}
