//! Chat-prompt assembly.
//!
//! Thread roles do not map one-to-one onto chat-completion roles: an
//! archive record reads as prior user narration, and hidden messages never
//! reach the model. The remap table is closed and fixed:
//!
//! | thread role | prompt role |
//! |-------------|-------------|
//! | system      | system      |
//! | user        | user        |
//! | assistant   | assistant   |
//! | archive     | user        |
//! | hidden      | (excluded)  |

use serde::Serialize;

use skein_core::{Message, Role};

use crate::Exemplar;

/// One chat-completion turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptMessage {
  pub role:    &'static str,
  pub content: String,
}

/// The prompt role for a thread role; `None` means the message is excluded
/// from the prompt entirely.
pub fn prompt_role(role: Role) -> Option<&'static str> {
  match role {
    Role::System => Some("system"),
    Role::User => Some("user"),
    Role::Assistant => Some("assistant"),
    Role::Archive => Some("user"),
    Role::Hidden => None,
  }
}

fn remap(messages: &[Message], out: &mut Vec<PromptMessage>) {
  for message in messages {
    if let Some(role) = prompt_role(message.role) {
      out.push(PromptMessage { role, content: message.text.clone() });
    }
  }
}

/// Assemble the full prompt: the archiving instruction, then each few-shot
/// exemplar (its background and scene, followed by its archive text as an
/// assistant turn), then the live background and scene.
pub fn build_prompt(
  instruction: &Message,
  background: &[Message],
  scene: &[Message],
  few_shots: &[Exemplar],
) -> Vec<PromptMessage> {
  let mut prompt = vec![PromptMessage {
    role:    "system",
    content: instruction.text.clone(),
  }];

  for exemplar in few_shots {
    remap(&exemplar.background, &mut prompt);
    remap(&exemplar.scene, &mut prompt);
    prompt.push(PromptMessage {
      role:    "assistant",
      content: exemplar.archive.text.clone(),
    });
  }

  remap(background, &mut prompt);
  remap(scene, &mut prompt);
  prompt
}
