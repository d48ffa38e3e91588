//! OpenAI-compatible chat-completions summarizer.
//!
//! Speaks the `/chat/completions` wire format over any compatible base
//! URL. When `log_dir` is set, every exchange is written to one file named
//! by timestamp + uuid, request first, response appended.

use std::{path::PathBuf, time::Duration};

use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use skein_core::Message;
use uuid::Uuid;

use crate::{Exemplar, Result, SummarizeError, Summarizer, prompt};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
  pub api_key:  String,
  pub model:    String,
  pub base_url: String,
  /// Directory for full request/response logs; `None` disables logging.
  pub log_dir:  Option<PathBuf>,
}

impl OpenAiConfig {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      api_key:  api_key.into(),
      model:    "gpt-5".into(),
      base_url: "https://api.openai.com/v1".into(),
      log_dir:  None,
    }
  }
}

// ─── Wire format ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
  model:    &'a str,
  messages: &'a [prompt::PromptMessage],
}

#[derive(Deserialize)]
struct ChatResponse {
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
  content: Option<String>,
}

// ─── Summarizer ──────────────────────────────────────────────────────────────

pub struct OpenAiSummarizer {
  client: Client,
  config: OpenAiConfig,
}

impl OpenAiSummarizer {
  pub fn new(config: OpenAiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(120))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!(
      "{}/chat/completions",
      self.config.base_url.trim_end_matches('/')
    )
  }

  /// Best-effort exchange logging; a failed log write never fails the call.
  async fn log_exchange(&self, request: &str, response: &str) {
    let Some(dir) = &self.config.log_dir else { return };
    let name = format!(
      "{}_{}",
      Utc::now().format("%Y_%m_%d_%H_%M_%S_%f"),
      Uuid::new_v4()
    );
    let entry = format!("REQUEST:\n{request}\n\n\nRESPONSE:\n{response}\n");

    let path = dir.join(name);
    if let Err(e) = tokio::fs::create_dir_all(dir).await {
      tracing::warn!(error = %e, "could not create summarizer log dir");
      return;
    }
    if let Err(e) = tokio::fs::write(&path, entry).await {
      tracing::warn!(error = %e, path = %path.display(), "could not write summarizer log");
    }
  }
}

impl Summarizer for OpenAiSummarizer {
  async fn archive_candidate(
    &self,
    instruction: &Message,
    background: &[Message],
    scene: &[Message],
    few_shots: &[Exemplar],
  ) -> Result<Message> {
    let first = scene.first().ok_or(SummarizeError::EmptyScene)?;
    let covered: Vec<u64> = scene.iter().map(|m| m.order).collect();

    let messages =
      prompt::build_prompt(instruction, background, scene, few_shots);
    let request = ChatRequest { model: &self.config.model, messages: &messages };
    let request_json = serde_json::to_string_pretty(&request)
      .map_err(|e| SummarizeError::MalformedResponse(e.to_string()))?;

    tracing::debug!(
      model = %self.config.model,
      turns = messages.len(),
      "requesting archive candidate"
    );
    let response = self
      .client
      .post(self.url())
      .bearer_auth(&self.config.api_key)
      .json(&request)
      .send()
      .await?;

    let status = response.status();
    let body = response.text().await?;
    self.log_exchange(&request_json, &body).await;

    if !status.is_success() {
      return Err(SummarizeError::Api { status: status.as_u16(), body });
    }

    let parsed: ChatResponse = serde_json::from_str(&body)
      .map_err(|e| SummarizeError::MalformedResponse(e.to_string()))?;
    let [choice] = parsed.choices.as_slice() else {
      return Err(SummarizeError::MalformedResponse(format!(
        "expected exactly one choice, got {}",
        parsed.choices.len()
      )));
    };
    let text = choice.message.content.clone().ok_or_else(|| {
      SummarizeError::MalformedResponse("choice without content".into())
    })?;

    Ok(Message::archive(first.thread_uid.clone(), text, covered)?)
  }
}
