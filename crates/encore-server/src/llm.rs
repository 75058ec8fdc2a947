//! OpenAI-compatible chat-completions client.
//!
//! Implements [`CompletionProvider`] over any endpoint speaking the
//! `/v1/chat/completions` shape. The request timeout is enforced here; an
//! expired call surfaces as a [`CompletionError`], which the engine treats
//! as a generation failure rather than degrading to fallback mode.

use std::time::Duration;

use anyhow::{Context, Result};
use encore_core::{CompletionError, CompletionProvider, completion::BoxFuture};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::settings::LlmConfig;

/// Async client for an OpenAI-compatible completion endpoint.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct OpenAiCompatClient {
  client: Client,
  config: LlmConfig,
}

impl OpenAiCompatClient {
  pub fn new(config: LlmConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!(
      "{}/v1/chat/completions",
      self.config.base_url.trim_end_matches('/')
    )
  }

  async fn chat(&self, prompt: &str) -> Result<String, CompletionError> {
    let body = ChatRequest {
      model: &self.config.model,
      messages: vec![ChatMessage { role: "user", content: prompt }],
    };

    let mut request = self.client.post(self.url()).json(&body);
    if let Some(key) = &self.config.api_key {
      request = request.bearer_auth(key);
    }

    let response = request
      .send()
      .await
      .map_err(|e| CompletionError(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
      return Err(CompletionError(format!(
        "completion endpoint returned {status}"
      )));
    }

    let parsed: ChatResponse = response
      .json()
      .await
      .map_err(|e| CompletionError(e.to_string()))?;

    parsed
      .choices
      .into_iter()
      .next()
      .map(|c| c.message.content)
      .ok_or_else(|| CompletionError("completion response had no choices".into()))
  }
}

impl CompletionProvider for OpenAiCompatClient {
  fn complete<'a>(
    &'a self,
    prompt: &'a str,
  ) -> BoxFuture<'a, Result<String, CompletionError>> {
    Box::pin(self.chat(prompt))
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
  model:    &'a str,
  messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
  role:    &'a str,
  content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
  choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
  message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
  content: String,
}
