//! Runtime server configuration, deserialised from `config.toml` with
//! `ENCORE_`-prefixed environment overrides.

use std::path::PathBuf;

use serde::Deserialize;

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8402 }
fn default_store_path() -> PathBuf { PathBuf::from("encore.db") }

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_port")]
  pub port: u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// Absent means no completion provider: generation degrades to the
  /// deterministic fallback path.
  #[serde(default)]
  pub llm: Option<LlmConfig>,
}

fn default_model() -> String { "gpt-4o-mini".into() }
fn default_timeout_secs() -> u64 { 60 }

/// Connection settings for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
  /// E.g. `https://api.openai.com` or a local llama.cpp/ollama gateway.
  pub base_url: String,
  #[serde(default)]
  pub api_key: Option<String>,
  #[serde(default = "default_model")]
  pub model: String,
  /// A completion that outlives this is a generation failure, not a
  /// fallback.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}
