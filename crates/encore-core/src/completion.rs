//! The LLM completion boundary.
//!
//! From the engine's point of view an LLM is a single function
//! `complete(prompt) -> text`. The provider is optional: its absence is a
//! valid, detected configuration state that selects the deterministic
//! fallback path, not an error. A configured provider that fails or times
//! out is a generation failure — never a silent fallback.

use std::{future::Future, pin::Pin};

use thiserror::Error;

/// Boxed `Send` future, so the trait stays dyn-compatible and the engine can
/// hold an `Option<Arc<dyn CompletionProvider>>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A completion call failed in transport or at the provider.
#[derive(Debug, Error)]
#[error("completion provider error: {0}")]
pub struct CompletionError(pub String);

/// Abstraction over a text-completion backend.
pub trait CompletionProvider: Send + Sync {
  /// Send `prompt` and return the model's raw text response.
  ///
  /// The engine applies no timeout or retry of its own; implementations
  /// should enforce their own timeout policy and surface expiry as an
  /// error.
  fn complete<'a>(
    &'a self,
    prompt: &'a str,
  ) -> BoxFuture<'a, Result<String, CompletionError>>;
}
