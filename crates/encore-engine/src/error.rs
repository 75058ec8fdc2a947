//! Error types for `encore-engine`.
//!
//! Every public engine operation returns either a success payload or exactly
//! one of these; there is no automatic retry anywhere in the engine. Store
//! failures pass through unchanged inside [`Error::Store`] — they are
//! infrastructure failures, not domain outcomes.

use encore_core::CompletionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Missing or empty required input; detected before any I/O.
  #[error("validation error: {0}")]
  Validation(String),

  /// Feedback or deletion targeted a record that does not exist.
  #[error("not found: {0}")]
  NotFound(String),

  /// The completion call itself failed (transport, provider, timeout).
  #[error(transparent)]
  Completion(#[from] CompletionError),

  /// The completion returned text that is not a JSON suggestion array, even
  /// after stripping an optional markdown fence.
  #[error("malformed completion output: {0}")]
  MalformedCompletion(String),

  /// A persistence operation failed; propagated unchanged.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
