//! Error type for `encore-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown feedback column value: {0}")]
  UnknownFeedback(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
