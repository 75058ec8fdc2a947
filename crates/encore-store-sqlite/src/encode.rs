//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings, and the tri-state feedback as a nullable integer (1 positive,
//! 0 negative, NULL unset).

use chrono::{DateTime, Utc};
use encore_core::recommendation::{Feedback, Recommendation};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Feedback ────────────────────────────────────────────────────────────────

pub fn encode_feedback(f: Option<Feedback>) -> Option<i64> {
  f.map(|f| match f {
    Feedback::Positive => 1,
    Feedback::Negative => 0,
  })
}

pub fn decode_feedback(v: Option<i64>) -> Result<Option<Feedback>> {
  match v {
    None => Ok(None),
    Some(1) => Ok(Some(Feedback::Positive)),
    Some(0) => Ok(Some(Feedback::Negative)),
    Some(other) => Err(Error::UnknownFeedback(other)),
  }
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw values read directly from a `recommendations` row.
pub struct RawRecommendation {
  pub id:                    String,
  pub user_id:               String,
  pub source_item:           String,
  pub recommended_item_id:   String,
  pub recommended_item_name: String,
  pub reasoning:             String,
  pub confidence:            f64,
  pub feedback:              Option<i64>,
  pub created_at:            String,
}

impl RawRecommendation {
  pub fn into_recommendation(self) -> Result<Recommendation> {
    Ok(Recommendation {
      id:                    decode_uuid(&self.id)?,
      user_id:               self.user_id,
      source_item:           self.source_item,
      recommended_item_id:   self.recommended_item_id,
      recommended_item_name: self.recommended_item_name,
      reasoning:             self.reasoning,
      confidence:            self.confidence,
      feedback:              decode_feedback(self.feedback)?,
      created_at:            decode_dt(&self.created_at)?,
    })
  }
}
