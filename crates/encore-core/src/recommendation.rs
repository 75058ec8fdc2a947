//! Recommendation — the sole persistent entity of the engine.
//!
//! A recommendation is an edge from a source item (the thing the user was
//! exploring) to a suggested item, annotated with a natural-language
//! justification and a confidence score. User feedback mutates the record in
//! place; everything else is immutable after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Feedback ────────────────────────────────────────────────────────────────

/// A user's judgment on a previously recommended item.
///
/// Absence of feedback is modelled as `Option<Feedback>::None` on the record,
/// not as a third variant: "no opinion yet" is a state of the record, not a
/// kind of opinion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
  Positive,
  Negative,
}

impl Feedback {
  pub fn is_positive(self) -> bool { matches!(self, Self::Positive) }

  /// Map from the wire-level boolean used by the feedback operation.
  pub fn from_bool(positive: bool) -> Self {
    if positive { Self::Positive } else { Self::Negative }
  }
}

// ─── Recommendation ──────────────────────────────────────────────────────────

/// A stored recommendation edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
  pub id:      Uuid,
  /// Owning user. Recommendations are never shared across users.
  pub user_id: String,

  /// Identifier of the item this recommendation was generated *from*.
  /// Taken from the source metadata's own id when available, otherwise the
  /// caller-supplied item identifier.
  pub source_item: String,

  /// Engine-generated identifier for the recommended item, derived from its
  /// display name plus the creation timestamp. An opaque, locally-scoped
  /// token — it never round-trips to any external catalog.
  pub recommended_item_id: String,

  /// Display name, e.g. `"Muse"` or `"Muse - Hysteria"`. Used for
  /// de-duplication and display.
  pub recommended_item_name: String,

  /// Natural-language justification, from the LLM or the fallback template.
  pub reasoning: String,

  /// Always within `[0, 1]`; clamped at creation.
  pub confidence: f64,

  /// Unset until the user reacts; overwritable any number of times.
  pub feedback: Option<Feedback>,

  /// Creation time, refreshed every time feedback is recorded — effectively
  /// "last touched". Used as the final tie-break in ranking.
  pub created_at: DateTime<Utc>,
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// One ranked retrieval result. Reasoning and confidence travel with it so a
/// UI can explain *why* without a second lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedRecommendation {
  /// Identifier of the suggested item (the "other side" of the stored edge).
  pub item:       String,
  /// Display name of the suggested item. Records store no display name for
  /// the source side, so a reverse lookup (querying by the recommended item)
  /// repeats the source identifier here.
  pub name:       String,
  pub reasoning:  String,
  pub confidence: f64,
}

/// One row of the feedback history query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
  pub recommendation_id: Uuid,
  /// Display name of the item the feedback was about.
  pub item:        String,
  pub feedback:    Feedback,
  pub reasoning:   String,
  pub source_item: String,
}

// ─── Clear scope ─────────────────────────────────────────────────────────────

/// What [`clear`](crate::store::RecommendationStore::clear) should remove.
///
/// The all-users wipe exists for administrative and test resets. It is an
/// explicit variant rather than an absent parameter so that callers can never
/// reach it by accident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearScope {
  /// Remove every recommendation belonging to one user.
  User(String),
  /// Remove every recommendation for every user.
  All,
}
