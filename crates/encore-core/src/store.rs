//! The `RecommendationStore` trait and supporting query type.
//!
//! The trait is implemented by storage backends (e.g. `encore-store-sqlite`).
//! The engine and the API layer depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::recommendation::{Feedback, Recommendation};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Filter parameters for [`RecommendationStore::find`] and
/// [`RecommendationStore::count`]. All fields are conjunctive; a default
/// query matches everything.
#[derive(Debug, Clone, Default)]
pub struct RecommendationQuery {
  pub user_id:     Option<String>,
  /// Match on the stored `source_item` column.
  pub source_item: Option<String>,
  /// Match on the stored `recommended_item_id` column.
  pub recommended_item: Option<String>,
  /// Match records where *either* `source_item` or `recommended_item_id`
  /// equals this value — recommendations are symmetric lookup keys.
  pub either_item: Option<String>,
  /// `Some(true)`: only records with feedback set; `Some(false)`: only
  /// records with feedback unset.
  pub has_feedback: Option<bool>,
}

impl RecommendationQuery {
  /// All records owned by `user_id`.
  pub fn for_user(user_id: impl Into<String>) -> Self {
    Self { user_id: Some(user_id.into()), ..Default::default() }
  }

  pub fn with_source(mut self, source_item: impl Into<String>) -> Self {
    self.source_item = Some(source_item.into());
    self
  }

  pub fn with_either(mut self, item: impl Into<String>) -> Self {
    self.either_item = Some(item.into());
    self
  }

  pub fn with_recommended(mut self, item: impl Into<String>) -> Self {
    self.recommended_item = Some(item.into());
    self
  }

  pub fn feedback_set(mut self, set: bool) -> Self {
    self.has_feedback = Some(set);
    self
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a recommendation store backend.
///
/// The engine issues short sequences of reads followed by a single batched
/// write per operation; the store provides no cross-call locking, and
/// near-simultaneous duplicate inserts from concurrent `generate` calls are
/// the tolerated failure mode.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecommendationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a batch of freshly generated recommendations.
  fn insert_many(
    &self,
    records: Vec<Recommendation>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Return every record matching `query`, in no particular order.
  fn find<'a>(
    &'a self,
    query: &'a RecommendationQuery,
  ) -> impl Future<Output = Result<Vec<Recommendation>, Self::Error>> + Send + 'a;

  /// Count records matching `query` without materialising them.
  fn count<'a>(
    &'a self,
    query: &'a RecommendationQuery,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// Set `feedback` and refresh `created_at` to `touched_at` on **every**
  /// record matching `(user_id, recommended_item_id)`. Returns the number
  /// of records updated (zero when none matched).
  fn set_feedback<'a>(
    &'a self,
    user_id: &'a str,
    recommended_item_id: &'a str,
    feedback: Feedback,
    touched_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// Delete one record by primary id. Returns `false` if no such record
  /// existed.
  fn delete_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete every record for `user_id`, or every record for every user when
  /// `user_id` is `None`. Returns the number of records removed.
  fn clear<'a>(
    &'a self,
    user_id: Option<&'a str>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;
}
