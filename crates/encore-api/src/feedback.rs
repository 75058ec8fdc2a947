//! Handlers for feedback submission and the feedback-history query.

use axum::{
  Json,
  extract::{Query, State},
};
use encore_core::{
  recommendation::FeedbackEntry, store::RecommendationStore,
};
use encore_engine::Recommender;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;

// ─── Submit ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FeedbackBody {
  pub user_id:          String,
  /// The `recommended_item_id` of a previously generated recommendation.
  pub recommended_item: String,
  pub positive:         bool,
}

/// `POST /recommendations/feedback` — 404 when the item was never
/// recommended to this user.
pub async fn submit<S>(
  State(recommender): State<Recommender<S>>,
  Json(body): Json<FeedbackBody>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: RecommendationStore + Clone + Send + Sync + 'static,
{
  recommender
    .provide_feedback(&body.user_id, &body.recommended_item, body.positive)
    .await?;
  Ok(Json(json!({ "ok": true })))
}

// ─── History ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
  pub user_id: String,
  #[serde(default)]
  pub source_item: Option<String>,
}

/// `GET /recommendations/feedback-history?user_id=<u>[&source_item=<s>]`
pub async fn history<S>(
  State(recommender): State<Recommender<S>>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<FeedbackEntry>>, ApiError>
where
  S: RecommendationStore + Clone + Send + Sync + 'static,
{
  let entries = recommender
    .get_feedback_history(&params.user_id, params.source_item.as_deref())
    .await?;
  Ok(Json(entries))
}
