//! Handlers for retrieval, deletion, and clearing.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/recommendations` | `?user_id`, `?item`, `?amount` required |
//! | `DELETE` | `/recommendations/{id}` | 404 if absent |
//! | `POST`   | `/recommendations/clear` | `{"user_id": ...}` XOR `{"all": true}` |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use encore_core::{
  recommendation::{ClearScope, RankedRecommendation},
  store::RecommendationStore,
};
use encore_engine::Recommender;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ────────────────────────────────────────────────────────────────────

fn default_feedbacked() -> bool { true }

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub user_id: String,
  /// The item to look up — either side of a stored edge.
  pub item:    String,
  pub amount:  usize,
  /// `true` (default): positive + unset, negatives excluded.
  /// `false`: unset only.
  #[serde(default = "default_feedbacked")]
  pub feedbacked: bool,
  /// Comma-separated candidate ids to leave out of the results.
  #[serde(default)]
  pub ignore: Option<String>,
}

/// `GET /recommendations?user_id=<u>&item=<i>&amount=<n>[&feedbacked=false][&ignore=a,b]`
pub async fn list<S>(
  State(recommender): State<Recommender<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<RankedRecommendation>>, ApiError>
where
  S: RecommendationStore + Clone + Send + Sync + 'static,
{
  let ignore: Vec<String> = params
    .ignore
    .map(|s| {
      s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
    })
    .unwrap_or_default();

  let ranked = recommender
    .get_recommendations(
      &params.user_id,
      &params.item,
      params.amount,
      params.feedbacked,
      &ignore,
    )
    .await?;
  Ok(Json(ranked))
}

// ─── Delete one ──────────────────────────────────────────────────────────────

/// `DELETE /recommendations/{id}`
pub async fn delete_one<S>(
  State(recommender): State<Recommender<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: RecommendationStore + Clone + Send + Sync + 'static,
{
  recommender.delete_recommendation(id).await?;
  Ok(Json(json!({ "deleted": id })))
}

// ─── Clear ───────────────────────────────────────────────────────────────────

/// Body for `POST /recommendations/clear`. The all-users wipe must be asked
/// for explicitly; an empty body clears nothing.
#[derive(Debug, Deserialize)]
pub struct ClearBody {
  #[serde(default)]
  pub user_id: Option<String>,
  #[serde(default)]
  pub all: bool,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
  pub removed: usize,
}

/// `POST /recommendations/clear` — `{"user_id": "..."}` or `{"all": true}`.
pub async fn clear<S>(
  State(recommender): State<Recommender<S>>,
  Json(body): Json<ClearBody>,
) -> Result<Json<ClearResponse>, ApiError>
where
  S: RecommendationStore + Clone + Send + Sync + 'static,
{
  let scope = match (body.user_id, body.all) {
    (Some(user_id), false) => ClearScope::User(user_id),
    (None, true) => ClearScope::All,
    (Some(_), true) => {
      return Err(ApiError::BadRequest(
        "pass either user_id or all, not both".into(),
      ));
    }
    (None, false) => {
      return Err(ApiError::BadRequest(
        "pass user_id, or all: true to clear every user".into(),
      ));
    }
  };

  let removed = recommender.clear_recommendations(scope).await?;
  Ok(Json(ClearResponse { removed }))
}
