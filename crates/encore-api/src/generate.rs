//! Handler for `POST /recommendations/generate`.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use encore_core::{
  candidate::{SimilarCandidate, SourceMetadata},
  recommendation::Recommendation,
  store::RecommendationStore,
};
use encore_engine::{GenerateRequest, Recommender};
use serde::Deserialize;

use crate::error::ApiError;

/// JSON body accepted by `POST /recommendations/generate`. The similarity
/// lists are forwarded verbatim from the upstream providers.
#[derive(Debug, Deserialize)]
pub struct GenerateBody {
  pub user_id:     String,
  pub source_item: String,
  pub amount:      usize,
  #[serde(default)]
  pub metadata: SourceMetadata,
  #[serde(default)]
  pub similar_artists: Vec<SimilarCandidate>,
  #[serde(default)]
  pub similar_recordings: Vec<SimilarCandidate>,
  #[serde(default)]
  pub similar_release_groups: Vec<SimilarCandidate>,
}

impl From<GenerateBody> for GenerateRequest {
  fn from(b: GenerateBody) -> Self {
    GenerateRequest {
      user_id:     b.user_id,
      source_item: b.source_item,
      amount:      b.amount,
      metadata:    b.metadata,
      similar_artists:        b.similar_artists,
      similar_recordings:     b.similar_recordings,
      similar_release_groups: b.similar_release_groups,
    }
  }
}

/// `POST /recommendations/generate` — returns 201 + the stored batch, which
/// may be smaller than `amount` (or empty) after filtering.
pub async fn handler<S>(
  State(recommender): State<Recommender<S>>,
  Json(body): Json<GenerateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecommendationStore + Clone + Send + Sync + 'static,
{
  let records: Vec<Recommendation> =
    recommender.generate(GenerateRequest::from(body)).await?;
  Ok((StatusCode::CREATED, Json(records)))
}
