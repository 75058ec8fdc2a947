//! JSON REST API for the Encore recommendation engine.
//!
//! Exposes an axum [`Router`] backed by a
//! [`Recommender`](encore_engine::Recommender) over any
//! [`RecommendationStore`](encore_core::store::RecommendationStore).
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", encore_api::api_router(recommender))
//! ```

pub mod error;
pub mod feedback;
pub mod generate;
pub mod recommendations;

use axum::{
  Router,
  routing::{delete, get, post},
};
use encore_core::store::RecommendationStore;
use encore_engine::Recommender;

pub use error::ApiError;

/// Build a fully-materialised API router for `recommender`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(recommender: Recommender<S>) -> Router<()>
where
  S: RecommendationStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route(
      "/recommendations",
      get(recommendations::list::<S>),
    )
    .route(
      "/recommendations/generate",
      post(generate::handler::<S>),
    )
    .route(
      "/recommendations/feedback",
      post(feedback::submit::<S>),
    )
    .route(
      "/recommendations/feedback-history",
      get(feedback::history::<S>),
    )
    .route(
      "/recommendations/clear",
      post(recommendations::clear::<S>),
    )
    .route(
      "/recommendations/{id}",
      delete(recommendations::delete_one::<S>),
    )
    .with_state(recommender)
}
