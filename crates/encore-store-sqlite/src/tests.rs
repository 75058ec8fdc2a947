//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use encore_core::{
  recommendation::{Feedback, Recommendation},
  store::{RecommendationQuery, RecommendationStore},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn rec(user: &str, source: &str, name: &str) -> Recommendation {
  Recommendation {
    id: Uuid::new_v4(),
    user_id: user.into(),
    source_item: source.into(),
    recommended_item_id: format!(
      "{}-{}",
      name.to_lowercase(),
      Utc::now().timestamp_millis()
    ),
    recommended_item_name: name.into(),
    reasoning: format!("similar to {source}"),
    confidence: 0.8,
    feedback: None,
    created_at: Utc::now(),
  }
}

// ─── Insert + find ───────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_find_roundtrip() {
  let s = store().await;
  let r = rec("alice", "radiohead", "Muse");
  s.insert_many(vec![r.clone()]).await.unwrap();

  let found = s
    .find(&RecommendationQuery::for_user("alice"))
    .await
    .unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].id, r.id);
  assert_eq!(found[0].recommended_item_name, "Muse");
  assert_eq!(found[0].confidence, 0.8);
  assert_eq!(found[0].feedback, None);
}

#[tokio::test]
async fn insert_many_is_batched() {
  let s = store().await;
  s.insert_many(vec![
    rec("alice", "radiohead", "Muse"),
    rec("alice", "radiohead", "Pink Floyd"),
    rec("alice", "portishead", "Massive Attack"),
  ])
  .await
  .unwrap();

  let n = s
    .count(&RecommendationQuery::for_user("alice"))
    .await
    .unwrap();
  assert_eq!(n, 3);
}

#[tokio::test]
async fn insert_empty_batch_is_noop() {
  let s = store().await;
  s.insert_many(vec![]).await.unwrap();
  assert_eq!(s.count(&RecommendationQuery::default()).await.unwrap(), 0);
}

// ─── Query filters ───────────────────────────────────────────────────────────

#[tokio::test]
async fn find_filters_by_source_item() {
  let s = store().await;
  s.insert_many(vec![
    rec("alice", "radiohead", "Muse"),
    rec("alice", "portishead", "Massive Attack"),
  ])
  .await
  .unwrap();

  let found = s
    .find(&RecommendationQuery::for_user("alice").with_source("radiohead"))
    .await
    .unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].recommended_item_name, "Muse");
}

#[tokio::test]
async fn find_by_either_side_matches_source_and_target() {
  let s = store().await;
  let mut edge = rec("alice", "radiohead", "Muse");
  edge.recommended_item_id = "muse-1".into();
  s.insert_many(vec![edge, rec("alice", "portishead", "Tricky")])
    .await
    .unwrap();

  // Query by the source side.
  let by_source = s
    .find(&RecommendationQuery::for_user("alice").with_either("radiohead"))
    .await
    .unwrap();
  assert_eq!(by_source.len(), 1);

  // Query by the recommended side.
  let by_target = s
    .find(&RecommendationQuery::for_user("alice").with_either("muse-1"))
    .await
    .unwrap();
  assert_eq!(by_target.len(), 1);
  assert_eq!(by_target[0].recommended_item_name, "Muse");
}

#[tokio::test]
async fn find_filters_by_feedback_presence() {
  let s = store().await;
  let mut liked = rec("alice", "radiohead", "Muse");
  liked.feedback = Some(Feedback::Positive);
  s.insert_many(vec![liked, rec("alice", "radiohead", "Pink Floyd")])
    .await
    .unwrap();

  let with = s
    .find(&RecommendationQuery::for_user("alice").feedback_set(true))
    .await
    .unwrap();
  assert_eq!(with.len(), 1);
  assert_eq!(with[0].feedback, Some(Feedback::Positive));

  let without = s
    .find(&RecommendationQuery::for_user("alice").feedback_set(false))
    .await
    .unwrap();
  assert_eq!(without.len(), 1);
  assert_eq!(without[0].recommended_item_name, "Pink Floyd");
}

#[tokio::test]
async fn find_does_not_cross_users() {
  let s = store().await;
  s.insert_many(vec![
    rec("alice", "radiohead", "Muse"),
    rec("bob", "radiohead", "Muse"),
  ])
  .await
  .unwrap();

  let found = s
    .find(&RecommendationQuery::for_user("bob"))
    .await
    .unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].user_id, "bob");
}

// ─── Feedback updates ────────────────────────────────────────────────────────

#[tokio::test]
async fn set_feedback_updates_all_matches_and_touches_timestamp() {
  let s = store().await;
  let old = Utc::now() - Duration::hours(1);

  let mut a = rec("alice", "radiohead", "Muse");
  a.recommended_item_id = "muse-1".into();
  a.created_at = old;
  // A tolerated near-duplicate from a concurrent generate call.
  let mut b = rec("alice", "portishead", "Muse");
  b.recommended_item_id = "muse-1".into();
  b.created_at = old;
  s.insert_many(vec![a, b]).await.unwrap();

  let touched = Utc::now();
  let n = s
    .set_feedback("alice", "muse-1", Feedback::Negative, touched)
    .await
    .unwrap();
  assert_eq!(n, 2);

  let found = s
    .find(&RecommendationQuery::for_user("alice"))
    .await
    .unwrap();
  for r in found {
    assert_eq!(r.feedback, Some(Feedback::Negative));
    assert!(r.created_at > old);
  }
}

#[tokio::test]
async fn set_feedback_returns_zero_when_nothing_matches() {
  let s = store().await;
  s.insert_many(vec![rec("alice", "radiohead", "Muse")])
    .await
    .unwrap();

  let n = s
    .set_feedback("alice", "no-such-item", Feedback::Positive, Utc::now())
    .await
    .unwrap();
  assert_eq!(n, 0);
}

#[tokio::test]
async fn set_feedback_overwrites_cleanly() {
  let s = store().await;
  let mut r = rec("alice", "radiohead", "Muse");
  r.recommended_item_id = "muse-1".into();
  s.insert_many(vec![r]).await.unwrap();

  s.set_feedback("alice", "muse-1", Feedback::Positive, Utc::now())
    .await
    .unwrap();
  s.set_feedback("alice", "muse-1", Feedback::Negative, Utc::now())
    .await
    .unwrap();

  let found = s
    .find(&RecommendationQuery::for_user("alice"))
    .await
    .unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].feedback, Some(Feedback::Negative));
}

// ─── Deletion ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_by_id_removes_exactly_one() {
  let s = store().await;
  let keep = rec("alice", "radiohead", "Muse");
  let gone = rec("alice", "radiohead", "Pink Floyd");
  let gone_id = gone.id;
  s.insert_many(vec![keep.clone(), gone]).await.unwrap();

  assert!(s.delete_by_id(gone_id).await.unwrap());

  let found = s
    .find(&RecommendationQuery::for_user("alice"))
    .await
    .unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].id, keep.id);
}

#[tokio::test]
async fn delete_by_id_missing_returns_false() {
  let s = store().await;
  assert!(!s.delete_by_id(Uuid::new_v4()).await.unwrap());
}

#[tokio::test]
async fn clear_scoped_to_one_user() {
  let s = store().await;
  s.insert_many(vec![
    rec("alice", "radiohead", "Muse"),
    rec("alice", "portishead", "Tricky"),
    rec("bob", "radiohead", "Muse"),
  ])
  .await
  .unwrap();

  let removed = s.clear(Some("alice")).await.unwrap();
  assert_eq!(removed, 2);

  assert_eq!(
    s.count(&RecommendationQuery::for_user("alice")).await.unwrap(),
    0
  );
  assert_eq!(
    s.count(&RecommendationQuery::for_user("bob")).await.unwrap(),
    1
  );
}

#[tokio::test]
async fn clear_unscoped_removes_everything() {
  let s = store().await;
  s.insert_many(vec![
    rec("alice", "radiohead", "Muse"),
    rec("bob", "portishead", "Tricky"),
  ])
  .await
  .unwrap();

  let removed = s.clear(None).await.unwrap();
  assert_eq!(removed, 2);
  assert_eq!(s.count(&RecommendationQuery::default()).await.unwrap(), 0);
}
