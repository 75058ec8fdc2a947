//! [`Recommender`] — the engine's public operations.

use std::{
  cmp::Ordering,
  collections::{HashMap, HashSet},
  sync::Arc,
};

use chrono::Utc;
use uuid::Uuid;

use encore_core::{
  CompletionProvider,
  candidate::{SimilarCandidate, SourceMetadata},
  recommendation::{
    ClearScope, Feedback, FeedbackEntry, RankedRecommendation, Recommendation,
  },
  store::{RecommendationQuery, RecommendationStore},
};

use crate::{
  Error, Result,
  fallback::{fallback_reasoning, merge_and_rank, normalized_score},
  prompt::{
    PromptInputs, build_prompt, clamp_confidence, normalize_name,
    parse_completion, synthesize_item_id,
  },
};

// ─── Request type ────────────────────────────────────────────────────────────

/// Inputs to [`Recommender::generate`]. The similarity lists and metadata
/// come from upstream providers and are never stored.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
  pub user_id:     String,
  pub source_item: String,
  pub amount:      usize,
  pub metadata:    SourceMetadata,
  pub similar_artists:        Vec<SimilarCandidate>,
  pub similar_recordings:     Vec<SimilarCandidate>,
  pub similar_release_groups: Vec<SimilarCandidate>,
}

// ─── Recommender ─────────────────────────────────────────────────────────────

/// The recommendation engine.
///
/// Stateless between calls; the only quasi-state is the optional completion
/// provider handle, fixed at construction. Cloning is cheap.
#[derive(Clone)]
pub struct Recommender<S> {
  store:      Arc<S>,
  completion: Option<Arc<dyn CompletionProvider>>,
}

impl<S: RecommendationStore> Recommender<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store, completion: None }
  }

  /// Attach a completion provider; without one, `generate` uses the
  /// deterministic fallback path.
  pub fn with_completion(
    mut self,
    provider: Arc<dyn CompletionProvider>,
  ) -> Self {
    self.completion = Some(provider);
    self
  }

  pub fn has_completion(&self) -> bool { self.completion.is_some() }

  // ── Generation ────────────────────────────────────────────────────────────

  /// Generate up to `amount` new recommendations for a source item.
  ///
  /// Returns the accepted subset, which may legitimately be smaller than
  /// `amount` (or empty) after filtering — that is success. On any error
  /// nothing is stored.
  pub async fn generate(
    &self,
    request: GenerateRequest,
  ) -> Result<Vec<Recommendation>> {
    require_non_empty(&request.user_id, "user_id")?;
    require_non_empty(&request.source_item, "source_item")?;
    if request.amount == 0 {
      return Err(Error::Validation("amount must be positive".into()));
    }

    // The metadata's own id is authoritative when present.
    let source_id = request
      .metadata
      .id
      .clone()
      .unwrap_or_else(|| request.source_item.clone());
    let source_name = request
      .metadata
      .display_name()
      .unwrap_or(&request.source_item)
      .to_owned();

    // Feedback history restricted to this source item: a dislike recorded
    // while exploring another item must not suppress suggestions here.
    let history = self
      .find(
        &RecommendationQuery::for_user(&request.user_id)
          .with_source(&source_id)
          .feedback_set(true),
      )
      .await?;
    let feedback_names: HashSet<String> = history
      .iter()
      .map(|r| normalize_name(&r.recommended_item_name))
      .collect();

    // Everything ever recommended from this source, regardless of feedback.
    // Distinct from the feedback guard: an unjudged suggestion still must
    // not be repeated verbatim by the LLM path.
    let prior = self
      .find(
        &RecommendationQuery::for_user(&request.user_id)
          .with_source(&source_id),
      )
      .await?;
    let prior_names: HashSet<String> = prior
      .iter()
      .map(|r| normalize_name(&r.recommended_item_name))
      .collect();

    let accepted = match &self.completion {
      Some(provider) => {
        let liked: Vec<String> = history
          .iter()
          .filter(|r| r.feedback == Some(Feedback::Positive))
          .map(|r| r.recommended_item_name.clone())
          .collect();
        let disliked: Vec<String> = history
          .iter()
          .filter(|r| r.feedback == Some(Feedback::Negative))
          .map(|r| r.recommended_item_name.clone())
          .collect();
        let prior_for_prompt: Vec<String> = prior
          .iter()
          .map(|r| r.recommended_item_name.clone())
          .collect();

        let prompt = build_prompt(&PromptInputs {
          source_name: &source_name,
          metadata: &request.metadata,
          amount: request.amount,
          similar_artists: &request.similar_artists,
          similar_recordings: &request.similar_recordings,
          similar_release_groups: &request.similar_release_groups,
          liked: &liked,
          disliked: &disliked,
          previously_recommended: &prior_for_prompt,
        });

        tracing::debug!(
          user_id = %request.user_id,
          source = %source_id,
          prompt_chars = prompt.len(),
          "requesting completion"
        );

        let response = provider.complete(&prompt).await?;
        let suggestions = parse_completion(&response)
          .map_err(|e| Error::MalformedCompletion(e.to_string()))?;

        self.accept_suggestions(
          &request,
          &source_id,
          &source_name,
          suggestions,
          &feedback_names,
          &prior_names,
        )
      }
      None => {
        tracing::debug!(
          user_id = %request.user_id,
          source = %source_id,
          "no completion provider configured; using fallback ranking"
        );
        self.fallback_records(&request, &source_id, &source_name, &feedback_names)
      }
    };

    self
      .store
      .insert_many(accepted.clone())
      .await
      .map_err(store_error)?;

    tracing::info!(
      user_id = %request.user_id,
      source = %source_id,
      requested = request.amount,
      stored = accepted.len(),
      llm = self.completion.is_some(),
      "generated recommendations"
    );

    Ok(accepted)
  }

  /// Walk the model's suggestions in order, filtering and materialising
  /// records until `amount` are accepted.
  fn accept_suggestions(
    &self,
    request: &GenerateRequest,
    source_id: &str,
    source_name: &str,
    suggestions: Vec<crate::prompt::Suggestion>,
    feedback_names: &HashSet<String>,
    prior_names: &HashSet<String>,
  ) -> Vec<Recommendation> {
    let now = Utc::now();
    let mut excluded: HashSet<String> =
      feedback_names.union(prior_names).cloned().collect();
    let mut records = Vec::new();

    for suggestion in suggestions {
      if records.len() == request.amount {
        break;
      }
      let name = suggestion.name.trim();
      // Case-sensitive match against the source's own display name.
      if name.is_empty() || name == source_name {
        continue;
      }
      if !excluded.insert(normalize_name(name)) {
        continue;
      }
      records.push(Recommendation {
        id: Uuid::new_v4(),
        user_id: request.user_id.clone(),
        source_item: source_id.to_owned(),
        recommended_item_id: synthesize_item_id(name, now),
        recommended_item_name: name.to_owned(),
        reasoning: suggestion.reasoning,
        confidence: clamp_confidence(suggestion.confidence),
        feedback: None,
        created_at: now,
      });
    }

    records
  }

  /// Deterministic generation path: greedy selection over the merged,
  /// score-ranked candidate list. Only feedback-flagged names, the source's
  /// own name and in-batch duplicates are skipped — prior recommendations
  /// are not, so repeat calls with identical inputs yield identical names.
  fn fallback_records(
    &self,
    request: &GenerateRequest,
    source_id: &str,
    source_name: &str,
    feedback_names: &HashSet<String>,
  ) -> Vec<Recommendation> {
    let merged = merge_and_rank(
      &request.similar_artists,
      &request.similar_recordings,
      &request.similar_release_groups,
    );

    let now = Utc::now();
    let mut taken: HashSet<String> = HashSet::new();
    let mut records = Vec::new();

    for candidate in merged {
      if records.len() == request.amount {
        break;
      }
      if candidate.name == source_name {
        continue;
      }
      let key = normalize_name(&candidate.name);
      if feedback_names.contains(&key) || !taken.insert(key) {
        continue;
      }
      records.push(Recommendation {
        id: Uuid::new_v4(),
        user_id: request.user_id.clone(),
        source_item: source_id.to_owned(),
        recommended_item_id: synthesize_item_id(&candidate.name, now),
        recommended_item_name: candidate.name.clone(),
        reasoning: fallback_reasoning(&candidate, source_name),
        confidence: normalized_score(candidate.score),
        feedback: None,
        created_at: now,
      });
    }

    records
  }

  // ── Retrieval ─────────────────────────────────────────────────────────────

  /// Retrieve up to `amount` ranked recommendations connected to `item`.
  ///
  /// `item` may be the source or the target of a stored edge; the other
  /// side is returned. With `feedbacked` (the default mode) positive and
  /// unset candidates are included and negative ones strictly excluded;
  /// without it only unset candidates are returned.
  pub async fn get_recommendations(
    &self,
    user_id: &str,
    item: &str,
    amount: usize,
    feedbacked: bool,
    ignore: &[String],
  ) -> Result<Vec<RankedRecommendation>> {
    require_non_empty(user_id, "user_id")?;
    require_non_empty(item, "item")?;
    if amount == 0 {
      return Err(Error::Validation("amount must be positive".into()));
    }

    let records = self
      .find(&RecommendationQuery::for_user(user_id).with_either(item))
      .await?;

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut matches: Vec<(Recommendation, String, String)> = Vec::new();

    for record in records {
      // The candidate is whichever side of the edge was not queried.
      let (candidate_id, candidate_name) = if record.source_item == item {
        (
          record.recommended_item_id.clone(),
          record.recommended_item_name.clone(),
        )
      } else {
        (record.source_item.clone(), record.source_item.clone())
      };

      if candidate_id == item {
        continue;
      }
      if ignore.iter().any(|ignored| ignored == &candidate_id) {
        continue;
      }
      match record.feedback {
        Some(Feedback::Negative) if feedbacked => continue,
        Some(_) if !feedbacked => continue,
        _ => {}
      }
      // Duplicate edges to one candidate can exist after concurrent
      // generate calls; the best-ranked copy represents the candidate.
      if let Some(&at) = seen.get(&candidate_id) {
        if rank_order(&record, &matches[at].0) == Ordering::Less {
          matches[at] = (record, candidate_id, candidate_name);
        }
        continue;
      }
      seen.insert(candidate_id.clone(), matches.len());
      matches.push((record, candidate_id, candidate_name));
    }

    matches.sort_by(|(a, _, _), (b, _, _)| rank_order(a, b));
    matches.truncate(amount);

    Ok(
      matches
        .into_iter()
        .map(|(record, item, name)| RankedRecommendation {
          item,
          name,
          reasoning: record.reasoning,
          confidence: record.confidence,
        })
        .collect(),
    )
  }

  // ── Feedback ──────────────────────────────────────────────────────────────

  /// Record positive or negative feedback on a previously recommended item.
  ///
  /// Updates every matching record (normally one) and refreshes its
  /// `created_at`. Errors with [`Error::NotFound`] when the item was never
  /// recommended to this user.
  pub async fn provide_feedback(
    &self,
    user_id: &str,
    recommended_item: &str,
    positive: bool,
  ) -> Result<()> {
    require_non_empty(user_id, "user_id")?;
    require_non_empty(recommended_item, "recommended_item")?;

    let existing = self
      .store
      .count(
        &RecommendationQuery::for_user(user_id)
          .with_recommended(recommended_item),
      )
      .await
      .map_err(store_error)?;
    if existing == 0 {
      return Err(Error::NotFound(format!(
        "no recommendation {recommended_item} for user {user_id}"
      )));
    }

    let feedback = Feedback::from_bool(positive);
    let updated = self
      .store
      .set_feedback(user_id, recommended_item, feedback, Utc::now())
      .await
      .map_err(store_error)?;

    tracing::info!(
      user_id = %user_id,
      item = %recommended_item,
      positive,
      updated,
      "recorded feedback"
    );
    Ok(())
  }

  /// Return this user's feedbacked recommendations, optionally restricted
  /// to one source item. Records with unset feedback are excluded.
  pub async fn get_feedback_history(
    &self,
    user_id: &str,
    source_item: Option<&str>,
  ) -> Result<Vec<FeedbackEntry>> {
    require_non_empty(user_id, "user_id")?;

    let mut query = RecommendationQuery::for_user(user_id).feedback_set(true);
    if let Some(source) = source_item {
      query = query.with_source(source);
    }
    let records = self.find(&query).await?;

    Ok(
      records
        .into_iter()
        .filter_map(|record| {
          let feedback = record.feedback?;
          Some(FeedbackEntry {
            recommendation_id: record.id,
            item: record.recommended_item_name,
            feedback,
            reasoning: record.reasoning,
            source_item: record.source_item,
          })
        })
        .collect(),
    )
  }

  // ── Deletion ──────────────────────────────────────────────────────────────

  /// Remove exactly one recommendation by primary id.
  pub async fn delete_recommendation(&self, id: Uuid) -> Result<()> {
    let removed = self.store.delete_by_id(id).await.map_err(store_error)?;
    if !removed {
      return Err(Error::NotFound(format!("recommendation {id} not found")));
    }
    Ok(())
  }

  /// Remove one user's recommendations, or everything when explicitly asked
  /// for [`ClearScope::All`]. Returns the number of records removed.
  pub async fn clear_recommendations(&self, scope: ClearScope) -> Result<usize> {
    let removed = match &scope {
      ClearScope::User(user_id) => {
        require_non_empty(user_id, "user_id")?;
        self
          .store
          .clear(Some(user_id.as_str()))
          .await
          .map_err(store_error)?
      }
      ClearScope::All => self.store.clear(None).await.map_err(store_error)?,
    };

    tracing::info!(?scope, removed, "cleared recommendations");
    Ok(removed)
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  async fn find(
    &self,
    query: &RecommendationQuery,
  ) -> Result<Vec<Recommendation>> {
    self.store.find(query).await.map_err(store_error)
  }
}

/// Ranking: positive feedback before unset before negative, then higher
/// confidence, then more recently touched.
fn rank_order(a: &Recommendation, b: &Recommendation) -> Ordering {
  feedback_class(a.feedback)
    .cmp(&feedback_class(b.feedback))
    .then(b.confidence.total_cmp(&a.confidence))
    .then(b.created_at.cmp(&a.created_at))
}

fn feedback_class(feedback: Option<Feedback>) -> u8 {
  match feedback {
    Some(Feedback::Positive) => 0,
    None => 1,
    Some(Feedback::Negative) => 2,
  }
}

fn require_non_empty(value: &str, field: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::Validation(format!("{field} must be non-empty")));
  }
  Ok(())
}

fn store_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
  Error::Store(Box::new(e))
}
