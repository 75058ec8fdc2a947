//! The deterministic fallback generation strategy.
//!
//! Used only when no completion provider is configured. Candidates from the
//! three similarity lists are merged, tagged with their origin, and ranked
//! by the provider's genre-overlap score; the engine then takes them
//! greedily. Repeat calls with identical inputs produce identical name sets.

use encore_core::candidate::{CandidateOrigin, SimilarCandidate};

/// A named, origin-tagged candidate ready for greedy selection.
#[derive(Debug, Clone)]
pub struct FallbackCandidate {
  pub name:   String,
  /// Raw provider score on the 0–100 scale.
  pub score:  f64,
  pub origin: CandidateOrigin,
}

/// Merge the three similarity lists into one score-ranked candidate list.
///
/// Nameless entries are dropped. The sort is stable and the merge order is
/// fixed (artists, recordings, release groups), so equal scores keep a
/// deterministic order across calls.
pub fn merge_and_rank(
  artists: &[SimilarCandidate],
  recordings: &[SimilarCandidate],
  release_groups: &[SimilarCandidate],
) -> Vec<FallbackCandidate> {
  let mut merged: Vec<FallbackCandidate> = Vec::new();

  let tagged = [
    (CandidateOrigin::Artist, artists),
    (CandidateOrigin::Recording, recordings),
    (CandidateOrigin::ReleaseGroup, release_groups),
  ];
  for (origin, list) in tagged {
    for c in list {
      let Some(name) = c.display_name() else { continue };
      merged.push(FallbackCandidate {
        name: name.to_owned(),
        score: c.score,
        origin,
      });
    }
  }

  merged.sort_by(|a, b| b.score.total_cmp(&a.score));
  merged
}

/// Fixed reasoning template for fallback records. Always names the origin
/// type and the fact that no LLM was involved.
pub fn fallback_reasoning(candidate: &FallbackCandidate, source_name: &str) -> String {
  format!(
    "Similar {} to {} with a genre-overlap score of {:.0}. \
     LLM not available; ranked by similarity score.",
    candidate.origin.label(),
    source_name,
    candidate.score,
  )
}

/// Provider scores arrive on a 0–100 scale; normalise into `[0, 1]`.
pub fn normalized_score(score: f64) -> f64 {
  if score.is_finite() { (score / 100.0).clamp(0.0, 1.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn candidate(name: &str, score: f64) -> SimilarCandidate {
    SimilarCandidate { name: Some(name.into()), score, ..Default::default() }
  }

  fn titled(title: &str, score: f64) -> SimilarCandidate {
    SimilarCandidate { title: Some(title.into()), score, ..Default::default() }
  }

  #[test]
  fn merges_all_three_lists_sorted_by_score() {
    let merged = merge_and_rank(
      &[candidate("Muse", 95.0), candidate("Pink Floyd", 70.0)],
      &[titled("Paranoid Android", 88.0)],
      &[titled("The Bends", 92.0)],
    );

    let names: Vec<&str> = merged.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
      names,
      ["Muse", "The Bends", "Paranoid Android", "Pink Floyd"]
    );
    assert_eq!(merged[0].origin, CandidateOrigin::Artist);
    assert_eq!(merged[1].origin, CandidateOrigin::ReleaseGroup);
  }

  #[test]
  fn equal_scores_keep_merge_order() {
    let merged = merge_and_rank(
      &[candidate("A", 80.0)],
      &[titled("R", 80.0)],
      &[titled("G", 80.0)],
    );
    let names: Vec<&str> = merged.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["A", "R", "G"]);
  }

  #[test]
  fn nameless_candidates_are_dropped() {
    let merged = merge_and_rank(
      &[SimilarCandidate { score: 99.0, ..Default::default() }],
      &[],
      &[],
    );
    assert!(merged.is_empty());
  }

  #[test]
  fn reasoning_names_origin_and_llm_absence() {
    let c = FallbackCandidate {
      name: "Muse".into(),
      score: 95.0,
      origin: CandidateOrigin::Artist,
    };
    let reason = fallback_reasoning(&c, "Radiohead");
    assert!(reason.contains("artist"));
    assert!(reason.contains("Radiohead"));
    assert!(reason.contains("LLM not available"));
  }

  #[test]
  fn scores_normalise_from_percentage_scale() {
    assert_eq!(normalized_score(95.0), 0.95);
    assert_eq!(normalized_score(0.0), 0.0);
    // Out-of-range provider scores still land inside the invariant.
    assert_eq!(normalized_score(140.0), 1.0);
    assert_eq!(normalized_score(-5.0), 0.0);
  }
}
