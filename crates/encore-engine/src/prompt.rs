//! Prompt construction and completion-output parsing.
//!
//! The prompt is bounded: at most [`MAX_CANDIDATES_PER_LIST`] entries from
//! each similarity list and at most [`MAX_EXCLUDED_NAMES`] previously
//! recommended names are embedded, regardless of how much the upstream
//! providers returned.
//!
//! Parsing is tolerant-but-strict: exactly one optional markdown code fence
//! is stripped, then the remainder must be a JSON array of suggestion
//! objects. Anything else is a hard failure — no speculative repair.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use encore_core::candidate::{SimilarCandidate, SourceMetadata, TagCount};
use serde::Deserialize;

/// Upper bound on entries taken from each similarity list.
pub const MAX_CANDIDATES_PER_LIST: usize = 10;

/// Upper bound on previously recommended names embedded as exclusions.
pub const MAX_EXCLUDED_NAMES: usize = 50;

// ─── Suggestion ──────────────────────────────────────────────────────────────

/// One candidate emitted by the model.
#[derive(Debug, Clone, Deserialize)]
pub struct Suggestion {
  pub name: String,
  #[serde(default)]
  pub reasoning: String,
  #[serde(default = "default_confidence")]
  pub confidence: f64,
}

fn default_confidence() -> f64 { 0.5 }

// ─── Prompt construction ─────────────────────────────────────────────────────

/// Everything the prompt needs, borrowed from the generation request and the
/// user's per-source history.
pub struct PromptInputs<'a> {
  pub source_name: &'a str,
  pub metadata: &'a SourceMetadata,
  pub amount: usize,
  pub similar_artists: &'a [SimilarCandidate],
  pub similar_recordings: &'a [SimilarCandidate],
  pub similar_release_groups: &'a [SimilarCandidate],
  /// Names of previous recommendations from this source the user liked.
  pub liked: &'a [String],
  /// Names of previous recommendations from this source the user disliked.
  pub disliked: &'a [String],
  /// All names previously recommended from this source, regardless of
  /// feedback; capped at [`MAX_EXCLUDED_NAMES`].
  pub previously_recommended: &'a [String],
}

/// Build the completion prompt.
pub fn build_prompt(inputs: &PromptInputs) -> String {
  let mut p = String::new();

  let _ = writeln!(
    p,
    "You are a music recommendation assistant. Suggest exactly {} new music \
     items for a listener who likes \"{}\".",
    inputs.amount, inputs.source_name
  );

  if let Some(kind) = &inputs.metadata.kind {
    let _ = writeln!(p, "Source item type: {kind}.");
  }
  if let Some(dis) = &inputs.metadata.disambiguation {
    if !dis.is_empty() {
      let _ = writeln!(p, "Disambiguation: {dis}.");
    }
  }
  write_tag_line(&mut p, "Genres", &inputs.metadata.genres);
  write_tag_line(&mut p, "Tags", &inputs.metadata.tags);

  write_candidate_section(&mut p, "Similar artists", inputs.similar_artists);
  write_candidate_section(
    &mut p,
    "Similar recordings",
    inputs.similar_recordings,
  );
  write_candidate_section(
    &mut p,
    "Similar release groups",
    inputs.similar_release_groups,
  );

  if !inputs.liked.is_empty() {
    let _ = writeln!(
      p,
      "The listener liked these earlier suggestions: {}.",
      inputs.liked.join(", ")
    );
  }
  if !inputs.disliked.is_empty() {
    let _ = writeln!(
      p,
      "The listener disliked these earlier suggestions — never suggest \
       anything similar to them again: {}.",
      inputs.disliked.join(", ")
    );
  }

  let excluded: Vec<&str> = inputs
    .previously_recommended
    .iter()
    .take(MAX_EXCLUDED_NAMES)
    .map(String::as_str)
    .collect();
  if !excluded.is_empty() {
    let _ = writeln!(
      p,
      "These items were already suggested; do not repeat any of them: {}.",
      excluded.join(", ")
    );
  }

  let _ = writeln!(
    p,
    "\nRespond with ONLY a JSON array of exactly {} objects, each shaped \
     {{\"name\": string, \"reasoning\": string, \"confidence\": number \
     between 0 and 1}}. Prefer items from the similarity lists above. Format \
     recording and album names as \"Artist - Title\"; artists as the artist \
     name alone. Never suggest \"{}\" itself. State reasoning plainly and \
     avoid hedging language.",
    inputs.amount, inputs.source_name
  );

  p
}

fn write_tag_line(p: &mut String, label: &str, tags: &[TagCount]) {
  if tags.is_empty() {
    return;
  }
  let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
  let _ = writeln!(p, "{label}: {}.", names.join(", "));
}

fn write_candidate_section(
  p: &mut String,
  label: &str,
  candidates: &[SimilarCandidate],
) {
  if candidates.is_empty() {
    return;
  }
  let _ = writeln!(p, "\n{label} (name, similarity score, shared genres):");
  for c in candidates.iter().take(MAX_CANDIDATES_PER_LIST) {
    let Some(name) = c.display_name() else { continue };
    let genres = if c.shared_genres.is_empty() {
      String::from("none listed")
    } else {
      c.shared_genres.join(", ")
    };
    let _ = writeln!(p, "- {name} (score {:.0}, genres: {genres})", c.score);
  }
}

// ─── Completion parsing ──────────────────────────────────────────────────────

/// Parse the model's raw text into suggestions.
///
/// Strips a single optional markdown code fence (with or without a language
/// tag). Any remaining shape that is not a JSON array of suggestion objects
/// is an error.
pub fn parse_completion(text: &str) -> Result<Vec<Suggestion>, serde_json::Error> {
  serde_json::from_str(strip_code_fence(text))
}

fn strip_code_fence(text: &str) -> &str {
  let trimmed = text.trim();
  let Some(rest) = trimmed.strip_prefix("```") else {
    return trimmed;
  };
  // Drop the opening fence line, which may carry a language tag.
  let body = match rest.find('\n') {
    Some(i) => &rest[i + 1..],
    None => rest,
  };
  match body.trim_end().strip_suffix("```") {
    Some(inner) => inner.trim(),
    None => body.trim(),
  }
}

// ─── Identity helpers ────────────────────────────────────────────────────────

/// Case-insensitive key used for all name-based de-duplication.
pub fn normalize_name(name: &str) -> String { name.trim().to_lowercase() }

/// Derive a locally-scoped identifier for a recommended item from its display
/// name and the creation timestamp. The LLM cannot supply stable catalog ids
/// for arbitrary suggestions, so identity is synthesized; the result never
/// round-trips to any external catalog.
pub fn synthesize_item_id(name: &str, at: DateTime<Utc>) -> String {
  let slug: String = name
    .to_lowercase()
    .chars()
    .filter(|c| c.is_alphanumeric())
    .collect();
  let slug = if slug.is_empty() { "item".to_owned() } else { slug };
  format!("{slug}-{}", at.timestamp_millis())
}

/// Clamp a reported confidence into `[0, 1]`; non-finite values collapse to
/// zero.
pub fn clamp_confidence(value: f64) -> f64 {
  if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn candidate(name: &str, score: f64) -> SimilarCandidate {
    SimilarCandidate {
      name: Some(name.into()),
      score,
      shared_genres: vec!["rock".into()],
      ..Default::default()
    }
  }

  #[test]
  fn parses_bare_json_array() {
    let out = parse_completion(
      r#"[{"name":"Muse","reasoning":"similar vocals","confidence":0.9}]"#,
    )
    .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].name, "Muse");
    assert_eq!(out[0].confidence, 0.9);
  }

  #[test]
  fn parses_fenced_json_with_language_tag() {
    let text = "```json\n[{\"name\":\"Muse\"}]\n```";
    let out = parse_completion(text).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].reasoning, "");
    assert_eq!(out[0].confidence, 0.5);
  }

  #[test]
  fn parses_fenced_json_without_language_tag() {
    let text = "```\n[{\"name\":\"Pink Floyd\",\"confidence\":1.2}]\n```";
    let out = parse_completion(text).unwrap();
    assert_eq!(out[0].name, "Pink Floyd");
  }

  #[test]
  fn rejects_prose() {
    assert!(parse_completion("Here are some suggestions: Muse").is_err());
  }

  #[test]
  fn rejects_non_array_json() {
    assert!(parse_completion(r#"{"name":"Muse"}"#).is_err());
  }

  #[test]
  fn prompt_bounds_each_similarity_list() {
    let artists: Vec<SimilarCandidate> =
      (0..25).map(|i| candidate(&format!("Artist{i}"), 50.0)).collect();
    let inputs = PromptInputs {
      source_name: "Radiohead",
      metadata: &SourceMetadata::default(),
      amount: 3,
      similar_artists: &artists,
      similar_recordings: &[],
      similar_release_groups: &[],
      liked: &[],
      disliked: &[],
      previously_recommended: &[],
    };
    let prompt = build_prompt(&inputs);
    assert!(prompt.contains("Artist9"));
    assert!(!prompt.contains("Artist10"));
  }

  #[test]
  fn prompt_caps_excluded_names_at_fifty() {
    let prior: Vec<String> = (0..80).map(|i| format!("Prior{i}")).collect();
    let inputs = PromptInputs {
      source_name: "Radiohead",
      metadata: &SourceMetadata::default(),
      amount: 3,
      similar_artists: &[],
      similar_recordings: &[],
      similar_release_groups: &[],
      liked: &[],
      disliked: &[],
      previously_recommended: &prior,
    };
    let prompt = build_prompt(&inputs);
    assert!(prompt.contains("Prior49"));
    assert!(!prompt.contains("Prior50"));
  }

  #[test]
  fn prompt_carries_feedback_and_instructions() {
    let liked = vec!["Muse".to_owned()];
    let disliked = vec!["Nickelback".to_owned()];
    let inputs = PromptInputs {
      source_name: "Radiohead",
      metadata: &SourceMetadata {
        kind: Some("Group".into()),
        genres: vec![TagCount { name: "art rock".into(), count: Some(12) }],
        ..Default::default()
      },
      amount: 2,
      similar_artists: &[candidate("Muse", 95.0)],
      similar_recordings: &[],
      similar_release_groups: &[],
      liked: &liked,
      disliked: &disliked,
      previously_recommended: &[],
    };
    let prompt = build_prompt(&inputs);
    assert!(prompt.contains("exactly 2"));
    assert!(prompt.contains("art rock"));
    assert!(prompt.contains("Nickelback"));
    assert!(prompt.contains("Artist - Title"));
    assert!(prompt.contains("avoid hedging"));
  }

  #[test]
  fn synthesized_id_strips_non_alphanumerics() {
    let at = Utc::now();
    let id = synthesize_item_id("Pink Floyd - Time!", at);
    assert_eq!(id, format!("pinkfloydtime-{}", at.timestamp_millis()));
  }

  #[test]
  fn synthesized_id_never_empty() {
    let at = Utc::now();
    let id = synthesize_item_id("!!!---", at);
    assert!(id.starts_with("item-"));
  }

  #[test]
  fn confidence_clamps_into_unit_interval() {
    assert_eq!(clamp_confidence(1.7), 1.0);
    assert_eq!(clamp_confidence(-0.2), 0.0);
    assert_eq!(clamp_confidence(0.42), 0.42);
    assert_eq!(clamp_confidence(f64::NAN), 0.0);
  }
}
