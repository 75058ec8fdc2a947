//! Boundary types for the upstream similarity and metadata providers.
//!
//! Upstream data arrives as loosely-typed JSON (MusicBrainz/ListenBrainz
//! shapes vary by entity kind). These types give it named, typed, optional
//! fields at the engine's edge; nothing untyped propagates into ranking or
//! prompt construction.

use serde::{Deserialize, Serialize};

// ─── Source metadata ─────────────────────────────────────────────────────────

/// A genre or folksonomy tag with an optional vote count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagCount {
  pub name:  String,
  #[serde(default)]
  pub count: Option<u32>,
}

/// Metadata for the item a generation call starts from.
///
/// Artists carry `name`, recordings and release-groups carry `title`;
/// [`display_name`](Self::display_name) resolves whichever is present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMetadata {
  /// The provider's own identifier; authoritative for `source_item` when
  /// present.
  #[serde(default)]
  pub id: Option<String>,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub title: Option<String>,
  /// Entity kind as reported upstream, e.g. `"Group"` or `"Person"`.
  #[serde(default, rename = "type")]
  pub kind: Option<String>,
  #[serde(default)]
  pub disambiguation: Option<String>,
  #[serde(default)]
  pub genres: Vec<TagCount>,
  #[serde(default)]
  pub tags: Vec<TagCount>,
}

impl SourceMetadata {
  /// `name` for artists, `title` for recordings/release-groups.
  pub fn display_name(&self) -> Option<&str> {
    self.name.as_deref().or(self.title.as_deref())
  }
}

// ─── Similarity candidates ───────────────────────────────────────────────────

/// Which similarity list a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrigin {
  Artist,
  Recording,
  ReleaseGroup,
}

impl CandidateOrigin {
  /// Human-readable form used in fallback reasoning text.
  pub fn label(self) -> &'static str {
    match self {
      Self::Artist => "artist",
      Self::Recording => "recording",
      Self::ReleaseGroup => "release group",
    }
  }
}

/// One similarity-scored item from an upstream provider, eligible to become
/// a recommendation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimilarCandidate {
  /// Provider catalog id (MBID), when the provider has one.
  #[serde(default, alias = "mbid")]
  pub id: Option<String>,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub title: Option<String>,
  /// Genre-overlap score on the provider's 0–100 scale.
  #[serde(default)]
  pub score: f64,
  #[serde(default)]
  pub shared_genres: Vec<String>,
}

impl SimilarCandidate {
  pub fn display_name(&self) -> Option<&str> {
    self.name.as_deref().or(self.title.as_deref())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn metadata_display_name_prefers_name() {
    let meta = SourceMetadata {
      name: Some("Radiohead".into()),
      title: Some("OK Computer".into()),
      ..Default::default()
    };
    assert_eq!(meta.display_name(), Some("Radiohead"));
  }

  #[test]
  fn candidate_deserialises_from_sparse_upstream_json() {
    let c: SimilarCandidate = serde_json::from_str(
      r#"{"mbid":"9c9f1380-2516-4fc9-a3e6-f9f61941d090","name":"Muse","score":95}"#,
    )
    .unwrap();
    assert_eq!(c.id.as_deref(), Some("9c9f1380-2516-4fc9-a3e6-f9f61941d090"));
    assert_eq!(c.display_name(), Some("Muse"));
    assert_eq!(c.score, 95.0);
    assert!(c.shared_genres.is_empty());
  }

  #[test]
  fn metadata_tolerates_missing_fields() {
    let meta: SourceMetadata =
      serde_json::from_str(r#"{"title":"Kid A","type":"Album"}"#).unwrap();
    assert_eq!(meta.display_name(), Some("Kid A"));
    assert_eq!(meta.kind.as_deref(), Some("Album"));
    assert!(meta.id.is_none());
  }
}
