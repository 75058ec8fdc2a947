//! [`SqliteStore`] — the SQLite implementation of [`RecommendationStore`].

use std::path::Path;

use uuid::Uuid;

use encore_core::{
  recommendation::{Feedback, Recommendation},
  store::{RecommendationQuery, RecommendationStore},
};

use crate::{
  Error, Result,
  encode::{
    RawRecommendation, encode_dt, encode_feedback, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A recommendation store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Query → SQL ─────────────────────────────────────────────────────────────

/// Translate a [`RecommendationQuery`] into a WHERE clause and its positional
/// parameters. An empty query yields an empty clause (matches everything).
fn query_where(query: &RecommendationQuery) -> (String, Vec<String>) {
  let mut conds: Vec<String> = Vec::new();
  let mut params: Vec<String> = Vec::new();

  if let Some(user_id) = &query.user_id {
    params.push(user_id.clone());
    conds.push(format!("user_id = ?{}", params.len()));
  }
  if let Some(source_item) = &query.source_item {
    params.push(source_item.clone());
    conds.push(format!("source_item = ?{}", params.len()));
  }
  if let Some(recommended) = &query.recommended_item {
    params.push(recommended.clone());
    conds.push(format!("recommended_item_id = ?{}", params.len()));
  }
  if let Some(item) = &query.either_item {
    params.push(item.clone());
    params.push(item.clone());
    conds.push(format!(
      "(source_item = ?{} OR recommended_item_id = ?{})",
      params.len() - 1,
      params.len()
    ));
  }
  match query.has_feedback {
    Some(true) => conds.push("feedback IS NOT NULL".into()),
    Some(false) => conds.push("feedback IS NULL".into()),
    None => {}
  }

  let clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };
  (clause, params)
}

const SELECT_COLUMNS: &str = "id, user_id, source_item, recommended_item_id, \
                              recommended_item_name, reasoning, confidence, \
                              feedback, created_at";

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRecommendation> {
  Ok(RawRecommendation {
    id:                    row.get(0)?,
    user_id:               row.get(1)?,
    source_item:           row.get(2)?,
    recommended_item_id:   row.get(3)?,
    recommended_item_name: row.get(4)?,
    reasoning:             row.get(5)?,
    confidence:            row.get(6)?,
    feedback:              row.get(7)?,
    created_at:            row.get(8)?,
  })
}

// ─── RecommendationStore impl ────────────────────────────────────────────────

impl RecommendationStore for SqliteStore {
  type Error = Error;

  async fn insert_many(&self, records: Vec<Recommendation>) -> Result<()> {
    if records.is_empty() {
      return Ok(());
    }

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO recommendations (
               id, user_id, source_item, recommended_item_id,
               recommended_item_name, reasoning, confidence,
               feedback, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          )?;
          for rec in &records {
            stmt.execute(rusqlite::params![
              encode_uuid(rec.id),
              rec.user_id,
              rec.source_item,
              rec.recommended_item_id,
              rec.recommended_item_name,
              rec.reasoning,
              rec.confidence,
              encode_feedback(rec.feedback),
              encode_dt(rec.created_at),
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn find(&self, query: &RecommendationQuery) -> Result<Vec<Recommendation>> {
    let (clause, params) = query_where(query);

    let raws: Vec<RawRecommendation> = self
      .conn
      .call(move |conn| {
        let sql =
          format!("SELECT {SELECT_COLUMNS} FROM recommendations {clause}");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), row_to_raw)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawRecommendation::into_recommendation)
      .collect()
  }

  async fn count(&self, query: &RecommendationQuery) -> Result<usize> {
    let (clause, params) = query_where(query);

    let n: i64 = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT COUNT(*) FROM recommendations {clause}");
        let n = conn.query_row(
          &sql,
          rusqlite::params_from_iter(params),
          |row| row.get(0),
        )?;
        Ok(n)
      })
      .await?;

    Ok(n as usize)
  }

  async fn set_feedback(
    &self,
    user_id: &str,
    recommended_item_id: &str,
    feedback: Feedback,
    touched_at: chrono::DateTime<chrono::Utc>,
  ) -> Result<usize> {
    let user_id = user_id.to_owned();
    let item_id = recommended_item_id.to_owned();
    let feedback_val = encode_feedback(Some(feedback));
    let at_str = encode_dt(touched_at);

    let updated = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE recommendations
           SET feedback = ?1, created_at = ?2
           WHERE user_id = ?3 AND recommended_item_id = ?4",
          rusqlite::params![feedback_val, at_str, user_id, item_id],
        )?;
        Ok(n)
      })
      .await?;

    Ok(updated)
  }

  async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let removed = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM recommendations WHERE id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(n)
      })
      .await?;

    Ok(removed > 0)
  }

  async fn clear(&self, user_id: Option<&str>) -> Result<usize> {
    let user_id = user_id.map(str::to_owned);

    let removed = self
      .conn
      .call(move |conn| {
        let n = match user_id {
          Some(u) => conn.execute(
            "DELETE FROM recommendations WHERE user_id = ?1",
            rusqlite::params![u],
          )?,
          None => conn.execute("DELETE FROM recommendations", [])?,
        };
        Ok(n)
      })
      .await?;

    Ok(removed)
  }
}
