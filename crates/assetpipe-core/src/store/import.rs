//! Bulk import from a `{ "queue": [ <payload>, ... ] }` document.

use serde::Deserialize;
use std::path::Path;

use super::db::{unix_timestamp, JobStore};
use super::types::JobState;
use crate::error::StoreError;

#[derive(Debug, Deserialize)]
struct QueueDocument {
    #[serde(default)]
    queue: Vec<serde_json::Value>,
}

impl JobStore {
    /// Enqueue every element of the document's `queue` array, in array order.
    ///
    /// A missing file, or a document without `queue`, imports nothing and
    /// returns 0. All rows are inserted in one transaction.
    pub async fn import_bulk(&self, source: &Path) -> Result<usize, StoreError> {
        let data = match tokio::fs::read_to_string(source).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %source.display(), "import source missing, nothing to do");
                return Ok(0);
            }
            Err(e) => {
                return Err(StoreError::Import {
                    path: source.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };
        let doc: QueueDocument = serde_json::from_str(&data).map_err(|e| StoreError::Import {
            path: source.to_path_buf(),
            message: e.to_string(),
        })?;

        let now = unix_timestamp();
        let mut tx = self.pool.begin().await?;
        for item in &doc.queue {
            sqlx::query(
                r#"
                INSERT INTO queue (item_json, status, created_at)
                VALUES (?1, ?2, ?3)
                "#,
            )
            .bind(serde_json::to_string(item)?)
            .bind(JobState::Pending.as_db_str())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        tracing::info!(path = %source.display(), count = doc.queue.len(), "imported jobs");
        Ok(doc.queue.len())
    }
}
