//! Job write operations: enqueue, claim, complete.

use super::super::db::{job_from_row, unix_timestamp, JobStore};
use super::super::types::{Job, JobId, JobState};
use crate::error::StoreError;

impl JobStore {
    /// Insert a new `pending` job and return its id.
    pub async fn enqueue(&self, payload: &serde_json::Value) -> Result<JobId, StoreError> {
        let item_json = serde_json::to_string(payload)?;
        let id = sqlx::query(
            r#"
            INSERT INTO queue (item_json, status, created_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(item_json)
        .bind(JobState::Pending.as_db_str())
        .bind(unix_timestamp())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        tracing::debug!(job_id = id, "enqueued job");
        Ok(id)
    }

    /// Atomically claim the lowest-id `pending` job, moving it to `claimed`.
    ///
    /// Returns `None` when nothing is pending. Selection and update are one
    /// statement, so two concurrent callers (in any connection or process)
    /// never both receive the same job.
    pub async fn claim_next(&self) -> Result<Option<Job>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE queue
            SET status = 'processing'
            WHERE id = (
                SELECT id FROM queue
                WHERE status = 'pending'
                ORDER BY id ASC
                LIMIT 1
            )
            AND status = 'pending'
            RETURNING id, item_json, status, created_at
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let job = job_from_row(&row)?;
        tracing::debug!(job_id = job.id, "claimed job");
        Ok(Some(job))
    }

    /// Move a `claimed` job to `done`.
    ///
    /// Returns `true` when the transition happened. A job that is already
    /// `done`, or still `pending` (never claimed), is left untouched and
    /// `false` is returned. Unknown ids are [`StoreError::NotFound`].
    pub async fn complete(&self, id: JobId) -> Result<bool, StoreError> {
        let updated = sqlx::query(
            r#"
            UPDATE queue
            SET status = 'done'
            WHERE id = ?1 AND status = 'processing'
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 1 {
            tracing::debug!(job_id = id, "completed job");
            return Ok(true);
        }

        match self.get(id).await? {
            None => Err(StoreError::NotFound(id)),
            Some(job) => {
                if job.state == JobState::Pending {
                    tracing::warn!(job_id = id, "complete ignored: job was never claimed");
                }
                Ok(false)
            }
        }
    }
}
