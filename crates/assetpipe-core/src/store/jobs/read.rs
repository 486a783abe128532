//! Job read operations: list and get.

use super::super::db::{job_from_row, JobStore};
use super::super::types::{Job, JobId, JobState};
use crate::error::StoreError;

impl JobStore {
    /// All jobs in ascending id order, optionally only those in `state`.
    pub async fn list(&self, state: Option<JobState>) -> Result<Vec<Job>, StoreError> {
        let rows = match state {
            Some(state) => {
                sqlx::query(
                    r#"
                    SELECT id, item_json, status, created_at
                    FROM queue
                    WHERE status = ?1
                    ORDER BY id ASC
                    "#,
                )
                .bind(state.as_db_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, item_json, status, created_at
                    FROM queue
                    ORDER BY id ASC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(job_from_row).collect()
    }

    /// Fetch a single job, or `None` if the id does not exist.
    pub async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, item_json, status, created_at
            FROM queue
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(job_from_row).transpose()
    }
}
