//! SQLite-backed job store: connection, schema, row decoding.
//!
//! Job operations live in `jobs`; bulk import in `import`.

use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use super::types::{Job, JobState};
use crate::config::PipelineConfig;
use crate::error::StoreError;

/// Percent-encode a path for use in a sqlite:// URI so spaces and special chars don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

/// Handle to the job database. Cheap to clone; clones share one pool.
#[derive(Clone)]
pub struct JobStore {
    pub(crate) pool: Pool<Sqlite>,
}

impl JobStore {
    /// Open (or create) the store at `cfg.db_path()` (`<root>/state/queue.db`).
    pub async fn open(cfg: &PipelineConfig) -> Result<Self, StoreError> {
        Self::open_at(cfg.db_path()).await
    }

    /// Open (or create) the store at a specific path. Creates parent dirs if needed.
    ///
    /// Any failure to create, connect or migrate is reported as
    /// [`StoreError::Unavailable`]; no job data is touched in that case.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let unavailable = |message: String| StoreError::Unavailable {
            path: path.to_path_buf(),
            message,
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| unavailable(e.to_string()))?;
        }
        let uri = path_to_sqlite_uri(path) + "?mode=rwc";
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(&uri)
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        let store = JobStore { pool };
        store
            .migrate()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        tracing::debug!(path = %path.display(), "job store opened");
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), sqlx::Error> {
        // `status` holds pending / processing / done; `item_json` is the opaque payload.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS queue (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                item_json TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS queue_status_id ON queue (status, id);")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Close the pool, waiting for in-flight statements.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Decode a `queue` row selected as `id, item_json, status, created_at`.
pub(crate) fn job_from_row(row: &SqliteRow) -> Result<Job, StoreError> {
    let id: i64 = row.try_get("id")?;
    let item_json: String = row.try_get("item_json")?;
    let status: String = row.try_get("status")?;
    let created_at: i64 = row.try_get("created_at")?;

    let state = JobState::from_db_str(&status).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: "status".to_string(),
        source: format!("unknown job status '{status}'").into(),
    })?;

    Ok(Job {
        id,
        payload: serde_json::from_str(&item_json)?,
        state,
        created_at,
    })
}

/// Current time as Unix seconds (for DB timestamps).
pub(crate) fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
/// Open an in-memory store for tests (no disk I/O).
pub(crate) async fn open_memory() -> Result<JobStore, StoreError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let store = JobStore { pool };
    store.migrate().await?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_uri_escapes_special_chars() {
        let uri = path_to_sqlite_uri(Path::new("/tmp/my dir/q#1.db"));
        assert_eq!(uri, "sqlite:///tmp/my%20dir/q%231.db");
    }
}
