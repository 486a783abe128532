//! Types used by the job store.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Job identifier (SQLite rowid, strictly increasing).
pub type JobId = i64;

/// Lifecycle state. Transitions only move forward: `Pending → Claimed → Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Claimed,
    Done,
}

impl JobState {
    /// Name stored in the `status` column. `Claimed` is persisted as `processing`.
    pub fn as_db_str(self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Claimed => "processing",
            JobState::Done => "done",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(JobState::Pending),
            "processing" => Some(JobState::Claimed),
            "done" => Some(JobState::Done),
            _ => None,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Pending => "pending",
            JobState::Claimed => "claimed",
            JobState::Done => "done",
        };
        f.write_str(s)
    }
}

/// Accepts the user-facing names plus the on-disk `processing`.
impl FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(JobState::Pending),
            "claimed" | "processing" => Ok(JobState::Claimed),
            "done" => Ok(JobState::Done),
            other => Err(format!(
                "unknown job state '{other}' (expected pending, claimed or done)"
            )),
        }
    }
}

/// A copy of a job record. The store owns the row; callers only hold snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub id: JobId,
    /// Opaque payload, returned exactly as enqueued.
    pub payload: serde_json::Value,
    pub state: JobState,
    /// Unix seconds at enqueue time.
    pub created_at: i64,
}
