//! Durable job queue (SQLite via sqlx).
//!
//! Each job carries an opaque JSON payload and moves `pending → claimed → done`.
//! The database is the only coordination point between workers: every
//! mutation is a single statement or transaction, so concurrent claimants in
//! other connections or processes never receive the same job.
//!
//! A job claimed by a worker that then crashes stays `claimed`; nothing here
//! reverts it.

mod db;
mod import;
mod jobs;
mod types;

pub use db::JobStore;
pub use types::{Job, JobId, JobState};
