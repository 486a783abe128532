//! Integration tests: the worker loop end to end against a local server.

mod common;

use assetpipe_core::request::DownloadRequest;
use assetpipe_core::store::{JobState, JobStore};
use assetpipe_core::worker::{WorkSummary, Worker};
use serde_json::json;
use tempfile::tempdir;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn run_once_downloads_and_completes_job() {
    let body = common::body(64 * 1024);
    let server = common::asset_server::start(body.clone());
    let dir = tempdir().unwrap();
    let cfg = common::test_config(dir.path());
    let store = JobStore::open(&cfg).await.unwrap();

    let payload = DownloadRequest::new(server.url("file.bin"))
        .with_expected_digest(common::sha256_hex(&body))
        .to_payload()
        .unwrap();
    let id = store.enqueue(&payload).await.unwrap();

    let worker = Worker::from_config(store.clone(), &cfg);
    let outcome = worker.run_once().await.unwrap().expect("a job was pending");
    assert_eq!(outcome.job_id, id);
    assert!(outcome.resolution.is_resolved());
    assert_eq!(outcome.fetch.path, cfg.downloads_dir().join("file.bin"));
    assert_eq!(std::fs::read(&outcome.fetch.path).unwrap(), body);

    assert_eq!(store.get(id).await.unwrap().unwrap().state, JobState::Done);
    assert!(worker.run_once().await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_verification_leaves_job_claimed() {
    let server = common::asset_server::start(common::body(4096));
    let dir = tempdir().unwrap();
    let cfg = common::test_config(dir.path());
    let store = JobStore::open(&cfg).await.unwrap();

    let id = store
        .enqueue(&json!({"url": server.url("file.bin"), "sha256": "deadbeef"}))
        .await
        .unwrap();

    let summary = Worker::from_config(store.clone(), &cfg)
        .run_until_idle()
        .await
        .unwrap();
    assert_eq!(summary, WorkSummary { completed: 0, failed: 1 });
    assert_eq!(store.get(id).await.unwrap().unwrap().state, JobState::Claimed);
    // The mismatched file stays where it landed.
    assert!(cfg.downloads_dir().join("file.bin").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn imported_jobs_are_drained_in_order() {
    let body = common::body(10_000);
    let server = common::asset_server::start(body.clone());
    let dir = tempdir().unwrap();
    let cfg = common::test_config(dir.path());
    let store = JobStore::open(&cfg).await.unwrap();

    let source = dir.path().join("queue.json");
    let doc = json!({"queue": [
        {"url": server.url("file.bin"), "dest": "one.bin"},
        {"url": server.url("file.bin"), "dest": "nested/two.bin", "sha256": common::sha256_hex(&body)},
    ]});
    std::fs::write(&source, doc.to_string()).unwrap();
    assert_eq!(store.import_bulk(&source).await.unwrap(), 2);

    let summary = Worker::from_config(store.clone(), &cfg)
        .run_until_idle()
        .await
        .unwrap();
    assert_eq!(summary, WorkSummary { completed: 2, failed: 0 });

    assert!(store
        .list(None)
        .await
        .unwrap()
        .iter()
        .all(|j| j.state == JobState::Done));
    assert_eq!(std::fs::read(cfg.downloads_dir().join("one.bin")).unwrap(), body);
    assert_eq!(
        std::fs::read(cfg.downloads_dir().join("nested").join("two.bin")).unwrap(),
        body
    );
}

#[tokio::test]
async fn empty_store_is_idle() {
    let dir = tempdir().unwrap();
    let cfg = common::test_config(dir.path());
    let store = JobStore::open(&cfg).await.unwrap();
    let worker = Worker::from_config(store, &cfg);
    assert!(worker.run_once().await.unwrap().is_none());
    assert_eq!(worker.run_until_idle().await.unwrap(), WorkSummary::default());
}
