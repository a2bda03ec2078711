//! Router-level HTTP tests for the media API.
//!
//! Drives the real router over injected in-process collaborators: the
//! simulated pipeline, the actor queue, and the in-memory record store.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use ebbtide_core::config::EbbtideConfig;
use ebbtide_core::library::{InMemoryMediaStore, MediaStore};
use ebbtide_core::pipeline::SimulatedPipeline;
use ebbtide_core::queue::spawn_job_queue;
use ebbtide_web::{app_state, router};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const MAGNET: &str = "magnet:?xt=urn:btih:c12fe1c06bba254a9dc9f519b335aa7c1367a88a&dn=Some%20Video.mp4&tr=udp://tracker.example:80";

/// A pipeline long enough that jobs stay active for the whole test.
const SLOW: Duration = Duration::from_secs(30);

fn test_app(dir: &Path, pipeline_duration: Duration) -> (Router, EbbtideConfig) {
    let config = EbbtideConfig::rooted_at(dir);
    let pipeline = SimulatedPipeline::new(config.storage.encoded_root(), pipeline_duration);
    let queue = spawn_job_queue(&config.queue, pipeline);
    let store: Arc<dyn MediaStore> = Arc::new(InMemoryMediaStore::new());
    let state = app_state(config.clone(), queue, store);
    (router(state), config)
}

async fn get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn get_range(app: &Router, uri: &str, range: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::RANGE, range)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn submit(app: &Router, magnet: &str) -> Response<Body> {
    let body = json!({ "magnetLink": magnet }).to_string();
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn delete(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Submits the standard magnet and returns the created record as JSON.
async fn submit_record(app: &Router) -> Value {
    let response = submit(app, MAGNET).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["video"].clone()
}

#[tokio::test]
async fn test_empty_library_returns_message() {
    let dir = TempDir::new().unwrap();
    let (app, _) = test_app(dir.path(), SLOW);

    let response = get(&app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json, json!({ "message": "No videos found" }));
}

#[tokio::test]
async fn test_malformed_magnet_is_a_client_error() {
    let dir = TempDir::new().unwrap();
    let (app, _) = test_app(dir.path(), SLOW);

    // No dn= display name at all
    let response = submit(
        &app,
        "magnet:?xt=urn:btih:c12fe1c06bba254a9dc9f519b335aa7c1367a88a&tr=udp://t.example:80",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app, "/").await;
    let json = body_json(response).await;
    assert_eq!(json["message"], "No videos found");
}

#[tokio::test]
async fn test_submission_creates_promised_record() {
    let dir = TempDir::new().unwrap();
    let (app, config) = test_app(dir.path(), SLOW);

    let video = submit_record(&app).await;
    assert_eq!(video["filename"], "Some Video.mp4");
    assert_eq!(video["ownerId"], 1);
    assert_eq!(video["magnetLink"], MAGNET);
    assert_eq!(
        video["path"],
        config
            .storage
            .record_dir("Some Video.mp4")
            .to_string_lossy()
            .as_ref()
    );

    let response = get(&app, "/").await;
    let json = body_json(response).await;
    assert_eq!(json.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_progress_lists_active_jobs() {
    let dir = TempDir::new().unwrap();
    let (app, _) = test_app(dir.path(), SLOW);

    let video = submit_record(&app).await;

    // The worker picks the job up asynchronously; poll briefly.
    for _ in 0..200 {
        let json = body_json(get(&app, "/progress").await).await;
        if json.as_array().is_some_and(|jobs| !jobs.is_empty()) {
            assert_eq!(json[0]["state"], "active");
            assert_eq!(json[0]["id"], video["jobId"]);
            assert_eq!(json[0]["payload"]["filename"], "Some Video.mp4");
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job never became active");
}

#[tokio::test]
async fn test_stream_before_encode_finishes_is_not_found() {
    let dir = TempDir::new().unwrap();
    let (app, _) = test_app(dir.path(), SLOW);

    let video = submit_record(&app).await;
    let id = video["id"].as_u64().unwrap();

    let response = get(&app, &format!("/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!("Video file does not exist"));
}

#[tokio::test]
async fn test_stream_unknown_record_is_not_found() {
    let dir = TempDir::new().unwrap();
    let (app, _) = test_app(dir.path(), SLOW);

    let response = get(&app, "/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!("Video not found"));
}

#[tokio::test]
async fn test_stream_full_and_partial_content() {
    let dir = TempDir::new().unwrap();
    let (app, config) = test_app(dir.path(), SLOW);

    let video = submit_record(&app).await;
    let id = video["id"].as_u64().unwrap();

    // Land the encoded file where the record promises it.
    let record_dir = config.storage.record_dir("Some Video.mp4");
    tokio::fs::create_dir_all(&record_dir).await.unwrap();
    let data: Vec<u8> = (0..1000).map(|i| (i % 251) as u8).collect();
    tokio::fs::write(record_dir.join("Some Video.mp4"), &data)
        .await
        .unwrap();

    // Full content
    let response = get(&app, &format!("/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "1000");
    assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(body_bytes(response).await.len(), 1000);

    // Bounded range
    let response = get_range(&app, &format!("/{id}"), "bytes=0-99").await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 0-99/1000");
    assert_eq!(response.headers()[header::ACCEPT_RANGES], "bytes");
    let body = body_bytes(response).await;
    assert_eq!(body.len(), 100);
    assert_eq!(body, data[0..100]);

    // Open-ended range streams to end of file
    let response = get_range(&app, &format!("/{id}"), "bytes=900-").await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response.headers()[header::CONTENT_RANGE],
        "bytes 900-999/1000"
    );
    assert_eq!(body_bytes(response).await, data[900..1000]);

    // Start past the end of the file
    let response = get_range(&app, &format!("/{id}"), "bytes=2000-").await;
    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes */1000");
}

#[tokio::test]
async fn test_delete_cancels_active_job_and_removes_record() {
    let dir = TempDir::new().unwrap();
    let (app, _) = test_app(dir.path(), SLOW);

    let video = submit_record(&app).await;
    let id = video["id"].as_u64().unwrap();

    // Wait until the job is actually running so deletion exercises the
    // cancellation path rather than the no-op path.
    for _ in 0..200 {
        let json = body_json(get(&app, "/progress").await).await;
        if json.as_array().is_some_and(|jobs| !jobs.is_empty()) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let response = delete(&app, &format!("/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!("Successfully deleted"));

    let json = body_json(get(&app, "/").await).await;
    assert_eq!(json, json!({ "message": "No videos found" }));

    let json = body_json(get(&app, "/progress").await).await;
    assert_eq!(json.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_delete_after_job_reaped_still_succeeds() {
    let dir = TempDir::new().unwrap();
    let (app, _) = test_app(dir.path(), Duration::from_millis(20));

    let video = submit_record(&app).await;
    let id = video["id"].as_u64().unwrap();

    // Wait for the job to finish and be auto-removed.
    for _ in 0..200 {
        let json = body_json(get(&app, "/progress").await).await;
        if json.as_array().is_some_and(Vec::is_empty) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let response = delete(&app, &format!("/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!("Successfully deleted"));
}

#[tokio::test]
async fn test_delete_unknown_record_is_not_found() {
    let dir = TempDir::new().unwrap();
    let (app, _) = test_app(dir.path(), SLOW);

    let response = delete(&app, "/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!("Video not found"));
}
