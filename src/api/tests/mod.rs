use super::*;
use crate::transfer::test_helpers::{
    DirectHarness, RecordingStore, direct_harness, direct_harness_with, queue_harness, test_config,
};
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::Response;
use std::time::Duration;
use tower::ServiceExt;


/// Collect a response body as text
async fn body_text(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

/// GET `uri` against a fresh router
async fn get(service: Arc<TransferService>, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    create_router(service).oneshot(request).await.unwrap()
}

/// POST a urlencoded form body to /images/
async fn post_form(service: Arc<TransferService>, body: String) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri("/images/")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();
    create_router(service).oneshot(request).await.unwrap()
}

fn location(response: &Response) -> String {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_server_spawns() {
    let (mut config, temp_dir) = test_config();
    config.server.port = 0; // OS assigns a free port
    config.download_dir = temp_dir.path().join("fresh");
    let DirectHarness {
        service,
        download_dir,
        _temp_dir,
        ..
    } = direct_harness_with(config, temp_dir, RecordingStore::default());

    let server = tokio::spawn(start_server(service));

    // Give it a moment to start
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!server.is_finished(), "server exited early");
    assert!(download_dir.is_dir(), "download dir created on startup");

    server.abort();
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let harness = direct_harness();
    let response = get(harness.service.clone(), "/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_state_shares_service_config() {
    let harness = queue_harness();
    let state = AppState::new(harness.service.clone());
    assert!(Arc::ptr_eq(&state.config, harness.service.config()));
}
