//! End-to-end pipeline tests through the public API
//!
//! A wiremock server plays the image host and an in-memory store plays the
//! bucket, so these run without network access or AWS credentials.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use image_relay::error::{FetchError, Result, StorageError};
use image_relay::naming::derive_local_name;
use image_relay::storage::join_key;
use image_relay::{Config, Error, ObjectStore, TransferOutcome, TransferService, api};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE: &str = "https://cdn.example.net/gallery";

/// Keeps uploaded objects in a map keyed by object key
#[derive(Default)]
struct MemoryBucket {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for MemoryBucket {
    fn bucket(&self) -> &str {
        "gallery"
    }

    async fn put_file(&self, path: &Path, key: &str, _content_type: Option<&str>) -> Result<()> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| StorageError::LocalFile {
                path: path.to_path_buf(),
                source,
            })?;
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(())
    }

    async fn public_base_url(&self) -> Result<String> {
        Ok(BASE.to_string())
    }
}

fn setup() -> (Arc<TransferService>, Arc<MemoryBucket>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::new("gallery");
    config.download_dir = temp_dir.path().to_path_buf();

    let bucket = Arc::new(MemoryBucket::default());
    let service = TransferService::new(Arc::new(config), bucket.clone(), None).unwrap();
    (Arc::new(service), bucket, temp_dir)
}

#[tokio::test]
async fn test_relays_image_bytes_into_bucket() {
    let (service, bucket, temp_dir) = setup();
    let source = MockServer::start().await;
    let body = vec![7u8; 64 * 1024];
    Mock::given(method("GET"))
        .and(path("/big/photo.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.clone(), "image/jpeg"))
        .mount(&source)
        .await;

    let url = format!("{}/big/photo.jpg", source.uri());
    let outcome = service.submit(&url).await.unwrap();

    let key = derive_local_name(&url);
    match outcome {
        TransferOutcome::Uploaded(done) => {
            assert_eq!(done.name, key);
            assert_eq!(done.destination_url, join_key(BASE, &key));
            assert_eq!(done.bytes, body.len() as u64);
        }
        other => panic!("expected upload, got {other:?}"),
    }

    assert_eq!(bucket.get(&key).unwrap(), body);
    assert!(
        std::fs::read_dir(temp_dir.path()).unwrap().next().is_none(),
        "download directory should be empty after upload"
    );
}

#[tokio::test]
async fn test_different_urls_with_same_basename_do_not_collide() {
    let (service, bucket, _temp_dir) = setup();
    let source = MockServer::start().await;
    for (route, byte) in [("/a/logo.png", 1u8), ("/b/logo.png", 2u8)] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_raw(vec![byte; 8], "image/png"))
            .mount(&source)
            .await;
    }

    let first = format!("{}/a/logo.png", source.uri());
    let second = format!("{}/b/logo.png", source.uri());
    service.submit(&first).await.unwrap();
    service.submit(&second).await.unwrap();

    assert_eq!(bucket.len(), 2);
    assert_eq!(bucket.get(&derive_local_name(&first)).unwrap(), vec![1u8; 8]);
    assert_eq!(bucket.get(&derive_local_name(&second)).unwrap(), vec![2u8; 8]);
}

#[tokio::test]
async fn test_server_error_from_source_is_reported() {
    let (service, bucket, _temp_dir) = setup();
    let source = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&source)
        .await;

    let err = service
        .submit(&format!("{}/x.png", source.uri()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Fetch(FetchError::Status { status: 500, .. })
    ));
    assert_eq!(bucket.len(), 0);
}

#[tokio::test]
async fn test_form_submission_round_trip_through_router() {
    let (service, bucket, _temp_dir) = setup();
    let source = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cat.gif"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"GIF89a".to_vec(), "image/gif"))
        .mount(&source)
        .await;

    let url = format!("{}/cat.gif", source.uri());
    let request = Request::builder()
        .method("POST")
        .uri("/images/")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "image_url={}",
            urlencoding::encode(&url)
        )))
        .unwrap();

    let response = api::create_router(service.clone())
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // Follow the redirect
    let target = response.headers()["location"].to_str().unwrap().to_string();
    let confirmation = api::create_router(service)
        .oneshot(Request::builder().uri(&target).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(confirmation.status(), StatusCode::OK);

    let html = axum::body::to_bytes(confirmation.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(html.to_vec()).unwrap();
    assert!(html.contains(&derive_local_name(&url)));
    assert_eq!(bucket.get(&derive_local_name(&url)).unwrap(), b"GIF89a");
}
