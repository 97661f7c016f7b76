//! Shared test doubles for exercising the pipeline without AWS.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::config::{Config, TransferMode};
use crate::error::{Result, StorageError};
use crate::queue::{TransferJob, WorkQueue};
use crate::storage::ObjectStore;
use crate::transfer::TransferService;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::{TempDir, tempdir};

/// Public base every [`RecordingStore`] reports
pub(crate) const TEST_PUBLIC_BASE: &str = "https://s3.test-region-1.amazonaws.com/test-bucket";

/// One upload observed by [`RecordingStore`]
#[derive(Debug, Clone)]
pub(crate) struct RecordedUpload {
    pub key: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// In-memory object store that records every upload
#[derive(Default)]
pub(crate) struct RecordingStore {
    pub uploads: Mutex<Vec<RecordedUpload>>,
    /// When set, every upload fails with this message
    pub fail_with: Option<String>,
}

impl RecordingStore {
    pub(crate) fn failing(message: &str) -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    pub(crate) fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    fn bucket(&self) -> &str {
        "test-bucket"
    }

    async fn put_file(&self, path: &Path, key: &str, content_type: Option<&str>) -> Result<()> {
        if let Some(message) = &self.fail_with {
            return Err(StorageError::Upload {
                bucket: self.bucket().to_string(),
                key: key.to_string(),
                message: message.clone(),
            }
            .into());
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| StorageError::LocalFile {
                path: path.to_path_buf(),
                source,
            })?;

        self.uploads.lock().unwrap().push(RecordedUpload {
            key: key.to_string(),
            content_type: content_type.map(str::to_string),
            bytes,
        });
        Ok(())
    }

    async fn public_base_url(&self) -> Result<String> {
        Ok(TEST_PUBLIC_BASE.to_string())
    }
}

/// Work queue that keeps published jobs in memory
#[derive(Default)]
pub(crate) struct RecordingQueue {
    pub jobs: Mutex<Vec<TransferJob>>,
}

impl RecordingQueue {
    pub(crate) fn jobs(&self) -> Vec<TransferJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkQueue for RecordingQueue {
    fn name(&self) -> &str {
        "test-queue"
    }

    async fn enqueue(&self, job: &TransferJob) -> Result<String> {
        let mut jobs = self.jobs.lock().unwrap();
        jobs.push(job.clone());
        Ok(format!("msg-{}", jobs.len()))
    }
}

/// Direct-mode config whose download directory lives in a fresh temp dir
pub(crate) fn test_config() -> (Config, TempDir) {
    let temp_dir = tempdir().unwrap();
    let mut config = Config::new("test-bucket");
    config.download_dir = temp_dir.path().join("downloads");
    std::fs::create_dir_all(&config.download_dir).unwrap();
    (config, temp_dir)
}

/// Everything a direct-mode test needs to inspect afterwards
pub(crate) struct DirectHarness {
    pub service: Arc<TransferService>,
    pub store: Arc<RecordingStore>,
    pub download_dir: PathBuf,
    pub _temp_dir: TempDir,
}

/// Everything a queue-mode test needs to inspect afterwards
pub(crate) struct QueueHarness {
    pub service: Arc<TransferService>,
    pub queue: Arc<RecordingQueue>,
    pub store: Arc<RecordingStore>,
    pub _temp_dir: TempDir,
}

pub(crate) fn direct_harness_with(
    config: Config,
    temp_dir: TempDir,
    store: RecordingStore,
) -> DirectHarness {
    let store = Arc::new(store);
    let download_dir = config.download_dir.clone();
    let service = TransferService::new(Arc::new(config), store.clone(), None).unwrap();
    DirectHarness {
        service: Arc::new(service),
        store,
        download_dir,
        _temp_dir: temp_dir,
    }
}

pub(crate) fn direct_harness() -> DirectHarness {
    let (config, temp_dir) = test_config();
    direct_harness_with(config, temp_dir, RecordingStore::default())
}

pub(crate) fn queue_harness() -> QueueHarness {
    let (mut config, temp_dir) = test_config();
    config.mode = TransferMode::Queue {
        queue_name: "test-queue".to_string(),
    };
    let store = Arc::new(RecordingStore::default());
    let queue = Arc::new(RecordingQueue::default());
    let service = TransferService::new(
        Arc::new(config),
        store.clone(),
        Some(queue.clone() as Arc<dyn WorkQueue>),
    )
    .unwrap();
    QueueHarness {
        service: Arc::new(service),
        queue,
        store,
        _temp_dir: temp_dir,
    }
}
