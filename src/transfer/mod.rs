//! Image transfer pipeline
//!
//! [`TransferService`] owns everything a request needs: the configuration,
//! the HTTP client, the object store and (in queue mode) the work queue.
//! A submission runs one of two linear pipelines:
//!
//! - **direct**: parse → name → fetch → write → upload → delete local copy
//! - **queue**: parse → name → publish job
//!
//! Nothing is retried. The first error ends the request.

use crate::config::{Config, TransferMode};
use crate::error::{Error, Result, StorageError};
use crate::naming::{derive_local_name, parse_source_url};
use crate::queue::{SqsQueue, TransferJob, WorkQueue};
use crate::storage::{ObjectStore, S3Store};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::form_urlencoded;

mod fetch;

pub use fetch::{FetchedFile, fetch_to_file};

/// Path of the direct-mode confirmation page
pub const UPLOADED_PATH: &str = "/uploaded_image";
/// Path of the queue-mode confirmation page
pub const RECEIVED_PATH: &str = "/request_received";

/// A single image transfer, alive for the duration of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Submitted URL, trimmed
    pub source_url: String,
    /// `md5(source_url)-basename`, also the object key
    pub local_name: String,
    /// Where the download is written
    pub local_path: PathBuf,
}

impl TransferRequest {
    /// Validate a submitted URL and derive its names
    pub fn new(raw_url: &str, download_dir: &Path) -> Result<Self> {
        parse_source_url(raw_url)?;
        let source_url = raw_url.trim().to_string();
        let local_name = derive_local_name(&source_url);
        let local_path = download_dir.join(&local_name);

        Ok(Self {
            source_url,
            local_name,
            local_path,
        })
    }
}

/// Result of a direct-mode transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTransfer {
    /// Object key / local name
    pub name: String,
    /// Source URL
    pub source_url: String,
    /// Public URL of the uploaded object
    pub destination_url: String,
    /// Size of the relayed image
    pub bytes: u64,
}

/// Result of a queue-mode submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedTransfer {
    /// Object key the consumer is expected to use
    pub name: String,
    /// Source URL
    pub source_url: String,
    /// Public base URL of the bucket
    pub destination_base_url: String,
    /// Message id assigned by the queue
    pub message_id: String,
}

/// What happened to a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The image was fetched and uploaded
    Uploaded(CompletedTransfer),
    /// A job was published for an external consumer
    Queued(QueuedTransfer),
}

impl TransferOutcome {
    /// Path and query of the confirmation page for this outcome
    pub fn redirect_target(&self) -> String {
        match self {
            TransferOutcome::Uploaded(done) => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("name", &done.name)
                    .append_pair("source", &done.source_url)
                    .append_pair("destination", &done.destination_url)
                    .finish();
                format!("{UPLOADED_PATH}?{query}")
            }
            TransferOutcome::Queued(queued) => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("name", &queued.name)
                    .append_pair("source", &queued.source_url)
                    .append_pair("dest_base_url", &queued.destination_base_url)
                    .append_pair("dest_img_name", &queued.name)
                    .finish();
                format!("{RECEIVED_PATH}?{query}")
            }
        }
    }
}

/// Runs submitted URLs through the transfer pipeline
pub struct TransferService {
    config: Arc<Config>,
    http: reqwest::Client,
    store: Arc<dyn ObjectStore>,
    queue: Option<Arc<dyn WorkQueue>>,
}

impl TransferService {
    /// Assemble a service from its collaborators
    ///
    /// Queue mode requires a queue; direct mode ignores one.
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn ObjectStore>,
        queue: Option<Arc<dyn WorkQueue>>,
    ) -> Result<Self> {
        if matches!(config.mode, TransferMode::Queue { .. }) && queue.is_none() {
            return Err(Error::Config {
                message: "queue mode needs a work queue".to_string(),
                key: None,
            });
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("image-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to create HTTP client: {e}"),
                key: None,
            })?;

        Ok(Self {
            config,
            http,
            store,
            queue,
        })
    }

    /// Build the AWS-backed service described by `config`
    ///
    /// Credentials and region come from the standard AWS provider chain.
    pub async fn from_config(config: Arc<Config>) -> Result<Self> {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        let store: Arc<dyn ObjectStore> =
            Arc::new(S3Store::from_sdk_config(&sdk_config, &config.storage));

        let queue: Option<Arc<dyn WorkQueue>> = match &config.mode {
            TransferMode::Direct => None,
            TransferMode::Queue { queue_name } => {
                Some(Arc::new(SqsQueue::from_sdk_config(&sdk_config, queue_name.clone())))
            }
        };

        Self::new(config, store, queue)
    }

    /// Shared configuration
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Create the download directory if it does not exist yet
    pub async fn ensure_download_dir(&self) -> Result<()> {
        let dir = &self.config.download_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| StorageError::LocalFile {
                path: dir.clone(),
                source,
            })?;
        Ok(())
    }

    /// Process a submitted URL according to the configured mode
    pub async fn submit(&self, raw_url: &str) -> Result<TransferOutcome> {
        let request = TransferRequest::new(raw_url, &self.config.download_dir)?;

        match (&self.config.mode, &self.queue) {
            (TransferMode::Queue { .. }, Some(queue)) => self
                .enqueue(queue.as_ref(), &request)
                .await
                .map(TransferOutcome::Queued),
            _ => self.transfer(&request).await.map(TransferOutcome::Uploaded),
        }
    }

    /// Fetch the source image, upload it and clean up the local copy
    pub async fn transfer(&self, request: &TransferRequest) -> Result<CompletedTransfer> {
        tracing::info!(
            url = %request.source_url,
            name = %request.local_name,
            "Starting transfer"
        );

        let fetched = fetch_to_file(&self.http, &request.source_url, &request.local_path).await?;

        self.store
            .put_file(
                &request.local_path,
                &request.local_name,
                fetched.content_type.as_deref(),
            )
            .await?;

        let destination_url = self.store.public_url(&request.local_name).await?;

        if self.config.delete_after_upload {
            // Upload already succeeded; a stale local copy only warrants a warning
            if let Err(e) = tokio::fs::remove_file(&request.local_path).await {
                tracing::warn!(
                    path = %request.local_path.display(),
                    error = %e,
                    "Failed to remove local download"
                );
            }
        }

        tracing::info!(
            name = %request.local_name,
            destination = %destination_url,
            bytes = fetched.bytes_written,
            "Transfer complete"
        );

        Ok(CompletedTransfer {
            name: request.local_name.clone(),
            source_url: request.source_url.clone(),
            destination_url,
            bytes: fetched.bytes_written,
        })
    }

    /// Publish a transfer job instead of transferring inline
    pub async fn enqueue(
        &self,
        queue: &dyn WorkQueue,
        request: &TransferRequest,
    ) -> Result<QueuedTransfer> {
        let destination_base_url = self.store.public_base_url().await?;

        let job = TransferJob {
            source_url: request.source_url.clone(),
            image_name: request.local_name.clone(),
            bucket: self.store.bucket().to_string(),
            destination_base_url: destination_base_url.clone(),
            submitted_at: chrono::Utc::now(),
        };

        let message_id = queue.enqueue(&job).await?;

        tracing::info!(
            queue = %queue.name(),
            name = %request.local_name,
            "Transfer queued"
        );

        Ok(QueuedTransfer {
            name: request.local_name.clone(),
            source_url: request.source_url.clone(),
            destination_base_url,
            message_id,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_helpers;
