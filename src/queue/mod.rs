//! Work-queue publishing for queue mode
//!
//! In queue mode the web tier only names the image and publishes a
//! [`TransferJob`]. Whatever consumes the queue is outside this crate; the
//! job body is the whole contract.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod sqs;

pub use sqs::SqsQueue;

/// Message published for each submitted image
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferJob {
    /// Source image URL as submitted (trimmed)
    pub source_url: String,
    /// Derived local name, also the destination object key
    pub image_name: String,
    /// Destination bucket
    pub bucket: String,
    /// Public base URL the object will be reachable under
    pub destination_base_url: String,
    /// When the web tier accepted the request
    pub submitted_at: DateTime<Utc>,
}

/// Producer side of the work queue
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Queue name, for logs and error messages
    fn name(&self) -> &str;

    /// Publish a job and return the queue's message id
    async fn enqueue(&self, job: &TransferJob) -> Result<String>;
}
