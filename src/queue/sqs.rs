//! SQS work queue backed by aws-sdk-sqs

use super::{TransferJob, WorkQueue};
use crate::error::{QueueError, Result};
use async_trait::async_trait;
use aws_sdk_sqs::Client;
use aws_sdk_sqs::error::DisplayErrorContext;
use tokio::sync::OnceCell;

/// Publishes transfer jobs to a named SQS queue
pub struct SqsQueue {
    client: Client,
    name: String,
    /// Queue URL, resolved from the name on first send
    url: OnceCell<String>,
}

impl SqsQueue {
    /// Build a queue producer from the shared AWS configuration
    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig, name: impl Into<String>) -> Self {
        Self::new(Client::new(sdk_config), name)
    }

    /// Wrap an existing client
    pub fn new(client: Client, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
            url: OnceCell::new(),
        }
    }

    async fn queue_url(&self) -> Result<&str> {
        let url = self
            .url
            .get_or_try_init(|| async {
                let output = self
                    .client
                    .get_queue_url()
                    .queue_name(&self.name)
                    .send()
                    .await
                    .map_err(|e| QueueError::Resolve {
                        queue: self.name.clone(),
                        message: DisplayErrorContext(&e).to_string(),
                    })?;

                let url = output.queue_url().map(str::to_string).ok_or_else(|| {
                    QueueError::Resolve {
                        queue: self.name.clone(),
                        message: "response carried no queue URL".to_string(),
                    }
                })?;

                tracing::debug!(queue = %self.name, url = %url, "Resolved queue URL");
                Ok::<_, QueueError>(url)
            })
            .await?;

        Ok(url.as_str())
    }
}

#[async_trait]
impl WorkQueue for SqsQueue {
    fn name(&self) -> &str {
        &self.name
    }

    async fn enqueue(&self, job: &TransferJob) -> Result<String> {
        let body = serde_json::to_string(job).map_err(|e| QueueError::Send {
            queue: self.name.clone(),
            message: format!("could not serialize job: {e}"),
        })?;

        let queue_url = self.queue_url().await?;

        let output = self
            .client
            .send_message()
            .queue_url(queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| QueueError::Send {
                queue: self.name.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let message_id = output.message_id().unwrap_or_default().to_string();
        tracing::info!(
            queue = %self.name,
            message_id = %message_id,
            image = %job.image_name,
            "Enqueued transfer job"
        );
        Ok(message_id)
    }
}
