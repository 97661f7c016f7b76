//! S3 object store backed by aws-sdk-s3

use super::{ObjectStore, bucket_base_url, path_style_base_url, regional_base_url};
use crate::config::StorageConfig;
use crate::error::{Result, StorageError};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use std::path::Path;
use tokio::sync::OnceCell;

/// Region S3 reports as an empty location constraint
const DEFAULT_REGION: &str = "us-east-1";

/// Uploads images into a single S3 (or S3-compatible) bucket
pub struct S3Store {
    client: Client,
    bucket: String,
    public_read: bool,
    /// Explicit public base (from `S3_PUBLIC_BASE_URL` or a custom endpoint)
    public_base: Option<String>,
    /// Bucket region, looked up on first use
    region: OnceCell<String>,
}

impl S3Store {
    /// Build a store from the shared AWS configuration
    ///
    /// A custom endpoint switches the client to path-style addressing, which
    /// is what MinIO and most S3-compatible services expect.
    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig, storage: &StorageConfig) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);
        if let Some(endpoint) = &storage.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        Self::new(Client::from_conf(builder.build()), storage)
    }

    /// Wrap an existing client
    pub fn new(client: Client, storage: &StorageConfig) -> Self {
        let public_base = match (&storage.public_base_url, &storage.endpoint_url) {
            (Some(base), _) => Some(bucket_base_url(base, &storage.bucket)),
            // The client addresses a custom endpoint path-style
            (None, Some(endpoint)) => Some(path_style_base_url(endpoint, &storage.bucket)),
            (None, None) => None,
        };

        Self {
            client,
            bucket: storage.bucket.clone(),
            public_read: storage.public_read,
            public_base,
            region: OnceCell::new(),
        }
    }

    async fn bucket_region(&self) -> Result<&str> {
        let region = self
            .region
            .get_or_try_init(|| async {
                let output = self
                    .client
                    .get_bucket_location()
                    .bucket(&self.bucket)
                    .send()
                    .await
                    .map_err(|e| StorageError::Region {
                        bucket: self.bucket.clone(),
                        message: DisplayErrorContext(&e).to_string(),
                    })?;

                let constraint = output
                    .location_constraint()
                    .map(|c| c.as_str().to_string())
                    .unwrap_or_default();
                let region = normalize_location(&constraint);

                tracing::debug!(bucket = %self.bucket, region = %region, "Resolved bucket region");
                Ok::<_, StorageError>(region)
            })
            .await?;

        Ok(region.as_str())
    }
}

/// Map a `GetBucketLocation` constraint to a region name
fn normalize_location(constraint: &str) -> String {
    match constraint {
        "" => DEFAULT_REGION.to_string(),
        // Legacy alias returned for old eu-west-1 buckets
        "EU" => "eu-west-1".to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_file(&self, path: &Path, key: &str, content_type: Option<&str>) -> Result<()> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::LocalFile {
                path: path.to_path_buf(),
                source: std::io::Error::other(e),
            })?;

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body);

        if self.public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }
        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }

        request.send().await.map_err(|e| StorageError::Upload {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            message: DisplayErrorContext(&e).to_string(),
        })?;

        tracing::info!(bucket = %self.bucket, key = %key, "Uploaded object");
        Ok(())
    }

    async fn public_base_url(&self) -> Result<String> {
        if let Some(base) = &self.public_base {
            return Ok(base.clone());
        }
        let region = self.bucket_region().await?;
        Ok(regional_base_url(region, &self.bucket))
    }
}
