//! Object storage for relayed images
//!
//! The [`ObjectStore`] trait is the seam between the transfer pipeline and
//! the bucket. [`S3Store`] is the production implementation.

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;
use url::Url;

mod s3;

pub use s3::S3Store;

/// Destination for uploaded images
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the destination bucket
    fn bucket(&self) -> &str;

    /// Upload the file at `path` under `key`
    ///
    /// The file is read from disk; callers must have closed any write handle
    /// on it beforehand.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Upload` if the store rejects the object or
    /// cannot be reached, and `StorageError::LocalFile` if `path` cannot be
    /// read.
    async fn put_file(&self, path: &Path, key: &str, content_type: Option<&str>) -> Result<()>;

    /// Base URL under which uploaded objects are publicly reachable
    ///
    /// Appending a percent-encoded key yields the object URL.
    async fn public_base_url(&self) -> Result<String>;

    /// Public URL of the object stored under `key`
    async fn public_url(&self, key: &str) -> Result<String> {
        let base = self.public_base_url().await?;
        Ok(join_key(&base, key))
    }
}

/// Append a percent-encoded object key to a base URL
pub fn join_key(base: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        urlencoding::encode(key)
    )
}

/// Build the public base URL for a bucket from an explicit base
///
/// `https://host/{bucket}` style templates are expanded. A base that already
/// names the bucket, either as its first path segment or as a virtual-hosted
/// S3 host (`{bucket}.s3...`), is used as-is. Otherwise the bucket is
/// appended as the first path segment.
///
/// # Examples
///
/// ```
/// use image_relay::storage::bucket_base_url;
///
/// assert_eq!(bucket_base_url("https://cdn.example.com/", "pics"), "https://cdn.example.com/pics");
/// assert_eq!(bucket_base_url("https://{bucket}.example.com", "pics"), "https://pics.example.com");
/// assert_eq!(bucket_base_url("https://pics.example.com", "pics"), "https://pics.example.com/pics");
/// ```
pub fn bucket_base_url(base: &str, bucket: &str) -> String {
    let trimmed = base.trim_end_matches('/');

    if trimmed.contains("{bucket}") {
        return trimmed.replace("{bucket}", bucket);
    }

    if names_bucket(trimmed, bucket) {
        trimmed.to_string()
    } else {
        path_style_base_url(trimmed, bucket)
    }
}

/// Public base URL for a bucket behind a path-style endpoint
///
/// The bucket is always the first path segment, whatever the host is called.
pub fn path_style_base_url(endpoint: &str, bucket: &str) -> String {
    format!("{}/{bucket}", endpoint.trim_end_matches('/'))
}

fn names_bucket(base: &str, bucket: &str) -> bool {
    let Ok(url) = Url::parse(base) else {
        return false;
    };

    let first_segment = url
        .path_segments()
        .and_then(|mut segments| segments.next())
        .unwrap_or_default();
    if first_segment == bucket {
        return true;
    }

    // Virtual-hosted style: <bucket>.s3.<region>.amazonaws.com and friends
    let mut labels = url.host_str().unwrap_or_default().split('.');
    labels.next() == Some(bucket)
        && labels
            .next()
            .is_some_and(|label| label == "s3" || label.starts_with("s3-"))
}

/// Public base URL for a bucket hosted on AWS S3 in `region`
pub fn regional_base_url(region: &str, bucket: &str) -> String {
    format!("https://s3.{region}.amazonaws.com/{bucket}")
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regional_url_has_host_bucket_key_shape() {
        let base = regional_base_url("eu-west-1", "pics");
        assert_eq!(
            join_key(&base, "abc-cat.png"),
            "https://s3.eu-west-1.amazonaws.com/pics/abc-cat.png"
        );
    }

    #[test]
    fn test_key_is_percent_encoded() {
        assert_eq!(
            join_key("https://s3.us-east-1.amazonaws.com/pics", "abc-my cat.jpg"),
            "https://s3.us-east-1.amazonaws.com/pics/abc-my%20cat.jpg"
        );
    }

    #[test]
    fn test_join_key_tolerates_trailing_slash() {
        assert_eq!(join_key("http://localhost:9000/pics/", "k"), "http://localhost:9000/pics/k");
    }

    #[test]
    fn test_explicit_base_gets_bucket_appended() {
        assert_eq!(
            bucket_base_url("http://localhost:9000", "pics"),
            "http://localhost:9000/pics"
        );
    }

    #[test]
    fn test_explicit_base_naming_bucket_is_kept() {
        assert_eq!(
            bucket_base_url("https://pics.s3.amazonaws.com/", "pics"),
            "https://pics.s3.amazonaws.com"
        );
    }

    #[test]
    fn test_bucket_in_host_name_is_not_mistaken_for_path() {
        let base = bucket_base_url("https://images.example.com", "images");
        assert_eq!(base, "https://images.example.com/images");
        assert_eq!(
            join_key(&base, "abc-cat.png"),
            "https://images.example.com/images/abc-cat.png"
        );
    }

    #[test]
    fn test_bucket_as_host_substring_is_still_appended() {
        assert_eq!(
            join_key(&bucket_base_url("http://localhost:9000", "local"), "abc-cat.png"),
            "http://localhost:9000/local/abc-cat.png"
        );
    }

    #[test]
    fn test_bucket_as_path_substring_is_still_appended() {
        assert_eq!(
            bucket_base_url("https://cdn.example.com/picsarchive", "pics"),
            "https://cdn.example.com/picsarchive/pics"
        );
    }

    #[test]
    fn test_base_with_bucket_path_segment_is_kept() {
        assert_eq!(
            bucket_base_url("https://cdn.example.com/pics/", "pics"),
            "https://cdn.example.com/pics"
        );
    }

    #[test]
    fn test_path_style_endpoint_always_gets_bucket() {
        assert_eq!(
            path_style_base_url("http://minio:9000/", "minio"),
            "http://minio:9000/minio"
        );
        assert_eq!(
            path_style_base_url("http://pics.s3.local:9000", "pics"),
            "http://pics.s3.local:9000/pics"
        );
    }

    #[test]
    fn test_bucket_placeholder_is_expanded() {
        assert_eq!(
            bucket_base_url("https://storage.example.com/{bucket}/public", "pics"),
            "https://storage.example.com/pics/public"
        );
    }
}
