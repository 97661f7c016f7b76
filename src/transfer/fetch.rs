//! Streaming fetch of the source image into the download directory

use crate::error::{FetchError, Result, StorageError};
use reqwest::StatusCode;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// What the local writer produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    /// Number of body bytes written to disk
    pub bytes_written: u64,
    /// `Content-Type` reported by the source, if any
    pub content_type: Option<String>,
}

/// GET `url` and stream the body into `path`
///
/// Only `200 OK` is accepted; any other status is returned as
/// [`FetchError::Status`] before anything touches the disk. The body is read
/// chunk by chunk so large images are never held in memory. An existing file
/// at `path` is overwritten. The file handle is flushed and closed before
/// this function returns.
pub async fn fetch_to_file(client: &reqwest::Client, url: &str, path: &Path) -> Result<FetchedFile> {
    let mut response = client.get(url).send().await.map_err(|e| FetchError::Request {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
        }
        .into());
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| local_file(path, e))?;

    let mut bytes_written: u64 = 0;
    while let Some(chunk) = response.chunk().await.map_err(|e| FetchError::Body {
        url: url.to_string(),
        message: e.to_string(),
    })? {
        file.write_all(&chunk).await.map_err(|e| local_file(path, e))?;
        bytes_written += chunk.len() as u64;
    }

    file.flush().await.map_err(|e| local_file(path, e))?;
    drop(file);

    tracing::debug!(
        url = %url,
        path = %path.display(),
        bytes = bytes_written,
        "Wrote source image to disk"
    );

    Ok(FetchedFile {
        bytes_written,
        content_type,
    })
}

fn local_file(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::LocalFile {
        path: path.to_path_buf(),
        source,
    }
}
