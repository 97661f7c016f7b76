//! Error types for image-relay
//!
//! Every failure in the transfer pipeline falls into one of a small, closed
//! set of kinds:
//! - configuration problems (fatal at startup)
//! - fetch problems (bad source URL, non-200 response, broken connection)
//! - storage problems (local download directory, object store)
//! - queue problems (queue mode only)
//!
//! Each kind maps to an HTTP status code and a machine-readable error code so
//! the request boundary can render a meaningful error page.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for image-relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for image-relay
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The environment variable that caused the error (e.g., "S3_BUCKET_NAME")
        key: Option<String>,
    },

    /// Fetching the source image failed
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Writing the local copy or uploading it failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Publishing a transfer job failed
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    /// HTTP server could not bind or stopped unexpectedly
    #[error("server error: {0}")]
    Server(String),
}

impl Error {
    /// Shorthand for a configuration error tied to an environment variable
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// Errors raised while parsing and fetching the source image
#[derive(Debug, Error)]
pub enum FetchError {
    /// The submitted URL is empty, unparsable or not http(s)
    #[error("invalid image URL '{url}': {reason}")]
    InvalidUrl {
        /// The URL as submitted (trimmed)
        url: String,
        /// Why the URL was rejected
        reason: String,
    },

    /// The source answered with something other than 200 OK
    #[error("fetching '{url}' returned HTTP {status} {reason}")]
    Status {
        /// The source URL
        url: String,
        /// The HTTP status code received
        status: u16,
        /// The canonical reason phrase for the status
        reason: String,
    },

    /// The request could not be sent (DNS, connect, TLS, ...)
    #[error("request to '{url}' failed: {message}")]
    Request {
        /// The source URL
        url: String,
        /// Underlying client error
        message: String,
    },

    /// The connection broke while streaming the response body
    #[error("reading body from '{url}' failed: {message}")]
    Body {
        /// The source URL
        url: String,
        /// Underlying client error
        message: String,
    },
}

/// Errors raised by the local writer and the object store
#[derive(Debug, Error)]
pub enum StorageError {
    /// Local download file could not be created, written or removed
    #[error("local file {path}: {source}")]
    LocalFile {
        /// The local path involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The object store rejected the upload or was unreachable
    #[error("upload of '{key}' to bucket '{bucket}' failed: {message}")]
    Upload {
        /// Destination bucket
        bucket: String,
        /// Destination object key
        key: String,
        /// Underlying SDK error
        message: String,
    },

    /// The bucket's region could not be determined
    #[error("could not determine region of bucket '{bucket}': {message}")]
    Region {
        /// The bucket whose location was requested
        bucket: String,
        /// Underlying SDK error
        message: String,
    },
}

/// Errors raised while publishing to the work queue
#[derive(Debug, Error)]
pub enum QueueError {
    /// The queue URL could not be resolved from its name
    #[error("could not resolve queue '{queue}': {message}")]
    Resolve {
        /// Queue name
        queue: String,
        /// Underlying SDK error
        message: String,
    },

    /// The message was not accepted
    #[error("sending to queue '{queue}' failed: {message}")]
    Send {
        /// Queue name
        queue: String,
        /// Underlying SDK or serialization error
        message: String,
    },
}

/// Convert errors to HTTP status codes for the error page
///
/// This trait maps domain errors to appropriate HTTP status codes.
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - the user submitted something unusable
            Error::Fetch(FetchError::InvalidUrl { .. }) => 400,

            // 502 Bad Gateway - an upstream service failed us
            Error::Fetch(_) => 502,
            Error::Storage(StorageError::Upload { .. }) => 502,
            Error::Storage(StorageError::Region { .. }) => 502,
            Error::Queue(_) => 502,

            // 500 Internal Server Error - our own side broke
            Error::Storage(StorageError::LocalFile { .. }) => 500,
            Error::Config { .. } => 500,
            Error::Server(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Fetch(e) => match e {
                FetchError::InvalidUrl { .. } => "invalid_url",
                FetchError::Status { .. } => "fetch_status",
                FetchError::Request { .. } | FetchError::Body { .. } => "fetch_failed",
            },
            Error::Storage(e) => match e {
                StorageError::LocalFile { .. } => "local_file_error",
                StorageError::Upload { .. } => "upload_failed",
                StorageError::Region { .. } => "region_lookup_failed",
            },
            Error::Queue(_) => "queue_error",
            Error::Server(_) => "server_error",
        }
    }
}
