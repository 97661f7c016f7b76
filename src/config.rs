//! Configuration types for image-relay
//!
//! Configuration is read from the environment exactly once at startup and
//! shared with every handler through an `Arc<Config>`.

use crate::error::{Error, Result};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

/// Environment variable holding the destination bucket
pub const ENV_BUCKET_NAME: &str = "S3_BUCKET_NAME";
/// Legacy environment variable for the destination bucket
pub const ENV_BUCKET_LEGACY: &str = "S3_URL";
/// Environment variable selecting `direct` or `queue` mode
pub const ENV_TRANSFER_MODE: &str = "TRANSFER_MODE";
/// Environment variable holding the work-queue name (queue mode)
pub const ENV_QUEUE_NAME: &str = "SQS_QUEUE_NAME";

/// How a submitted URL is processed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransferMode {
    /// Fetch and upload inside the request
    Direct,
    /// Publish a job on the named work queue and return immediately
    Queue {
        /// Name of the work queue
        queue_name: String,
    },
}

impl TransferMode {
    /// Short label used in logs and the health endpoint
    pub fn label(&self) -> &'static str {
        match self {
            TransferMode::Direct => "direct",
            TransferMode::Queue { .. } => "queue",
        }
    }
}

/// Object storage settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    /// Destination bucket name
    pub bucket: String,

    /// Apply the `public-read` canned ACL on upload (default: true)
    pub public_read: bool,

    /// Custom S3-compatible endpoint; path-style addressing is used when set
    pub endpoint_url: Option<String>,

    /// Base used to build public object URLs instead of the regional S3 host
    ///
    /// A `{bucket}` placeholder is expanded; otherwise the bucket is appended
    /// unless the base already names it.
    pub public_base_url: Option<String>,
}

impl StorageConfig {
    /// Storage settings for a bucket with everything else defaulted
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            public_read: true,
            endpoint_url: None,
            public_base_url: None,
        }
    }
}

/// HTTP listener settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Bind host, an IP literal (default: 127.0.0.1)
    pub host: IpAddr,

    /// Bind port (default: 5000)
    pub port: u16,
}

impl ServerConfig {
    /// Socket address to bind the listener to
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Main configuration for image-relay
#[derive(Clone, Debug)]
pub struct Config {
    /// Object storage settings
    pub storage: StorageConfig,

    /// Direct or queue processing
    pub mode: TransferMode,

    /// HTTP listener settings
    pub server: ServerConfig,

    /// Directory receiving transient downloads (default: "image_downloads")
    pub download_dir: PathBuf,

    /// Remove the local download after a successful upload (default: true)
    pub delete_after_upload: bool,
}

impl Config {
    /// Direct-mode configuration for a bucket with all other settings defaulted
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            storage: StorageConfig::new(bucket),
            mode: TransferMode::Direct,
            server: ServerConfig::default(),
            download_dir: default_download_dir(),
            delete_after_upload: true,
        }
    }

    /// Build the configuration from process environment variables
    ///
    /// Fails if a required variable is missing or a value cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    ///
    /// Empty values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bucket = get(ENV_BUCKET_NAME)
            .or_else(|| get(ENV_BUCKET_LEGACY))
            .ok_or_else(|| {
                Error::config(
                    ENV_BUCKET_NAME,
                    format!("{ENV_BUCKET_NAME} (or {ENV_BUCKET_LEGACY}) must be set"),
                )
            })?;

        let mode = match get(ENV_TRANSFER_MODE).as_deref() {
            None | Some("direct") => TransferMode::Direct,
            Some("queue") => {
                let queue_name = get(ENV_QUEUE_NAME).ok_or_else(|| {
                    Error::config(ENV_QUEUE_NAME, format!("{ENV_QUEUE_NAME} must be set in queue mode"))
                })?;
                TransferMode::Queue { queue_name }
            }
            Some(other) => {
                return Err(Error::config(
                    ENV_TRANSFER_MODE,
                    format!("unknown transfer mode '{other}' (expected 'direct' or 'queue')"),
                ));
            }
        };

        let host = match get("HOST") {
            Some(raw) => raw
                .parse::<IpAddr>()
                .map_err(|e| {
                    Error::config(
                        "HOST",
                        format!("invalid host '{raw}' (expected an IP address such as 127.0.0.1): {e}"),
                    )
                })?,
            None => default_host(),
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| Error::config("PORT", format!("invalid port '{raw}': {e}")))?,
            None => default_port(),
        };

        Ok(Self {
            storage: StorageConfig {
                bucket,
                public_read: parse_flag(get("S3_PUBLIC_READ"), "S3_PUBLIC_READ", true)?,
                endpoint_url: get("S3_ENDPOINT_URL"),
                public_base_url: get("S3_PUBLIC_BASE_URL"),
            },
            mode,
            server: ServerConfig { host, port },
            download_dir: get("DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_download_dir),
            delete_after_upload: parse_flag(
                get("DELETE_AFTER_UPLOAD"),
                "DELETE_AFTER_UPLOAD",
                true,
            )?,
        })
    }
}

fn parse_flag(value: Option<String>, key: &str, default: bool) -> Result<bool> {
    let Some(raw) = value else {
        return Ok(default);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::config(key, format!("invalid boolean '{raw}'"))),
    }
}

// Default value functions
fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    5000
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("image_downloads")
}
