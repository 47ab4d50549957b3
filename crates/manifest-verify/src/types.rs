//! Request, directive and configuration types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cache::default_cache_dir;

/// Cache directive for a single public key fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchDirective {
    /// Reuse a stored response when one exists.
    PreferCache,
    /// Bypass every cache and go to the origin.
    ForceNetwork,
}

/// Position of a fetch within one verification call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    First,
    Second,
}

impl Attempt {
    /// Directive used for this attempt.
    pub fn directive(self) -> FetchDirective {
        match self {
            Self::First => FetchDirective::PreferCache,
            Self::Second => FetchDirective::ForceNetwork,
        }
    }

    /// The attempt that follows a failure, if any remains.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::First => Some(Self::Second),
            Self::Second => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }
}

/// Signed data supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRequest {
    /// Bytes that were signed (the raw manifest).
    pub plain_text: Vec<u8>,

    /// Base64-encoded RSA-SHA256 signature.
    pub cipher_text: String,
}

impl SignatureRequest {
    pub fn new(plain_text: impl Into<Vec<u8>>, cipher_text: impl Into<String>) -> Self {
        Self {
            plain_text: plain_text.into(),
            cipher_text: cipher_text.into(),
        }
    }
}

/// Configuration for [`HttpDownloader`](crate::HttpDownloader).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// Response cache directory (`None` disables caching).
    #[serde(default = "default_cache_dir")]
    pub cache_dir: Option<PathBuf>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Oldest cached entry served for `PreferCache`, in seconds.
    #[serde(default)]
    pub max_stale_secs: Option<u64>,

    /// Largest accepted response body.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,
}

fn default_timeout() -> u64 {
    30
}

fn default_max_body_bytes() -> u64 {
    512 * 1024
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            timeout_secs: default_timeout(),
            max_stale_secs: None,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl DownloaderConfig {
    /// Create config from environment variables.
    ///
    /// Empty or unparsable values fall back to the defaults.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `MANIFEST_VERIFY_CACHE_DIR` | Response cache directory |
    /// | `MANIFEST_VERIFY_TIMEOUT` | Request timeout in seconds |
    /// | `MANIFEST_VERIFY_MAX_STALE` | Max age of cached keys in seconds |
    pub fn from_env() -> Self {
        Self {
            cache_dir: std::env::var("MANIFEST_VERIFY_CACHE_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .or_else(default_cache_dir),
            timeout_secs: std::env::var("MANIFEST_VERIFY_TIMEOUT")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or_else(default_timeout),
            max_stale_secs: std::env::var("MANIFEST_VERIFY_MAX_STALE")
                .ok()
                .and_then(|v| v.trim().parse::<u64>().ok()),
            max_body_bytes: default_max_body_bytes(),
        }
    }

    /// Set the cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Disable the response cache.
    pub fn without_cache(mut self) -> Self {
        self.cache_dir = None;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Limit how old a cached key may be.
    pub fn with_max_stale_secs(mut self, secs: u64) -> Self {
        self.max_stale_secs = Some(secs);
        self
    }
}
