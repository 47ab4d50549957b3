//! Local response cache for fetched public keys.
//!
//! Entries are verified against their recorded digest on read; a mismatch is
//! treated as a miss and the entry evicted.
//!
//! # Cache Structure
//!
//! ```text
//! ~/.cache/manifest-verify/responses/{sha256(url)}/
//!   body             # Response body
//!   metadata.json    # Cache metadata
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{SignatureError, SignatureResult};

const BODY_FILE: &str = "body";
const METADATA_FILE: &str = "metadata.json";

/// Metadata stored alongside a cached body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMeta {
    /// URL the body was fetched from.
    pub url: String,

    /// When the body was fetched.
    pub fetched_at: DateTime<Utc>,

    /// Body digest (sha256:...).
    pub digest: String,

    /// ETag returned by the origin.
    #[serde(default)]
    pub etag: Option<String>,
}

/// A cached response body.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub body: String,
    pub metadata: CacheMeta,
}

impl CachedResponse {
    /// Age of the entry in whole seconds.
    pub fn age_secs(&self) -> i64 {
        (Utc::now() - self.metadata.fetched_at).num_seconds()
    }
}

/// On-disk response cache keyed by URL.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    cache_dir: PathBuf,
}

impl ResponseCache {
    /// Create a cache with the default location.
    pub fn new() -> SignatureResult<Self> {
        let cache_dir = default_cache_dir().ok_or_else(|| {
            SignatureError::transport("could not determine cache directory")
        })?;
        Ok(Self { cache_dir })
    }

    /// Create a cache with a custom directory.
    pub fn with_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn entry_dir(&self, url: &str) -> PathBuf {
        self.cache_dir.join(hex::encode(Sha256::digest(url.as_bytes())))
    }

    /// Get a cached response, verifying integrity on read.
    pub async fn get(&self, url: &str) -> SignatureResult<Option<CachedResponse>> {
        let entry_dir = self.entry_dir(url);
        let body_path = entry_dir.join(BODY_FILE);
        let meta_path = entry_dir.join(METADATA_FILE);

        if !body_path.exists() || !meta_path.exists() {
            debug!(url, "response not in cache");
            return Ok(None);
        }

        let meta_content = fs::read_to_string(&meta_path)
            .await
            .map_err(|e| cache_error("failed to read cache metadata", e))?;
        let metadata: CacheMeta = match serde_json::from_str(&meta_content) {
            Ok(meta) => meta,
            Err(e) => {
                warn!(url, error = %e, "unreadable cache metadata, evicting");
                self.evict(url).await?;
                return Ok(None);
            }
        };

        let body = fs::read_to_string(&body_path)
            .await
            .map_err(|e| cache_error("failed to read cached body", e))?;

        let actual = body_digest(&body);
        if actual != metadata.digest || metadata.url != url {
            warn!(
                url,
                expected = %metadata.digest,
                actual = %actual,
                "cache integrity check failed, evicting"
            );
            self.evict(url).await?;
            return Ok(None);
        }

        debug!(url, fetched_at = %metadata.fetched_at, "cache hit");
        Ok(Some(CachedResponse { body, metadata }))
    }

    /// Store a response body.
    pub async fn put(&self, url: &str, body: &str, etag: Option<&str>) -> SignatureResult<()> {
        let entry_dir = self.entry_dir(url);
        fs::create_dir_all(&entry_dir)
            .await
            .map_err(|e| cache_error("failed to create cache directory", e))?;

        let metadata = CacheMeta {
            url: url.to_string(),
            fetched_at: Utc::now(),
            digest: body_digest(body),
            etag: etag.map(String::from),
        };
        let meta_json = serde_json::to_string_pretty(&metadata).map_err(|e| {
            SignatureError::transport(format!("failed to serialize cache metadata: {}", e))
        })?;

        write_atomic(&entry_dir.join(BODY_FILE), body).await?;
        write_atomic(&entry_dir.join(METADATA_FILE), &meta_json).await?;

        debug!(url, "cached response");
        Ok(())
    }

    /// Remove one entry.
    pub async fn evict(&self, url: &str) -> SignatureResult<()> {
        let entry_dir = self.entry_dir(url);
        if entry_dir.exists() {
            fs::remove_dir_all(&entry_dir)
                .await
                .map_err(|e| cache_error("failed to evict cache entry", e))?;
        }
        Ok(())
    }

    /// Remove every entry.
    pub async fn clear(&self) -> SignatureResult<()> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)
                .await
                .map_err(|e| cache_error("failed to clear cache", e))?;
        }
        Ok(())
    }
}

/// `<platform cache dir>/manifest-verify/responses`
pub(crate) fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir()
        .or_else(dirs::home_dir)
        .map(|base| base.join("manifest-verify").join("responses"))
}

fn body_digest(body: &str) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(body.as_bytes())))
}

async fn write_atomic(path: &Path, content: &str) -> SignatureResult<()> {
    let temp_path = path.with_extension("tmp");

    fs::write(&temp_path, content)
        .await
        .map_err(|e| cache_error("failed to write temp file", e))?;

    fs::rename(&temp_path, path)
        .await
        .map_err(|e| cache_error("failed to rename temp file", e))?;

    Ok(())
}

fn cache_error(context: &str, err: std::io::Error) -> SignatureError {
    SignatureError::transport(format!("cache: {}: {}", context, err))
}
