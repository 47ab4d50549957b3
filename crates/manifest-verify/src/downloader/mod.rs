//! Public key downloader.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, warn};

use crate::cache::ResponseCache;
use crate::error::{SignatureError, SignatureResult};
use crate::types::{DownloaderConfig, FetchDirective};

mod http;

use http::HttpBackend;

pub const DOWNLOADER_USER_AGENT: &str = concat!("manifest-verify/", env!("CARGO_PKG_VERSION"));

/// Fetches the public key document.
///
/// `ForceNetwork` must bypass every cache the implementation keeps.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn fetch(&self, url: &str, directive: FetchDirective) -> SignatureResult<String>;
}

#[async_trait]
impl<D: Downloader + ?Sized> Downloader for Arc<D> {
    async fn fetch(&self, url: &str, directive: FetchDirective) -> SignatureResult<String> {
        (**self).fetch(url, directive).await
    }
}

#[async_trait]
impl<'a, D: Downloader + ?Sized> Downloader for &'a D {
    async fn fetch(&self, url: &str, directive: FetchDirective) -> SignatureResult<String> {
        (**self).fetch(url, directive).await
    }
}

/// reqwest-backed downloader with an on-disk response cache.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    http: HttpBackend,
    cache: Option<ResponseCache>,
    max_stale_secs: Option<u64>,
}

impl HttpDownloader {
    pub fn new(config: DownloaderConfig) -> SignatureResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(DOWNLOADER_USER_AGENT));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| {
                SignatureError::transport(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http: HttpBackend {
                client,
                max_body_bytes: config.max_body_bytes,
            },
            cache: config.cache_dir.map(ResponseCache::with_dir),
            max_stale_secs: config.max_stale_secs,
        })
    }

    pub fn from_env() -> SignatureResult<Self> {
        Self::new(DownloaderConfig::from_env())
    }

    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    async fn cached(&self, url: &str) -> Option<String> {
        let cache = self.cache.as_ref()?;

        let entry = match cache.get(url).await {
            Ok(entry) => entry?,
            Err(e) => {
                warn!(url, error = %e, "cache read failed, falling back to network");
                return None;
            }
        };

        if let Some(max_stale) = self.max_stale_secs {
            // Entries dated in the future (clock skew) count as fresh.
            let age = u64::try_from(entry.age_secs()).unwrap_or(0);
            if age > max_stale {
                debug!(url, age, max_stale, "cached response too old");
                return None;
            }
        }

        Some(entry.body)
    }

    async fn fetch_network(&self, url: &str, directive: FetchDirective) -> SignatureResult<String> {
        let fetched = self
            .http
            .get(url, directive == FetchDirective::ForceNetwork)
            .await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(url, &fetched.body, fetched.etag.as_deref()).await {
                warn!(url, error = %e, "failed to cache response");
            }
        }

        Ok(fetched.body)
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn fetch(&self, url: &str, directive: FetchDirective) -> SignatureResult<String> {
        debug!(url, ?directive, "fetching public key");

        if directive == FetchDirective::PreferCache {
            if let Some(body) = self.cached(url).await {
                return Ok(body);
            }
        }

        self.fetch_network(url, directive).await
    }
}
