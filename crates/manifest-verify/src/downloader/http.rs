//! HTTP layer: request building, status mapping and body limits.
//!
//! This is the ONLY place for status code handling. downloader/mod.rs never
//! interprets status codes.

use reqwest::header::{CACHE_CONTROL, ETAG, PRAGMA};
use tracing::debug;

use crate::error::{SignatureError, SignatureResult};

/// Body and validator of a successful response.
#[derive(Debug)]
pub(crate) struct Fetched {
    pub body: String,
    pub etag: Option<String>,
}

/// HTTP backend (holds reqwest client and limits).
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) max_body_bytes: u64,
}

impl HttpBackend {
    /// GET `url`; `bypass_caches` asks intermediaries for a fresh copy.
    pub(crate) async fn get(&self, url: &str, bypass_caches: bool) -> SignatureResult<Fetched> {
        let mut request = self.client.get(url);
        if bypass_caches {
            request = request
                .header(CACHE_CONTROL, "no-cache")
                .header(PRAGMA, "no-cache");
        }

        let mut response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            let message: String = message.chars().take(200).collect();
            return Err(SignatureError::transport(format!(
                "HTTP {}: {}",
                status.as_u16(),
                message
            )));
        }

        if let Some(len) = response.content_length() {
            if len > self.max_body_bytes {
                return Err(SignatureError::transport(format!(
                    "response too large: {} bytes",
                    len
                )));
            }
        }

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let mut buf: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            SignatureError::transport(format!("failed to read response body: {}", e))
        })? {
            if (buf.len() + chunk.len()) as u64 > self.max_body_bytes {
                return Err(SignatureError::transport(format!(
                    "response too large: more than {} bytes",
                    self.max_body_bytes
                )));
            }
            buf.extend_from_slice(&chunk);
        }

        let body = String::from_utf8(buf)
            .map_err(|e| SignatureError::transport(format!("response is not UTF-8: {}", e)))?;

        debug!(url, status = status.as_u16(), bytes = body.len(), "fetched");
        Ok(Fetched { body, etag })
    }
}
