//! Fetch-and-verify with a single forced refresh.
//!
//! The first attempt lets the downloader answer from its cache. Any failure
//! (transport, decode, key parse or a malformed signature) triggers one more
//! attempt with [`FetchDirective::ForceNetwork`], in case the key was rotated
//! since it was cached. A clean `true`/`false` from either attempt is final,
//! so a cached key that cleanly rejects the signature is not refreshed.

use tracing::{debug, info, warn};

use crate::downloader::Downloader;
use crate::error::SignatureResult;
use crate::key::decode_public_key;
use crate::types::{Attempt, SignatureRequest};
use crate::verify::verify_signature;

/// Endpoint serving the manifest signing key.
pub const PUBLIC_KEY_URL: &str = "https://exp.host/--/manifest-public-key";

/// Verify `cipher_text` over `plain_text` with the key at [`PUBLIC_KEY_URL`].
pub async fn verify_public_signature<D>(
    plain_text: &str,
    cipher_text: &str,
    downloader: &D,
) -> SignatureResult<bool>
where
    D: Downloader + ?Sized,
{
    let request = SignatureRequest::new(plain_text, cipher_text);
    verify_with_refresh(downloader, PUBLIC_KEY_URL, &request).await
}

/// Reusable verifier bound to a downloader and key URL.
#[derive(Debug, Clone)]
pub struct ManifestVerifier<D> {
    downloader: D,
    public_key_url: String,
}

impl<D: Downloader> ManifestVerifier<D> {
    pub fn new(downloader: D) -> Self {
        Self {
            downloader,
            public_key_url: PUBLIC_KEY_URL.to_string(),
        }
    }

    /// Use a different key endpoint.
    pub fn with_public_key_url(mut self, url: impl Into<String>) -> Self {
        self.public_key_url = url.into();
        self
    }

    pub fn public_key_url(&self) -> &str {
        &self.public_key_url
    }

    pub fn downloader(&self) -> &D {
        &self.downloader
    }

    pub async fn verify_public_signature(
        &self,
        plain_text: &str,
        cipher_text: &str,
    ) -> SignatureResult<bool> {
        self.verify(&SignatureRequest::new(plain_text, cipher_text))
            .await
    }

    pub async fn verify(&self, request: &SignatureRequest) -> SignatureResult<bool> {
        verify_with_refresh(&self.downloader, &self.public_key_url, request).await
    }
}

/// After a double failure the second attempt's error is returned; the first
/// one is only logged.
async fn verify_with_refresh<D>(
    downloader: &D,
    url: &str,
    request: &SignatureRequest,
) -> SignatureResult<bool>
where
    D: Downloader + ?Sized,
{
    let mut attempt = Attempt::First;

    loop {
        let result = attempt_once(downloader, url, request, attempt).await;

        let err = match result {
            Ok(valid) => {
                debug!(valid, attempt = attempt.number(), "signature verification finished");
                return Ok(valid);
            }
            Err(err) => err,
        };

        match attempt.next() {
            Some(next) => {
                warn!(
                    attempt = attempt.number(),
                    kind = err.kind(),
                    error = %err,
                    "public key attempt failed"
                );
                info!(url, "refetching public key without cache");
                attempt = next;
            }
            None => return Err(err),
        }
    }
}

async fn attempt_once<D>(
    downloader: &D,
    url: &str,
    request: &SignatureRequest,
    attempt: Attempt,
) -> SignatureResult<bool>
where
    D: Downloader + ?Sized,
{
    let pem = downloader.fetch(url, attempt.directive()).await?;
    let key = decode_public_key(&pem)?;
    verify_signature(&key, &request.plain_text, &request.cipher_text)
}
