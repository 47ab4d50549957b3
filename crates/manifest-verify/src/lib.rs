//! Update manifest signature verification.
//!
//! Verifies RSA-SHA256 (PKCS#1 v1.5) manifest signatures against a public key
//! fetched from a remote endpoint, providing:
//!
//! - PEM public key decoding with armor/comment stripping
//! - Signature verification over the raw manifest bytes
//! - Cache-first key retrieval with exactly one forced refresh on failure
//! - An HTTP downloader with an on-disk response cache
//!
//! # Quick Start
//!
//! ```no_run
//! use manifest_verify::{verify_public_signature, HttpDownloader};
//!
//! # async fn example(manifest: &str, signature: &str) -> Result<(), manifest_verify::SignatureError> {
//! let downloader = HttpDownloader::from_env()?;
//!
//! if verify_public_signature(manifest, signature, &downloader).await? {
//!     println!("manifest is authentic");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! An `Err` means trust could not be determined (the key was unreachable or
//! unusable even after a refresh); it does not mean the signature is invalid.
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `MANIFEST_VERIFY_CACHE_DIR` | Response cache directory (default: platform cache dir) |
//! | `MANIFEST_VERIFY_TIMEOUT` | Request timeout in seconds (default: 30) |
//! | `MANIFEST_VERIFY_MAX_STALE` | Max age in seconds of a cached key (default: unlimited) |

pub mod cache;
pub mod downloader;
pub mod error;
pub mod key;
pub mod orchestrator;
pub mod types;
pub mod verify;

#[cfg(test)]
mod test_keys;

// Re-export main types
pub use cache::{CacheMeta, CachedResponse, ResponseCache};
pub use downloader::{Downloader, HttpDownloader, DOWNLOADER_USER_AGENT};
pub use error::{SignatureError, SignatureResult};
pub use key::{decode_public_key, strip_armor, PublicKeyMaterial, ARMOR_MARKER};
pub use orchestrator::{verify_public_signature, ManifestVerifier, PUBLIC_KEY_URL};
pub use types::{Attempt, DownloaderConfig, FetchDirective, SignatureRequest};
pub use verify::verify_signature;
