//! Shared fixtures for integration tests.

#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha2::Sha256;
use tracing_subscriber::EnvFilter;

pub const MANIFEST: &str = r#"{"id":"0754dad0-d200-d634-113c-ef1f26106028","createdAt":"2020-11-11T00:17:54.797Z","runtimeVersion":"1.0","launchAsset":{"url":"https://example.test/bundle.js"}}"#;

pub struct TestKey {
    signing_key: SigningKey<Sha256>,
    pub public_pem: String,
}

impl TestKey {
    pub fn generate() -> Self {
        let private_key =
            RsaPrivateKey::new(&mut rand::thread_rng(), 1024).expect("failed to generate RSA key");
        let public_pem = private_key
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .expect("failed to encode public key");

        Self {
            signing_key: SigningKey::<Sha256>::new(private_key),
            public_pem,
        }
    }

    pub fn sign(&self, message: &str) -> String {
        BASE64.encode(self.signing_key.sign(message.as_bytes()).to_bytes())
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
