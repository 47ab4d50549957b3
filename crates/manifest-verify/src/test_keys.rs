//! Runtime-generated RSA fixtures shared by the unit tests.

use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::signature::{SignatureEncoding, Signer};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

const TEST_KEY_BITS: usize = 1024;

pub(crate) struct FixtureKey {
    pub signing_key: SigningKey<Sha256>,
    pub public_key: RsaPublicKey,
    pub public_pem: String,
    pub spki_der: Vec<u8>,
}

impl FixtureKey {
    fn generate() -> Self {
        let private_key = RsaPrivateKey::new(&mut rand::thread_rng(), TEST_KEY_BITS)
            .expect("failed to generate RSA key");
        let public_key = private_key.to_public_key();
        let public_pem = public_key
            .to_public_key_pem(LineEnding::LF)
            .expect("failed to encode public key PEM");
        let spki_der = public_key
            .to_public_key_der()
            .expect("failed to encode public key DER")
            .as_bytes()
            .to_vec();

        Self {
            signing_key: SigningKey::<Sha256>::new(private_key),
            public_key,
            public_pem,
            spki_der,
        }
    }

    /// Base64 RSA-SHA256 signature over `message`.
    pub fn sign(&self, message: &[u8]) -> String {
        BASE64.encode(self.signing_key.sign(message).to_bytes())
    }
}

pub(crate) fn fixture_key() -> &'static FixtureKey {
    static KEY: OnceLock<FixtureKey> = OnceLock::new();
    KEY.get_or_init(FixtureKey::generate)
}

/// A second key, standing in for a rotated one.
pub(crate) fn other_fixture_key() -> &'static FixtureKey {
    static KEY: OnceLock<FixtureKey> = OnceLock::new();
    KEY.get_or_init(FixtureKey::generate)
}
