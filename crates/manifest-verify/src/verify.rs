//! RSA-SHA256 (PKCS#1 v1.5) signature check.

use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::signature::Verifier;
use rsa::traits::PublicKeyParts;
use sha2::Sha256;
use tracing::debug;

use crate::error::{SignatureError, SignatureResult};
use crate::key::{decode_base64, PublicKeyMaterial};

/// Verify a base64 signature over `plain_text`.
///
/// Returns `Ok(false)` when the signature is well-formed but does not match.
/// Malformed signatures (bad base64, empty, or not exactly one modulus long)
/// are errors rather than `false`.
pub fn verify_signature(
    key: &PublicKeyMaterial,
    plain_text: &[u8],
    signature_b64: &str,
) -> SignatureResult<bool> {
    let sig_bytes = decode_base64(signature_b64)
        .map_err(|e| SignatureError::verify(format!("invalid base64 signature: {}", e)))?;

    let modulus_len = key.key.size();
    if sig_bytes.len() != modulus_len {
        return Err(SignatureError::verify(format!(
            "signature length {} does not match key size {}",
            sig_bytes.len(),
            modulus_len
        )));
    }

    let signature = Signature::try_from(sig_bytes.as_slice())
        .map_err(|e| SignatureError::verify(format!("malformed signature: {}", e)))?;

    let verifying_key = VerifyingKey::<Sha256>::new(key.key.clone());
    let valid = verifying_key.verify(plain_text, &signature).is_ok();

    debug!(valid, bytes = plain_text.len(), "signature checked");
    Ok(valid)
}
