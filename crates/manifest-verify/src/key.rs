//! PEM public key decoding.
//!
//! The key endpoint serves a PEM document which may carry comment lines next
//! to the armor. Every line containing [`ARMOR_MARKER`] is dropped before the
//! base64 body is decoded, so a comment that happens to contain the marker is
//! dropped as well.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use rsa::pkcs8::DecodePublicKey;
use rsa::RsaPublicKey;

use crate::error::{SignatureError, SignatureResult};

/// Lines containing this substring are treated as armor and removed.
pub const ARMOR_MARKER: &str = "PUBLIC KEY-----";

/// Standard alphabet, padding optional.
pub(crate) const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A decoded RSA public key together with the material it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyMaterial {
    /// PEM text as fetched.
    pub raw_pem: String,

    /// SubjectPublicKeyInfo DER bytes.
    pub der: Vec<u8>,

    /// Parsed key handle.
    pub key: RsaPublicKey,
}

/// Decode a PEM-armored RSA public key.
pub fn decode_public_key(pem: &str) -> SignatureResult<PublicKeyMaterial> {
    let body = strip_armor(pem);
    let der = decode_base64(&body)
        .map_err(|e| SignatureError::decode(format!("invalid base64 public key: {}", e)))?;

    if der.is_empty() {
        return Err(SignatureError::decode("public key payload is empty"));
    }

    let key = RsaPublicKey::from_public_key_der(&der)
        .map_err(|e| SignatureError::key_parse(format!("invalid SPKI public key: {}", e)))?;

    Ok(PublicKeyMaterial {
        raw_pem: pem.to_string(),
        der,
        key,
    })
}

/// Remove armor lines, keeping the rest joined with `\n`.
pub fn strip_armor(pem: &str) -> String {
    let mut body = String::with_capacity(pem.len());
    for line in pem.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.contains(ARMOR_MARKER) {
            continue;
        }
        body.push_str(line);
        body.push('\n');
    }
    body
}

/// Base64-decode, ignoring line breaks and other ASCII whitespace.
pub(crate) fn decode_base64(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    LENIENT_BASE64.decode(compact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_keys::{fixture_key, other_fixture_key};
    use base64::engine::general_purpose::STANDARD as BASE64;

    #[test]
    fn test_decode_lf_pem() {
        let fixture = fixture_key();
        let material = decode_public_key(&fixture.public_pem).unwrap();
        assert_eq!(material.key, fixture.public_key);
        assert_eq!(material.raw_pem, fixture.public_pem);
    }

    #[test]
    fn test_decode_crlf_pem() {
        let fixture = fixture_key();
        let crlf = fixture.public_pem.replace('\n', "\r\n");
        let material = decode_public_key(&crlf).unwrap();
        assert_eq!(material.key, fixture.public_key);
    }

    #[test]
    fn test_crlf_and_lf_yield_same_der() {
        let fixture = other_fixture_key();
        let lf = decode_public_key(&fixture.public_pem).unwrap();
        let crlf = decode_public_key(&fixture.public_pem.replace('\n', "\r\n")).unwrap();
        assert_eq!(lf.der, crlf.der);
    }

    #[test]
    fn test_blank_lines_are_tolerated() {
        let fixture = fixture_key();
        let padded = format!("\n\n{}\n\n", fixture.public_pem);
        assert!(decode_public_key(&padded).is_ok());
    }

    #[test]
    fn test_strip_armor_drops_marker_lines_only() {
        let pem = "-----BEGIN PUBLIC KEY-----\r\nAAAA\r\nBBBB\r\n-----END PUBLIC KEY-----\r\n";
        assert_eq!(strip_armor(pem), "AAAA\nBBBB\n\n");
    }

    #[test]
    fn test_comment_with_marker_is_dropped() {
        let fixture = fixture_key();
        let commented = format!("# rotated, see PUBLIC KEY----- notes\n{}", fixture.public_pem);
        let stripped = strip_armor(&commented);
        assert!(!stripped.contains("rotated"));
        assert!(decode_public_key(&commented).is_ok());
    }

    #[test]
    fn test_unarmored_body_decodes() {
        let fixture = fixture_key();
        let body = BASE64.encode(&fixture.spki_der);
        let material = decode_public_key(&body).unwrap();
        assert_eq!(material.der, fixture.spki_der);
    }

    #[test]
    fn test_malformed_base64_is_decode_error() {
        let pem = "-----BEGIN PUBLIC KEY-----\nnot*valid*base64!!\n-----END PUBLIC KEY-----\n";
        let result = decode_public_key(pem);
        assert!(matches!(result, Err(SignatureError::Decode { .. })));
    }

    #[test]
    fn test_empty_payload_is_decode_error() {
        let pem = "-----BEGIN PUBLIC KEY-----\n-----END PUBLIC KEY-----\n";
        let result = decode_public_key(pem);
        assert!(matches!(result, Err(SignatureError::Decode { .. })));
    }

    #[test]
    fn test_non_rsa_der_is_key_parse_error() {
        let pem = format!(
            "-----BEGIN PUBLIC KEY-----\n{}\n-----END PUBLIC KEY-----\n",
            BASE64.encode(b"definitely not a SubjectPublicKeyInfo")
        );
        let result = decode_public_key(&pem);
        assert!(matches!(result, Err(SignatureError::KeyParse { .. })));
    }

    #[test]
    fn test_ed25519_spki_is_key_parse_error() {
        // SubjectPublicKeyInfo with the id-Ed25519 algorithm (1.3.101.112).
        let mut der = vec![
            0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
        ];
        der.extend_from_slice(&[0x42; 32]);
        let pem = format!(
            "-----BEGIN PUBLIC KEY-----\n{}\n-----END PUBLIC KEY-----\n",
            BASE64.encode(&der)
        );

        let result = decode_public_key(&pem);
        assert!(matches!(result, Err(SignatureError::KeyParse { .. })));
    }

    #[test]
    fn test_truncated_der_is_key_parse_error() {
        let fixture = fixture_key();
        let truncated = &fixture.spki_der[..fixture.spki_der.len() / 2];
        let result = decode_public_key(&BASE64.encode(truncated));
        assert!(matches!(result, Err(SignatureError::KeyParse { .. })));
    }
}
