//! Error types for manifest signature verification.

/// Signature verification errors.
///
/// Every variant takes part in the single forced-refresh retry; only the
/// error from the final attempt reaches the caller.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    /// Fetching the public key failed.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// PEM armor or base64 payload is malformed.
    #[error("public key decode failed: {message}")]
    Decode { message: String },

    /// Decoded bytes are not an RSA SubjectPublicKeyInfo.
    #[error("invalid RSA public key: {message}")]
    KeyParse { message: String },

    /// Signature bytes are malformed or the key cannot verify them.
    #[error("signature verification error: {message}")]
    Verify { message: String },
}

impl SignatureError {
    pub(crate) fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub(crate) fn key_parse(message: impl Into<String>) -> Self {
        Self::KeyParse {
            message: message.into(),
        }
    }

    pub(crate) fn verify(message: impl Into<String>) -> Self {
        Self::Verify {
            message: message.into(),
        }
    }

    /// Stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Decode { .. } => "decode",
            Self::KeyParse { .. } => "key_parse",
            Self::Verify { .. } => "verify",
        }
    }

    /// Whether the key could not be retrieved at all.
    pub fn is_network_error(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Whether the fetched key material itself was unusable.
    pub fn is_decode_class(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::KeyParse { .. })
    }
}

impl From<reqwest::Error> for SignatureError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }
}

/// Result type for signature operations.
pub type SignatureResult<T> = Result<T, SignatureError>;
