//! HMAC-SHA256 signatures over raw payload bytes.
//!
//! Senders sign the exact bytes they transmit with a shared secret and send the lowercase hex digest alongside the
//! payload. Digests are compared in constant time so that a forger cannot learn how many leading characters matched.
use hmac::{Hmac, Mac};
use inv_common::Secret;
use log::{trace, warn};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Error)]
pub enum SignatureError {
    #[error("The signing key cannot be used: {0}")]
    InvalidKey(String),
}

/// Calculates the lowercase hex HMAC-SHA256 digest of `payload` under `secret`.
pub fn sign(secret: &[u8], payload: &[u8]) -> Result<String, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|e| SignatureError::InvalidKey(e.to_string()))?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Compares an expected digest against one supplied by a caller. Surrounding whitespace and hex case in the supplied
/// digest are ignored.
pub fn verify(expected: &str, supplied: &str) -> bool {
    let supplied = supplied.trim().to_ascii_lowercase();
    constant_time_eq::constant_time_eq(expected.as_bytes(), supplied.as_bytes())
}

/// Holds the shared secret for a signed channel and checks payloads against it.
#[derive(Clone, Debug)]
pub struct SignatureVerifier {
    secret: Secret<String>,
}

impl SignatureVerifier {
    pub fn new(secret: Secret<String>) -> Self {
        Self { secret }
    }

    pub fn sign(&self, payload: &[u8]) -> Result<String, SignatureError> {
        sign(self.secret.reveal().as_bytes(), payload)
    }

    /// Returns `true` if `signature` is the correct digest of `payload`.
    pub fn verify(&self, payload: &[u8], signature: &str) -> Result<bool, SignatureError> {
        let expected = self.sign(payload)?;
        let valid = verify(&expected, signature);
        if valid {
            trace!("🔐️ Signature check ✅️");
        } else {
            warn!("🔐️ Signature check failed for a {} byte payload", payload.len());
        }
        Ok(valid)
    }
}
