use ed25519_dalek::{Signature, Verifier, VerifyingKey};

use crate::error::{Result, TroopaError};

pub const SIGNATURE_HEADER: &str = "X-Signature-Ed25519";
pub const TIMESTAMP_HEADER: &str = "X-Signature-Timestamp";

/// Checks the ed25519 signature Discord puts on every interaction request
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    key: VerifyingKey,
}

impl SignatureVerifier {
    /// Create from the application's hex-encoded public key
    pub fn from_hex(public_key: &str) -> Result<Self> {
        let bytes: [u8; 32] = hex::decode(public_key.trim())
            .ok()
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| TroopaError::Config("discord public_key must be 64 hex digits".into()))?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| TroopaError::Config(format!("invalid discord public_key: {e}")))?;

        Ok(Self { key })
    }

    /// True if `signature` (hex) signs `timestamp || body`
    pub fn verify(&self, body: &[u8], signature: &str, timestamp: &str) -> bool {
        let Some(signature) = hex::decode(signature.trim())
            .ok()
            .and_then(|b| <[u8; 64]>::try_from(b).ok())
        else {
            return false;
        };
        let signature = Signature::from_bytes(&signature);

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key.verify(&message, &signature).is_ok()
    }
}
