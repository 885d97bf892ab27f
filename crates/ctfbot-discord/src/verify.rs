// Interaction signature verification
//
// Discord signs `timestamp || body` with the application's ed25519 key and
// sends the hex signature in `X-Signature-Ed25519`.

use ed25519_dalek::{Signature, Verifier, VerifyingKey, PUBLIC_KEY_LENGTH};
use thiserror::Error;

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerifyError {
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Malformed signature")]
    MalformedSignature,

    #[error("Signature does not match")]
    BadSignature,
}

/// Checks request signatures against the application's public key
#[derive(Debug, Clone)]
pub struct InteractionVerifier {
    key: VerifyingKey,
}

impl InteractionVerifier {
    /// Build from the hex public key shown in the developer portal
    pub fn from_hex(public_key: &str) -> Result<Self, VerifyError> {
        let bytes = hex::decode(public_key.trim())
            .map_err(|e| VerifyError::InvalidPublicKey(e.to_string()))?;
        let bytes: [u8; PUBLIC_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            VerifyError::InvalidPublicKey(format!("expected {} bytes", PUBLIC_KEY_LENGTH))
        })?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| VerifyError::InvalidPublicKey(e.to_string()))?;
        Ok(Self { key })
    }

    pub fn from_key(key: VerifyingKey) -> Self {
        Self { key }
    }

    pub fn verify(&self, signature: &str, timestamp: &str, body: &[u8]) -> Result<(), VerifyError> {
        let raw = hex::decode(signature.trim()).map_err(|_| VerifyError::MalformedSignature)?;
        let signature =
            Signature::from_slice(&raw).map_err(|_| VerifyError::MalformedSignature)?;

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key
            .verify(&message, &signature)
            .map_err(|_| VerifyError::BadSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[7u8; 32])
    }

    fn sign(key: &SigningKey, timestamp: &str, body: &[u8]) -> String {
        let mut message = timestamp.as_bytes().to_vec();
        message.extend_from_slice(body);
        hex::encode(key.sign(&message).to_bytes())
    }

    #[test]
    fn test_valid_signature() {
        let key = signing_key();
        let verifier =
            InteractionVerifier::from_hex(&hex::encode(key.verifying_key().to_bytes())).unwrap();
        let body = br#"{"type":1}"#;
        let signature = sign(&key, "1700000000", body);
        assert_eq!(verifier.verify(&signature, "1700000000", body), Ok(()));
    }

    #[test]
    fn test_tampered_body_rejected() {
        let key = signing_key();
        let verifier = InteractionVerifier::from_key(key.verifying_key());
        let signature = sign(&key, "1700000000", br#"{"type":1}"#);
        assert_eq!(
            verifier.verify(&signature, "1700000000", br#"{"type":2}"#),
            Err(VerifyError::BadSignature)
        );
    }

    #[test]
    fn test_timestamp_is_signed() {
        let key = signing_key();
        let verifier = InteractionVerifier::from_key(key.verifying_key());
        let signature = sign(&key, "1700000000", b"{}");
        assert_eq!(
            verifier.verify(&signature, "1700000001", b"{}"),
            Err(VerifyError::BadSignature)
        );
    }

    #[test]
    fn test_malformed_signature() {
        let verifier = InteractionVerifier::from_key(signing_key().verifying_key());
        assert_eq!(
            verifier.verify("zz", "1", b"{}"),
            Err(VerifyError::MalformedSignature)
        );
        assert_eq!(
            verifier.verify("abcd", "1", b"{}"),
            Err(VerifyError::MalformedSignature)
        );
    }

    #[test]
    fn test_invalid_public_key() {
        assert!(matches!(
            InteractionVerifier::from_hex("not-hex"),
            Err(VerifyError::InvalidPublicKey(_))
        ));
        assert!(matches!(
            InteractionVerifier::from_hex("abcd"),
            Err(VerifyError::InvalidPublicKey(_))
        ));
    }
}
