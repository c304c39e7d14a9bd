//! Cryptographic utilities for signing bsvalias requests

/// Sender signatures over canonical request fields
pub mod signature {
    use crate::types::SignableRequest;
    use crate::{BsvaliasError, Result};
    use base64::{engine::general_purpose, Engine as _};
    use bitcoin::hashes::{sha256d, Hash};
    use bitcoin::sign_message::{signed_msg_hash, MessageSignature};
    use secp256k1::{Message, Secp256k1, SecretKey};

    /// Hash a canonical request message with the Bitcoin signed message
    /// prefix. Signed requests must name a sender handle, since the
    /// counterparty resolves the verifying key through it.
    pub fn signature_hash<R: SignableRequest>(request: &R) -> Result<sha256d::Hash> {
        if request.sender_handle().is_empty() {
            return Err(BsvaliasError::signing(
                "signature hash",
                "sender handle is required for signed requests",
            ));
        }

        Ok(signed_msg_hash(&request.signing_message()))
    }

    /// A key able to sign a signature hash and encode the result for transport
    pub trait SigningKey: Send + Sync {
        fn sign_hash(&self, hash: &sha256d::Hash) -> Result<String>;
    }

    impl SigningKey for bitcoin::PrivateKey {
        fn sign_hash(&self, hash: &sha256d::Hash) -> Result<String> {
            sign_hash_with(&self.inner, self.compressed, hash)
        }
    }

    impl SigningKey for SecretKey {
        fn sign_hash(&self, hash: &sha256d::Hash) -> Result<String> {
            sign_hash_with(self, true, hash)
        }
    }

    /// Sign with a secp256k1 key, returning the base64 compact recoverable
    /// signature
    fn sign_hash_with(key: &SecretKey, compressed: bool, hash: &sha256d::Hash) -> Result<String> {
        let secp = Secp256k1::signing_only();
        let message = Message::from_digest(hash.to_byte_array());
        let signature = secp.sign_ecdsa_recoverable(&message, key);

        let signature = MessageSignature::new(signature, compressed);
        Ok(general_purpose::STANDARD.encode(signature.serialize()))
    }

    /// Whether and how a request gets signed. Chosen once per call.
    #[derive(Clone, Copy)]
    pub enum Signer<'a> {
        /// Unauthenticated request, signature left empty
        Anonymous,
        /// Request signed by the sender's key
        Key(&'a dyn SigningKey),
    }

    impl<'a> Signer<'a> {
        pub fn from_key(key: Option<&'a dyn SigningKey>) -> Self {
            match key {
                Some(key) => Self::Key(key),
                None => Self::Anonymous,
            }
        }

        pub fn is_signed(&self) -> bool {
            matches!(self, Self::Key(_))
        }

        /// Sign the request in place. The anonymous signer leaves it untouched.
        pub fn apply<R: SignableRequest>(&self, request: &mut R) -> Result<()> {
            let key = match self {
                Self::Anonymous => return Ok(()),
                Self::Key(key) => key,
            };

            let hash = signature_hash(request)?;
            let signature = key
                .sign_hash(&hash)
                .map_err(|e| BsvaliasError::signing("sign", e))?;

            request.set_signature(signature);
            Ok(())
        }
    }

    impl std::fmt::Debug for Signer<'_> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::Anonymous => f.write_str("Anonymous"),
                Self::Key(_) => f.write_str("Key(<redacted>)"),
            }
        }
    }

    /// Verify a request signature against the sender's public key
    pub fn verify_request<R: SignableRequest>(
        request: &R,
        signature: &str,
        public_key: &bitcoin::PublicKey,
    ) -> Result<bool> {
        verify_message(&request.signing_message(), signature, public_key)
    }

    /// Verify a base64 message signature against a public key
    pub fn verify_message(
        message: &str,
        signature: &str,
        public_key: &bitcoin::PublicKey,
    ) -> Result<bool> {
        let decoded = general_purpose::STANDARD
            .decode(signature)
            .map_err(|e| BsvaliasError::invalid_signature(format!("invalid base64: {}", e)))?;
        let signature = MessageSignature::from_slice(&decoded)
            .map_err(|e| BsvaliasError::invalid_signature(e.to_string()))?;

        let secp = Secp256k1::verification_only();
        let recovered = signature
            .recover_pubkey(&secp, signed_msg_hash(message))
            .map_err(|e| BsvaliasError::invalid_signature(e.to_string()))?;

        Ok(recovered == *public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::signature::*;
    use crate::types::{PaymentDestinationBody, PaymentRequestBody, Sender, SignableRequest};
    use crate::BsvaliasError;
    use bitcoin::hashes::sha256d;
    use chrono::{TimeZone, Utc};
    use secp256k1::{Secp256k1, SecretKey};

    fn test_key() -> bitcoin::PrivateKey {
        let secret = SecretKey::from_slice(&[0x11; 32]).unwrap();
        bitcoin::PrivateKey::new(secret, bitcoin::Network::Bitcoin)
    }

    fn test_body() -> PaymentDestinationBody {
        let dt = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        PaymentDestinationBody::new(&Sender::new("Bob", "bob@example.com"), dt, 1000, "lunch")
    }

    struct FailingKey;

    impl SigningKey for FailingKey {
        fn sign_hash(&self, _hash: &sha256d::Hash) -> crate::Result<String> {
            Err(BsvaliasError::invalid_signature("hardware signer unavailable"))
        }
    }

    #[test]
    fn test_anonymous_signer_leaves_signature_empty() {
        let mut body = test_body();
        Signer::Anonymous.apply(&mut body).unwrap();
        assert!(body.signature.is_empty());
        assert!(!Signer::from_key(None).is_signed());
    }

    #[test]
    fn test_signature_is_deterministic_and_verifies() {
        let key = test_key();
        let public_key = key.public_key(&Secp256k1::new());

        let mut first = test_body();
        let mut second = test_body();
        Signer::Key(&key).apply(&mut first).unwrap();
        Signer::Key(&key).apply(&mut second).unwrap();

        assert!(!first.signature.is_empty());
        assert_eq!(first.signature, second.signature);
        assert!(verify_request(&first, &first.signature, &public_key).unwrap());
    }

    #[test]
    fn test_field_order_changes_hash() {
        let key = test_key();
        let public_key = key.public_key(&Secp256k1::new());
        let mut body = test_body();
        Signer::Key(&key).apply(&mut body).unwrap();

        let reordered = format!(
            "{}{}{}{}",
            body.date_time, body.sender_handle, body.amount, body.purpose
        );
        assert_ne!(reordered, body.signing_message());
        assert!(!verify_message(&reordered, &body.signature, &public_key).unwrap());
    }

    #[test]
    fn test_asset_id_is_signed() {
        let key = test_key();
        let public_key = key.public_key(&Secp256k1::new());
        let dt = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let sender = Sender::new("Bob", "bob@example.com");

        let mut body = PaymentRequestBody::new(&sender, dt, "BSV", 1000, "lunch");
        Signer::Key(&key).apply(&mut body).unwrap();
        assert!(verify_request(&body, &body.signature, &public_key).unwrap());

        let tampered = PaymentRequestBody::new(&sender, dt, "", 1000, "lunch");
        assert!(!verify_request(&tampered, &body.signature, &public_key).unwrap());
    }

    #[test]
    fn test_signing_failure_is_wrapped() {
        let mut body = test_body();
        let err = Signer::Key(&FailingKey).apply(&mut body).unwrap_err();

        assert_eq!(err.stage(), Some("sign"));
        assert!(body.signature.is_empty());
    }

    #[test]
    fn test_signature_hash_requires_handle() {
        let key = test_key();
        let dt = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let mut body = PaymentDestinationBody::new(&Sender::new("Bob", ""), dt, 1, "x");

        let err = Signer::Key(&key).apply(&mut body).unwrap_err();
        assert_eq!(err.stage(), Some("signature hash"));
    }

    #[test]
    fn test_verify_rejects_garbage_signature() {
        let public_key = test_key().public_key(&Secp256k1::new());
        let result = verify_message("hello", "not base64!", &public_key);
        assert!(matches!(result, Err(BsvaliasError::InvalidSignature { .. })));
    }
}
