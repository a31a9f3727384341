//! Session token issuance and verification.
//!
//! Tokens are authenticated-encryption envelopes: the claims are serialized
//! to JSON, sealed with AES-256-GCM under a process-wide symmetric key, and
//! encoded as `v1.local.` + base64(nonce || ciphertext || tag). Any bit-level
//! tampering fails the authentication tag and the token is rejected. There is
//! no server-side session state; validity is the embedded expiry alone.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The length of the AES-256 key in bytes
pub const KEY_LENGTH: usize = 32;

/// The length of the AES-GCM nonce in bytes
const NONCE_LENGTH: usize = 12;

/// Version prefix identifying the envelope format
const TOKEN_PREFIX: &str = "v1.local.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid key size: must be exactly {KEY_LENGTH} bytes")]
    InvalidKeySize,
    #[error("token is invalid or expired")]
    InvalidToken,
    #[error("token is missing required claim: {0}")]
    MissingClaim(&'static str),
    #[error("failed to seal token: {0}")]
    Seal(String),
}

/// The authenticated claims carried inside a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub id: Uuid,
    pub subject: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Payload {
    /// Build a fresh payload for `subject` valid for `duration` from now.
    ///
    /// A non-positive duration is accepted and yields a payload that is
    /// already expired; verification of such a token fails with
    /// [`TokenError::InvalidToken`].
    pub fn new(subject: &str, duration: chrono::Duration) -> Self {
        let issued_at = Utc::now();
        Self {
            id: Uuid::new_v4(),
            subject: subject.to_string(),
            issued_at,
            expires_at: issued_at + duration,
        }
    }
}

/// Wire shape of the claim set. All fields are optional at this level so a
/// decrypted-but-foreign token surfaces a precise missing-claim error instead
/// of a deserialization failure.
#[derive(Debug, Serialize, Deserialize, Default)]
struct Claims {
    iat: Option<i64>,
    nbf: Option<i64>,
    exp: Option<i64>,
    id: Option<String>,
    sub: Option<String>,
}

/// Issues and verifies session tokens under a single symmetric key.
///
/// The key is fixed at construction and never rotated at runtime, so a maker
/// is freely shareable across request handlers.
pub struct TokenMaker {
    key: [u8; KEY_LENGTH],
}

impl TokenMaker {
    pub fn new(key: &[u8]) -> Result<Self, TokenError> {
        let key: [u8; KEY_LENGTH] = key.try_into().map_err(|_| TokenError::InvalidKeySize)?;
        Ok(Self { key })
    }

    /// Create a token asserting `subject` for `duration` from now.
    ///
    /// Returns the encoded token alongside the payload it carries.
    pub fn create_token(
        &self,
        subject: &str,
        duration: chrono::Duration,
    ) -> Result<(String, Payload), TokenError> {
        let payload = Payload::new(subject, duration);
        let claims = Claims {
            iat: Some(payload.issued_at.timestamp()),
            nbf: Some(payload.issued_at.timestamp()),
            exp: Some(payload.expires_at.timestamp()),
            id: Some(payload.id.to_string()),
            sub: Some(payload.subject.clone()),
        };

        let plaintext =
            serde_json::to_vec(&claims).map_err(|e| TokenError::Seal(e.to_string()))?;
        let token = self.seal(&plaintext)?;
        Ok((token, payload))
    }

    /// Decrypt and authenticate a token, returning its payload.
    ///
    /// Fails with [`TokenError::InvalidToken`] if the envelope is malformed,
    /// the authentication tag does not verify, or the token has expired.
    /// A token that decrypts but lacks a required claim fails with
    /// [`TokenError::MissingClaim`].
    pub fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        let plaintext = self.open(token)?;
        let claims: Claims =
            serde_json::from_slice(&plaintext).map_err(|_| TokenError::InvalidToken)?;

        let id = claims.id.ok_or(TokenError::MissingClaim("id"))?;
        let subject = claims.sub.ok_or(TokenError::MissingClaim("subject"))?;
        let iat = claims.iat.ok_or(TokenError::MissingClaim("issued_at"))?;
        let exp = claims.exp.ok_or(TokenError::MissingClaim("expiration"))?;

        let id = Uuid::parse_str(&id).map_err(|_| TokenError::InvalidToken)?;
        let issued_at = DateTime::from_timestamp(iat, 0).ok_or(TokenError::InvalidToken)?;
        let expires_at = DateTime::from_timestamp(exp, 0).ok_or(TokenError::InvalidToken)?;

        if Utc::now() >= expires_at {
            return Err(TokenError::InvalidToken);
        }

        Ok(Payload {
            id,
            subject,
            issued_at,
            expires_at,
        })
    }

    /// Encrypt `plaintext` into the `v1.local.` envelope with a random nonce.
    fn seal(&self, plaintext: &[u8]) -> Result<String, TokenError> {
        use rand::RngCore;

        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let cipher =
            Aes256Gcm::new_from_slice(&self.key).map_err(|e| TokenError::Seal(e.to_string()))?;
        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| TokenError::Seal(e.to_string()))?;

        let mut combined = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(format!("{}{}", TOKEN_PREFIX, BASE64.encode(&combined)))
    }

    /// Decrypt the envelope, failing uniformly with `InvalidToken` so a
    /// caller probing the boundary cannot distinguish malformed input from a
    /// failed authentication tag.
    fn open(&self, token: &str) -> Result<Vec<u8>, TokenError> {
        let encoded = token
            .strip_prefix(TOKEN_PREFIX)
            .ok_or(TokenError::InvalidToken)?;
        let combined = BASE64.decode(encoded).map_err(|_| TokenError::InvalidToken)?;
        if combined.len() < NONCE_LENGTH + 1 {
            return Err(TokenError::InvalidToken);
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LENGTH);
        let nonce = Nonce::from_slice(nonce_bytes);

        let cipher =
            Aes256Gcm::new_from_slice(&self.key).map_err(|_| TokenError::InvalidToken)?;
        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| TokenError::InvalidToken)
    }
}
