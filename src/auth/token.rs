//! Session token codec.
//!
//! A token is `base64(nonce || AES-256-GCM(plaintext))` without padding, where
//! the plaintext is an 8-byte big-endian unix-seconds issue time followed by
//! the raw UTF-8 subject. The AEAD tag makes tampering detectable; the issue
//! time makes expiry a plain boolean outcome rather than an error.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use chrono::Utc;
use rand::RngCore;
use thiserror::Error;

use crate::auth::key::SecretKey;

pub const TOKEN_TTL_SECS: i64 = 3 * 24 * 60 * 60;

const NONCE_LEN: usize = 12;
const ISSUED_AT_LEN: usize = 8;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("token is too short")]
    Truncated,

    #[error("token failed authentication")]
    Tampered,

    #[error("token payload is malformed")]
    Malformed,

    #[error("failed to seal token")]
    Seal,
}

/// What a successfully authenticated token carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub subject: String,
    pub issued_at: i64,
    pub expired: bool,
}

#[derive(Clone)]
pub struct TokenCodec {
    cipher: Aes256Gcm,
}

impl TokenCodec {
    pub fn new(key: &SecretKey) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
        Self { cipher }
    }

    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now().timestamp())
    }

    pub fn issue_at(&self, subject: &str, now: i64) -> Result<String, TokenError> {
        let mut plaintext = Vec::with_capacity(ISSUED_AT_LEN + subject.len());
        plaintext.extend_from_slice(&(now as u64).to_be_bytes());
        plaintext.extend_from_slice(subject.as_bytes());

        let mut nonce = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce);

        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_slice())
            .map_err(|_| TokenError::Seal)?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(STANDARD_NO_PAD.encode(out))
    }

    pub fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    pub fn validate_at(&self, token: &str, now: i64) -> Result<TokenClaims, TokenError> {
        let data = STANDARD_NO_PAD.decode(token)?;
        if data.len() < NONCE_LEN {
            return Err(TokenError::Truncated);
        }

        let (nonce, sealed) = data.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| TokenError::Tampered)?;

        if plaintext.len() < ISSUED_AT_LEN {
            return Err(TokenError::Malformed);
        }
        let (issued_at, subject) = plaintext.split_at(ISSUED_AT_LEN);
        let issued_at = u64::from_be_bytes(issued_at.try_into().map_err(|_| TokenError::Malformed)?);
        let issued_at = i64::try_from(issued_at).map_err(|_| TokenError::Malformed)?;
        let subject = String::from_utf8(subject.to_vec()).map_err(|_| TokenError::Malformed)?;

        Ok(TokenClaims {
            subject,
            issued_at,
            expired: now - issued_at > TOKEN_TTL_SECS,
        })
    }
}
