use std::fmt;

use crate::config::ConfigError;

pub const SECRET_KEY_LEN: usize = 32;

/// 256-bit symmetric key used to seal session tokens.
///
/// Loaded once at startup from the hex-encoded `secret` config value and never
/// changed afterwards.
#[derive(Clone)]
pub struct SecretKey([u8; SECRET_KEY_LEN]);

impl SecretKey {
    pub fn from_hex(secret: &str) -> Result<Self, ConfigError> {
        let bytes = hex::decode(secret.trim())
            .map_err(|e| ConfigError::InvalidSecret(e.to_string()))?;
        let key: [u8; SECRET_KEY_LEN] = bytes.try_into().map_err(|b: Vec<u8>| {
            ConfigError::InvalidSecret(format!(
                "expected {} bytes, got {}",
                SECRET_KEY_LEN,
                b.len()
            ))
        })?;
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_LEN] {
        &self.0
    }
}

impl From<[u8; SECRET_KEY_LEN]> for SecretKey {
    fn from(bytes: [u8; SECRET_KEY_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}
