//! Cipher context configuration.

use serde::{Deserialize, Serialize};

use crate::kdf::KdfParams;

/// How a cipher context chooses the salt for each encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaltMode {
    /// Fresh salt for every `encrypt` call.
    #[default]
    PerMessage,
    /// One salt generated when the context is created and reused by every
    /// `encrypt` call until [`crate::AesCipher::regenerate_salt`].
    PerContext,
}

/// Settings for an [`crate::AesCipher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CipherConfig {
    /// Key derivation parameters. Must match between encryption and
    /// decryption.
    pub kdf: KdfParams,
    /// Salt selection strategy for encryption.
    pub salt_mode: SaltMode,
}

impl CipherConfig {
    /// Standard derivation with the given salt mode.
    pub fn with_salt_mode(salt_mode: SaltMode) -> Self {
        Self {
            salt_mode,
            ..Self::default()
        }
    }
}
