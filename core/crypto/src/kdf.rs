//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! The iteration count is the only cost knob. It is not recorded in the
//! envelope, so both sides of an exchange must agree on it out of band.

use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::keys::{DerivedKey, Salt, KEY_LENGTH};
use hexseal_common::{Error, Result};

/// Iteration count used by the standard envelope format.
pub const STANDARD_ITERATIONS: u32 = 100_000;

/// Parameters for PBKDF2 key derivation.
///
/// Deserialization goes through [`KdfParams::new`], so a zero iteration
/// count is rejected on load as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawKdfParams")]
pub struct KdfParams {
    iterations: u32,
}

#[derive(Deserialize)]
struct RawKdfParams {
    iterations: u32,
}

impl TryFrom<RawKdfParams> for KdfParams {
    type Error = Error;

    fn try_from(raw: RawKdfParams) -> Result<Self> {
        Self::new(raw.iterations)
    }
}

impl KdfParams {
    /// Parameters of the standard envelope format (100 000 iterations).
    pub fn standard() -> Self {
        Self {
            iterations: STANDARD_ITERATIONS,
        }
    }

    /// Create parameters with a custom iteration count.
    ///
    /// Envelopes produced with a non-standard count can only be opened with
    /// the same count.
    ///
    /// # Errors
    /// - Returns error if `iterations` is zero
    pub fn new(iterations: u32) -> Result<Self> {
        if iterations == 0 {
            return Err(Error::InvalidInput(
                "KDF iteration count must be positive".to_string(),
            ));
        }
        Ok(Self { iterations })
    }

    /// Number of HMAC-SHA256 iterations.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::standard()
    }
}

/// Derive a key from a password and salt using PBKDF2-HMAC-SHA256.
///
/// # Postconditions
/// - Returns a KEY_LENGTH-byte key that zeroizes on drop
/// - The derived key is deterministic given the same inputs
///
/// # Security
/// - Password is not stored or logged
pub fn derive_key(password: &[u8], salt: &Salt, params: &KdfParams) -> DerivedKey {
    let mut key_bytes = [0u8; KEY_LENGTH];
    fill_key(password, salt.as_bytes(), params.iterations, &mut key_bytes);
    DerivedKey::from_bytes(key_bytes)
}

/// Derive a key from a raw salt slice.
///
/// # Errors
/// - `InvalidInput` if the salt is not SALT_LENGTH bytes
pub fn derive_key_from_slice(password: &[u8], salt: &[u8], params: &KdfParams) -> Result<DerivedKey> {
    let salt = Salt::from_slice(salt)?;
    Ok(derive_key(password, &salt, params))
}

fn fill_key(password: &[u8], salt: &[u8], iterations: u32, out: &mut [u8; KEY_LENGTH]) {
    pbkdf2_hmac::<Sha256>(password, salt, iterations, out);
}
