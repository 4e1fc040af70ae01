//! Password-bound cipher context.
//!
//! [`AesCipher`] is the only entry point callers need: it owns the password
//! and random source, and hides salts, IVs and derived keys behind
//! `encrypt`/`decrypt` on envelope text.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::cipher;
use crate::config::{CipherConfig, SaltMode};
use crate::envelope;
use crate::kdf::derive_key;
use crate::keys::{Iv, Salt};
use hexseal_common::{Error, Password, Result};

/// Envelope cipher bound to one password.
///
/// The random source sits behind a mutex, so a context can be shared across
/// threads; derivation and encryption run outside the lock.
pub struct AesCipher<R = OsRng> {
    password: Password,
    config: CipherConfig,
    salt: Salt,
    rng: Mutex<R>,
}

impl AesCipher<OsRng> {
    /// Create a context with the standard configuration and the OS random
    /// source.
    pub fn new(password: impl Into<Password>) -> Self {
        Self::with_config(password, CipherConfig::default())
    }

    /// Create a context with a custom configuration and the OS random
    /// source.
    pub fn with_config(password: impl Into<Password>, config: CipherConfig) -> Self {
        Self::with_rng(password, config, OsRng)
    }
}

impl<R: RngCore + CryptoRng> AesCipher<R> {
    /// Create a context drawing salts and IVs from `rng`.
    pub fn with_rng(password: impl Into<Password>, config: CipherConfig, mut rng: R) -> Self {
        let salt = Salt::generate(&mut rng);
        Self {
            password: password.into(),
            config,
            salt,
            rng: Mutex::new(rng),
        }
    }

    /// Configuration of this context.
    pub fn config(&self) -> &CipherConfig {
        &self.config
    }

    /// Salt selection strategy of this context.
    pub fn salt_mode(&self) -> SaltMode {
        self.config.salt_mode
    }

    /// Replace the context salt used in [`SaltMode::PerContext`].
    pub fn regenerate_salt(&mut self) {
        let rng = self.rng.get_mut().unwrap_or_else(PoisonError::into_inner);
        self.salt = Salt::generate(rng);
    }

    /// Encrypt `plaintext` into envelope text.
    ///
    /// # Postconditions
    /// - A fresh IV is drawn for every call
    /// - The salt is fresh per call or the context salt, per [`SaltMode`]
    /// - Output length is `64 + 2 * padded_len(plaintext.len())`
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String> {
        let (salt, iv) = {
            let mut rng = self.lock_rng();
            let salt = match self.config.salt_mode {
                SaltMode::PerMessage => Salt::generate(&mut *rng),
                SaltMode::PerContext => self.salt.clone(),
            };
            (salt, Iv::generate(&mut *rng))
        };

        let key = derive_key(self.password.as_bytes(), &salt, &self.config.kdf);
        let ciphertext = cipher::encrypt(plaintext, key.as_bytes(), iv.as_bytes())?;

        debug!(
            plaintext_len = plaintext.len(),
            ciphertext_len = ciphertext.len(),
            "Encrypted envelope"
        );
        Ok(envelope::encode(&salt, &iv, &ciphertext))
    }

    /// Decrypt envelope text.
    ///
    /// The salt and IV are taken from the envelope; the context salt is not
    /// consulted.
    ///
    /// # Errors
    /// - `MalformedEnvelope` if the text is not a valid envelope
    /// - `Crypto` if the ciphertext segment is not block aligned
    /// - `Padding` on a wrong password or when corruption reaches the
    ///   padding bytes. A wrong password occasionally passes the check and
    ///   yields garbage; a corrupted data byte in the final block always
    ///   passes and yields a changed plaintext.
    pub fn decrypt(&self, envelope: &str) -> Result<Vec<u8>> {
        let envelope = envelope::decode(envelope)?;
        let key = derive_key(self.password.as_bytes(), &envelope.salt, &self.config.kdf);
        let plaintext = cipher::decrypt(&envelope.ciphertext, key.as_bytes(), envelope.iv.as_bytes())?;

        debug!(plaintext_len = plaintext.len(), "Decrypted envelope");
        Ok(plaintext)
    }

    /// Decrypt envelope text holding a UTF-8 payload.
    ///
    /// # Errors
    /// - As [`AesCipher::decrypt`], plus `InvalidInput` if the payload is
    ///   not valid UTF-8
    pub fn decrypt_to_string(&self, envelope: &str) -> Result<String> {
        let plaintext = self.decrypt(envelope)?;
        String::from_utf8(plaintext)
            .map_err(|_| Error::InvalidInput("Decrypted data is not valid UTF-8".to_string()))
    }

    fn lock_rng(&self) -> MutexGuard<'_, R> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R> fmt::Debug for AesCipher<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesCipher")
            .field("password", &self.password)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
