//! Cryptographic core for HexSeal.
//!
//! This module provides:
//! - Password composition policy
//! - Key derivation using PBKDF2-HMAC-SHA256
//! - AES-256-CFB encryption with PKCS#7 padding
//! - The hex envelope codec (`salt || iv || ciphertext`)
//! - [`AesCipher`], the password-bound context that ties them together
//!
//! # Security Guarantees
//! - Derived keys and passwords are zeroized on drop
//! - No plaintext or key material is ever logged
//!
//! Envelopes carry no authentication tag. Padding validation rejects most
//! wrong passwords, but it is not an integrity check: in CFB mode a
//! corrupted data byte in the final block decrypts silently to a changed
//! plaintext byte. See [`cipher`] for which corruptions are caught.

pub mod cipher;
pub mod config;
pub mod context;
pub mod envelope;
pub mod kdf;
pub mod keys;
pub mod policy;

pub use config::{CipherConfig, SaltMode};
pub use context::AesCipher;
pub use envelope::Envelope;
pub use kdf::{derive_key, KdfParams};
pub use keys::{DerivedKey, Iv, Salt};
pub use policy::validate_password;
