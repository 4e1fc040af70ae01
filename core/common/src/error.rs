//! Common error types for HexSeal.

use thiserror::Error;

/// Top-level error type for HexSeal operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Password does not satisfy the composition policy.
    #[error("Password policy violation: {0}")]
    PolicyViolation(String),

    /// Envelope text is structurally invalid.
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Decrypted buffer carries an invalid padding pattern.
    ///
    /// Wrong passwords and corrupted ciphertext both land here and are not
    /// distinguished.
    #[error("Decryption failed: wrong password or corrupted data")]
    Padding,

    /// Cryptographic precondition violated (key, IV, or block length).
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),
}

impl Error {
    /// Whether the caller may retry the operation with different input
    /// (a new password, typically) rather than abort.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::PolicyViolation(_) | Error::Padding)
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
