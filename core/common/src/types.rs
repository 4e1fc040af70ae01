//! Secret types used throughout HexSeal.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// User-supplied password.
///
/// Held only for the lifetime of a cipher context; the backing memory is
/// zeroized on drop and never printed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Password(String);

impl Password {
    /// Wrap a password string.
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Get the password as text.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the UTF-8 bytes fed to key derivation.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Password {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_bytes() {
        let password = Password::new("Secur3!Pass");
        assert_eq!(password.as_bytes(), b"Secur3!Pass");
        assert_eq!(password.len(), 11);
        assert!(!password.is_empty());
    }

    #[test]
    fn test_password_debug_redacted() {
        let password = Password::from("Secur3!Pass");
        let debug = format!("{:?}", password);
        assert_eq!(debug, "Password([REDACTED])");
        assert!(!debug.contains("Secur3"));
    }

    #[test]
    fn test_empty_password() {
        assert!(Password::new("").is_empty());
    }
}
