//! Envelope codec: `hex(salt) || hex(iv) || hex(ciphertext)`.
//!
//! The envelope is lowercase hexadecimal text with no separators and no
//! version marker. Salt and IV occupy fixed 32-character slots.

use crate::keys::{Iv, Salt, IV_LENGTH, SALT_LENGTH};
use hexseal_common::{Error, Result};

/// Number of hex characters taken by salt and IV together.
pub const HEADER_HEX_LEN: usize = 2 * (SALT_LENGTH + IV_LENGTH);

/// Parsed envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub salt: Salt,
    pub iv: Iv,
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Serialize to envelope text.
    pub fn encode(&self) -> String {
        encode(&self.salt, &self.iv, &self.ciphertext)
    }

    /// Parse envelope text.
    pub fn decode(text: &str) -> Result<Self> {
        decode(text)
    }
}

/// Encode a salt, IV and ciphertext as envelope text.
///
/// # Postconditions
/// - Output length is `HEADER_HEX_LEN + 2 * ciphertext.len()`
pub fn encode(salt: &Salt, iv: &Iv, ciphertext: &[u8]) -> String {
    let mut out = String::with_capacity(HEADER_HEX_LEN + 2 * ciphertext.len());
    out.push_str(&hex::encode(salt.as_bytes()));
    out.push_str(&hex::encode(iv.as_bytes()));
    out.push_str(&hex::encode(ciphertext));
    out
}

/// Decode envelope text into its salt, IV and ciphertext.
///
/// Upper-case hex digits are accepted. The ciphertext segment may be empty
/// here; the cipher engine rejects it.
///
/// # Errors
/// - `MalformedEnvelope` if the text is shorter than HEADER_HEX_LEN, has an
///   odd length, or contains non-hexadecimal characters
pub fn decode(text: &str) -> Result<Envelope> {
    if text.len() < HEADER_HEX_LEN {
        return Err(Error::MalformedEnvelope(format!(
            "expected at least {} hex characters, got {}",
            HEADER_HEX_LEN,
            text.len()
        )));
    }
    if text.len() % 2 != 0 {
        return Err(Error::MalformedEnvelope(format!(
            "odd number of hex characters ({})",
            text.len()
        )));
    }

    let bytes =
        hex::decode(text).map_err(|e| Error::MalformedEnvelope(format!("invalid hex: {}", e)))?;

    let (salt, rest) = bytes.split_at(SALT_LENGTH);
    let (iv, ciphertext) = rest.split_at(IV_LENGTH);

    Ok(Envelope {
        salt: Salt::from_slice(salt)?,
        iv: Iv::from_slice(iv)?,
        ciphertext: ciphertext.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Envelope {
        Envelope {
            salt: Salt::from_bytes([0x11; SALT_LENGTH]),
            iv: Iv::from_bytes([0xAB; IV_LENGTH]),
            ciphertext: vec![0x00, 0x01, 0xFE, 0xFF],
        }
    }

    #[test]
    fn test_layout() {
        let text = sample().encode();

        assert_eq!(&text[..32], "11111111111111111111111111111111");
        assert_eq!(&text[32..64], "abababababababababababababababab");
        assert_eq!(&text[64..], "0001feff");
    }

    #[test]
    fn test_length_invariant() {
        for n in [0usize, 16, 32, 160] {
            let text = encode(
                &Salt::from_bytes([0; SALT_LENGTH]),
                &Iv::from_bytes([0; IV_LENGTH]),
                &vec![0x5A; n],
            );
            assert_eq!(text.len(), 64 + 2 * n);
        }
    }

    #[test]
    fn test_decode_recovers_segments() {
        let envelope = sample();
        assert_eq!(decode(&envelope.encode()).unwrap(), envelope);
    }

    #[test]
    fn test_decode_accepts_uppercase() {
        let upper = sample().encode().to_uppercase();
        assert_eq!(Envelope::decode(&upper).unwrap(), sample());
    }

    #[test]
    fn test_decode_header_only() {
        let text = "00".repeat(32);
        let envelope = decode(&text).unwrap();
        assert!(envelope.ciphertext.is_empty());
    }

    #[test]
    fn test_decode_too_short() {
        let almost = "0".repeat(63);
        for text in ["", "abcd", almost.as_str()] {
            assert!(matches!(decode(text), Err(Error::MalformedEnvelope(_))));
        }
    }

    #[test]
    fn test_decode_odd_length() {
        let text = "0".repeat(65);
        assert!(matches!(decode(&text), Err(Error::MalformedEnvelope(_))));
    }

    #[test]
    fn test_decode_non_hex() {
        let mut text = sample().encode();
        text.replace_range(70..71, "g");
        assert!(matches!(decode(&text), Err(Error::MalformedEnvelope(_))));

        let spaced = format!("{} ", "0".repeat(65));
        assert!(matches!(decode(&spaced), Err(Error::MalformedEnvelope(_))));
    }
}
