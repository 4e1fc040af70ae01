//! Block-cipher engine: PKCS#7 padding with AES-256 in CFB mode.
//!
//! CFB provides confidentiality only. The padding check on decryption is the
//! sole integrity signal and is not an authentication guarantee:
//!
//! - a wrong key garbles every block, so the padding check fails except with
//!   probability about 1/256
//! - a flipped byte in block `i` flips the same plaintext byte and garbles
//!   all of block `i + 1`; when `i + 1` is the final block the padding check
//!   almost always fails
//! - a flipped byte in the final block only flips the matching plaintext
//!   byte; it is caught when that byte is padding and passes silently when
//!   it is data

use aes::Aes256;
use block_padding::{Pkcs7, RawPadding};
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};

use crate::keys::{IV_LENGTH, KEY_LENGTH};
use hexseal_common::{Error, Result};

type Aes256CfbEnc = cfb_mode::Encryptor<Aes256>;
type Aes256CfbDec = cfb_mode::Decryptor<Aes256>;

/// AES block size (16 bytes).
pub const BLOCK_SIZE: usize = 16;

/// Length of the ciphertext produced for a plaintext of `len` bytes.
pub fn padded_len(len: usize) -> usize {
    (len / BLOCK_SIZE + 1) * BLOCK_SIZE
}

/// Encrypt plaintext using AES-256-CFB after PKCS#7 padding.
///
/// # Preconditions
/// - `key` must be exactly KEY_LENGTH bytes
/// - `iv` must be exactly IV_LENGTH bytes
/// - `plaintext` can be any size, including empty
///
/// # Postconditions
/// - Output length is `padded_len(plaintext.len())`: a multiple of
///   BLOCK_SIZE and never zero
///
/// # Errors
/// - Returns error if key or IV length is incorrect
pub fn encrypt(plaintext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    check_lengths(key, iv)?;

    let mut buf = pad(plaintext);
    Aes256CfbEnc::new_from_slices(key, iv)
        .map_err(|e| Error::Crypto(format!("Cipher initialisation failed: {}", e)))?
        .encrypt(&mut buf);

    Ok(buf)
}

/// Decrypt AES-256-CFB ciphertext and strip its PKCS#7 padding.
///
/// # Preconditions
/// - `key` must be exactly KEY_LENGTH bytes
/// - `iv` must be exactly IV_LENGTH bytes
/// - `ciphertext` must be a positive multiple of BLOCK_SIZE
///
/// # Errors
/// - `Crypto` if key, IV or ciphertext length is invalid
/// - `Padding` if the trailing padding is malformed (wrong key or
///   corrupted data; the two are not distinguished)
pub fn decrypt(ciphertext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    check_lengths(key, iv)?;

    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(Error::Crypto(format!(
            "Invalid ciphertext length: {} is not a positive multiple of {}",
            ciphertext.len(),
            BLOCK_SIZE
        )));
    }

    let mut buf = ciphertext.to_vec();
    Aes256CfbDec::new_from_slices(key, iv)
        .map_err(|e| Error::Crypto(format!("Cipher initialisation failed: {}", e)))?
        .decrypt(&mut buf);

    unpad(&mut buf)?;
    Ok(buf)
}

fn check_lengths(key: &[u8], iv: &[u8]) -> Result<()> {
    if key.len() != KEY_LENGTH {
        return Err(Error::Crypto(format!(
            "Invalid key length: expected {}, got {}",
            KEY_LENGTH,
            key.len()
        )));
    }
    if iv.len() != IV_LENGTH {
        return Err(Error::Crypto(format!(
            "Invalid IV length: expected {}, got {}",
            IV_LENGTH,
            iv.len()
        )));
    }
    Ok(())
}

fn pad(plaintext: &[u8]) -> Vec<u8> {
    let full = plaintext.len() - plaintext.len() % BLOCK_SIZE;
    let total = padded_len(plaintext.len());

    let mut buf = Vec::with_capacity(total);
    buf.extend_from_slice(plaintext);
    buf.resize(total, 0);
    Pkcs7::raw_pad(&mut buf[full..], plaintext.len() - full);
    buf
}

fn unpad(buf: &mut Vec<u8>) -> Result<()> {
    let last_block = buf.len() - BLOCK_SIZE;
    let kept = Pkcs7::raw_unpad(&buf[last_block..])
        .map_err(|_| Error::Padding)?
        .len();
    buf.truncate(last_block + kept);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; KEY_LENGTH] = [42u8; KEY_LENGTH];
    const IV: [u8; IV_LENGTH] = [7u8; IV_LENGTH];

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let plaintext = b"Hello, World!";

        let ciphertext = encrypt(plaintext, &KEY, &IV).unwrap();
        let decrypted = decrypt(&ciphertext, &KEY, &IV).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_aes256_cfb_known_vector() {
        // NIST SP 800-38A F.3.13, CFB128-AES256, first block. The padding
        // block that follows is not part of the vector.
        let key = hex::decode("603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4")
            .unwrap();
        let iv = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let block = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();

        let ciphertext = encrypt(&block, &key, &iv).unwrap();

        assert_eq!(ciphertext.len(), 32);
        assert_eq!(
            hex::encode(&ciphertext[..16]),
            "dc7e84bfda79164b7ecd8486985d3860"
        );
    }

    #[test]
    fn test_ciphertext_size() {
        assert_eq!(encrypt(b"hello world", &KEY, &IV).unwrap().len(), 16);
        assert_eq!(encrypt(&[0u8; 15], &KEY, &IV).unwrap().len(), 16);
        assert_eq!(encrypt(&[0u8; 16], &KEY, &IV).unwrap().len(), 32);
        assert_eq!(encrypt(&[0u8; 17], &KEY, &IV).unwrap().len(), 32);
    }

    #[test]
    fn test_empty_plaintext() {
        let ciphertext = encrypt(b"", &KEY, &IV).unwrap();
        assert_eq!(ciphertext.len(), BLOCK_SIZE);

        let decrypted = decrypt(&ciphertext, &KEY, &IV).unwrap();
        assert!(decrypted.is_empty());
    }

    #[test]
    fn test_padding_bytes() {
        assert_eq!(pad(b""), vec![16u8; 16]);

        let padded = pad(b"hello world");
        assert_eq!(&padded[..11], b"hello world");
        assert_eq!(&padded[11..], &[5u8; 5]);
    }

    #[test]
    fn test_same_iv_is_deterministic() {
        let ct1 = encrypt(b"Deterministic", &KEY, &IV).unwrap();
        let ct2 = encrypt(b"Deterministic", &KEY, &IV).unwrap();
        assert_eq!(ct1, ct2);

        let ct3 = encrypt(b"Deterministic", &KEY, &[8u8; IV_LENGTH]).unwrap();
        assert_ne!(ct1, ct3);
    }

    #[test]
    fn test_invalid_key_length() {
        let short_key = [0u8; 16];

        assert!(matches!(
            encrypt(b"data", &short_key, &IV),
            Err(Error::Crypto(_))
        ));
        assert!(matches!(
            decrypt(&[0u8; 16], &short_key, &IV),
            Err(Error::Crypto(_))
        ));
    }

    #[test]
    fn test_invalid_iv_length() {
        assert!(matches!(
            encrypt(b"data", &KEY, &[0u8; 12]),
            Err(Error::Crypto(_))
        ));
    }

    #[test]
    fn test_ciphertext_not_block_aligned() {
        let mut ciphertext = encrypt(b"Secret data", &KEY, &IV).unwrap();
        ciphertext.pop();

        assert!(matches!(
            decrypt(&ciphertext, &KEY, &IV),
            Err(Error::Crypto(_))
        ));
        assert!(matches!(decrypt(&[], &KEY, &IV), Err(Error::Crypto(_))));
    }

    #[test]
    fn test_bad_padding_reported() {
        // Flipping the final byte of a one-block message turns the 0x05
        // padding byte into 0xFA, which can never be valid PKCS#7.
        let mut ciphertext = encrypt(b"hello world", &KEY, &IV).unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0xFF;

        assert!(matches!(
            decrypt(&ciphertext, &KEY, &IV),
            Err(Error::Padding)
        ));
    }

    fn flip(ciphertext: &[u8], index: usize) -> Result<Vec<u8>> {
        let mut tampered = ciphertext.to_vec();
        tampered[index] ^= 0xFF;
        decrypt(&tampered, &KEY, &IV)
    }

    #[test]
    fn test_final_block_flip_caught_only_in_padding() {
        // "hello world" is 11 data bytes followed by 5 padding bytes.
        let ciphertext = encrypt(b"hello world", &KEY, &IV).unwrap();

        for index in 0..11 {
            let mut expected = b"hello world".to_vec();
            expected[index] ^= 0xFF;
            assert_eq!(flip(&ciphertext, index).unwrap(), expected);
        }
        for index in 11..16 {
            assert!(matches!(flip(&ciphertext, index), Err(Error::Padding)));
        }
    }

    #[test]
    fn test_flip_before_final_block_garbles_padding() {
        // 40 bytes: two full blocks, then 8 data and 8 padding bytes.
        let plaintext: Vec<u8> = (0u8..40).collect();
        let ciphertext = encrypt(&plaintext, &KEY, &IV).unwrap();
        assert_eq!(ciphertext.len(), 48);

        // Block 1 feeds the final block, which decrypts to noise.
        let caught = (16..32)
            .filter(|&index| matches!(flip(&ciphertext, index), Err(Error::Padding)))
            .count();
        assert!(caught >= 14, "only {caught} of 16 flips caught");

        // Block 0 garbles block 1, which holds only data: accepted silently.
        for index in 0..16 {
            let opened = flip(&ciphertext, index).unwrap();
            assert_eq!(opened.len(), 40);
            assert_ne!(opened, plaintext);
            assert_eq!(opened[32..], plaintext[32..]);
        }
    }

    #[test]
    fn test_wrong_key_does_not_return_plaintext() {
        let plaintext = b"Secret data";
        let ciphertext = encrypt(plaintext, &[1u8; KEY_LENGTH], &IV).unwrap();

        // Without an authentication tag a wrong key either fails the
        // padding check or yields garbage; it never yields the plaintext.
        match decrypt(&ciphertext, &[2u8; KEY_LENGTH], &IV) {
            Err(Error::Padding) => {}
            Ok(garbage) => assert_ne!(garbage, plaintext),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_large_plaintext() {
        let plaintext = vec![0xABu8; 1_000_000]; // 1 MB

        let ciphertext = encrypt(&plaintext, &KEY, &IV).unwrap();
        let decrypted = decrypt(&ciphertext, &KEY, &IV).unwrap();

        assert_eq!(decrypted, plaintext);
    }
}
