//! Digests over a fixed family of hash algorithms.
//!
//! Used for file checksums (generate, or find which algorithm produced a
//! given digest) and for plain or salted hashing of a secret.

use md5::Md5;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;

use hexseal_common::{Error, Result};

/// Length of salts produced by [`generate_salt`].
pub const HASH_SALT_LENGTH: usize = 16;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
}

impl DigestAlgorithm {
    /// Every algorithm, in reporting order.
    pub const ALL: [DigestAlgorithm; 10] = [
        DigestAlgorithm::Md5,
        DigestAlgorithm::Sha1,
        DigestAlgorithm::Sha224,
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sha384,
        DigestAlgorithm::Sha512,
        DigestAlgorithm::Sha3_224,
        DigestAlgorithm::Sha3_256,
        DigestAlgorithm::Sha3_384,
        DigestAlgorithm::Sha3_512,
    ];

    /// Identifier, e.g. `sha3_256`.
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "md5",
            DigestAlgorithm::Sha1 => "sha1",
            DigestAlgorithm::Sha224 => "sha224",
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha384 => "sha384",
            DigestAlgorithm::Sha512 => "sha512",
            DigestAlgorithm::Sha3_224 => "sha3_224",
            DigestAlgorithm::Sha3_256 => "sha3_256",
            DigestAlgorithm::Sha3_384 => "sha3_384",
            DigestAlgorithm::Sha3_512 => "sha3_512",
        }
    }

    /// Display label, e.g. `SHA3 256`.
    pub fn label(&self) -> String {
        self.name().replace('_', " ").to_uppercase()
    }

    /// Lowercase hex digest of `data`.
    pub fn digest_hex(&self, data: &[u8]) -> String {
        self.digest_parts(&[data])
    }

    fn digest_parts(&self, parts: &[&[u8]]) -> String {
        match self {
            DigestAlgorithm::Md5 => hex_digest::<Md5>(parts),
            DigestAlgorithm::Sha1 => hex_digest::<Sha1>(parts),
            DigestAlgorithm::Sha224 => hex_digest::<Sha224>(parts),
            DigestAlgorithm::Sha256 => hex_digest::<Sha256>(parts),
            DigestAlgorithm::Sha384 => hex_digest::<Sha384>(parts),
            DigestAlgorithm::Sha512 => hex_digest::<Sha512>(parts),
            DigestAlgorithm::Sha3_224 => hex_digest::<Sha3_224>(parts),
            DigestAlgorithm::Sha3_256 => hex_digest::<Sha3_256>(parts),
            DigestAlgorithm::Sha3_384 => hex_digest::<Sha3_384>(parts),
            DigestAlgorithm::Sha3_512 => hex_digest::<Sha3_512>(parts),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        DigestAlgorithm::ALL
            .into_iter()
            .find(|alg| alg.name() == wanted)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown digest algorithm: {}", s)))
    }
}

fn hex_digest<D: Digest>(parts: &[&[u8]]) -> String {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

/// One algorithm's digest of some input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Checksum {
    pub algorithm: DigestAlgorithm,
    pub digest: String,
}

/// Compute `data`'s digest under every algorithm.
pub fn compute_checksums(data: &[u8]) -> Vec<Checksum> {
    DigestAlgorithm::ALL
        .into_iter()
        .map(|algorithm| Checksum {
            algorithm,
            digest: algorithm.digest_hex(data),
        })
        .collect()
}

/// Find the algorithm whose digest of `data` equals `expected`.
///
/// Comparison ignores hex case and surrounding whitespace.
pub fn verify_checksum(data: &[u8], expected: &str) -> Option<DigestAlgorithm> {
    let expected = expected.trim().to_ascii_lowercase();
    compute_checksums(data)
        .into_iter()
        .find(|checksum| bool::from(checksum.digest.as_bytes().ct_eq(expected.as_bytes())))
        .map(|checksum| checksum.algorithm)
}

/// Random salt for [`hash_secret`].
pub fn generate_salt() -> [u8; HASH_SALT_LENGTH] {
    let mut salt = [0u8; HASH_SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Digests of a secret under every algorithm.
#[derive(Debug, Clone)]
pub struct HashReport {
    pub secret: String,
    pub salt: Option<Vec<u8>>,
    pub hashes: Vec<Checksum>,
}

impl HashReport {
    /// Two-line CSV: header row, then values.
    pub fn to_csv(&self) -> String {
        let mut header = vec!["Password".to_string()];
        let mut row = vec![self.secret.clone()];
        if let Some(salt) = &self.salt {
            header.push("Salt".to_string());
            row.push(hex::encode(salt));
        }
        for checksum in &self.hashes {
            header.push(checksum.algorithm.label());
            row.push(checksum.digest.clone());
        }
        format!("{}\n{}", header.join(", "), row.join(", "))
    }

    /// Pretty-printed JSON object keyed by algorithm label.
    pub fn to_json(&self) -> Result<String> {
        let hashes: serde_json::Map<String, serde_json::Value> = self
            .hashes
            .iter()
            .map(|c| (c.algorithm.label(), serde_json::Value::String(c.digest.clone())))
            .collect();

        let mut doc = serde_json::Map::new();
        doc.insert("Password".to_string(), self.secret.clone().into());
        if let Some(salt) = &self.salt {
            doc.insert("Salt".to_string(), hex::encode(salt).into());
        }
        doc.insert("Hashes".to_string(), serde_json::Value::Object(hashes));

        serde_json::to_string_pretty(&doc).map_err(|e| Error::Serialization(e.to_string()))
    }
}

/// Hash `secret`, with `salt` appended when given, under every algorithm.
pub fn hash_secret(secret: &str, salt: Option<&[u8]>) -> HashReport {
    let salt_bytes = salt.unwrap_or_default();
    let hashes = DigestAlgorithm::ALL
        .into_iter()
        .map(|algorithm| Checksum {
            algorithm,
            digest: algorithm.digest_parts(&[secret.as_bytes(), salt_bytes]),
        })
        .collect();

    HashReport {
        secret: secret.to_string(),
        salt: salt.map(<[u8]>::to_vec),
        hashes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digests_of_abc() {
        let cases = [
            (DigestAlgorithm::Md5, "900150983cd24fb0d6963f7d28e17f72"),
            (DigestAlgorithm::Sha1, "a9993e364706816aba3e25717850c26c9cd0d89d"),
            (
                DigestAlgorithm::Sha256,
                "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
            ),
            (
                DigestAlgorithm::Sha3_256,
                "3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532",
            ),
        ];
        for (algorithm, expected) in cases {
            assert_eq!(algorithm.digest_hex(b"abc"), expected, "{algorithm}");
        }
    }

    #[test]
    fn test_digest_lengths() {
        let lengths: Vec<usize> = compute_checksums(b"data")
            .iter()
            .map(|c| c.digest.len())
            .collect();
        assert_eq!(lengths, vec![32, 40, 56, 64, 96, 128, 56, 64, 96, 128]);
    }

    #[test]
    fn test_verify_checksum() {
        let data = b"abc";
        assert_eq!(
            verify_checksum(data, "A9993E364706816ABA3E25717850C26C9CD0D89D"),
            Some(DigestAlgorithm::Sha1)
        );
        assert_eq!(
            verify_checksum(data, " 900150983cd24fb0d6963f7d28e17f72\n"),
            Some(DigestAlgorithm::Md5)
        );
        assert_eq!(verify_checksum(data, "deadbeef"), None);
    }

    #[test]
    fn test_names_and_labels() {
        assert_eq!(DigestAlgorithm::Sha3_512.name(), "sha3_512");
        assert_eq!(DigestAlgorithm::Sha3_512.label(), "SHA3 512");
        assert_eq!(DigestAlgorithm::Md5.label(), "MD5");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("sha256".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha256);
        assert_eq!("SHA3-384".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha3_384);
        assert!(matches!(
            "whirlpool".parse::<DigestAlgorithm>(),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_salted_hash_differs() {
        let plain = hash_secret("Secur3!Pass", None);
        let salted = hash_secret("Secur3!Pass", Some(&[1u8; HASH_SALT_LENGTH]));

        assert_eq!(plain.hashes.len(), 10);
        for (a, b) in plain.hashes.iter().zip(&salted.hashes) {
            assert_ne!(a.digest, b.digest);
        }
        assert_eq!(
            plain.hashes[3].digest,
            DigestAlgorithm::Sha256.digest_hex(b"Secur3!Pass")
        );
    }

    #[test]
    fn test_salt_is_appended() {
        let salt = [0x21u8; 4];
        let report = hash_secret("pw", Some(&salt));
        assert_eq!(report.hashes[0].digest, DigestAlgorithm::Md5.digest_hex(b"pw!!!!"));
    }

    #[test]
    fn test_csv_format() {
        let csv = hash_secret("pw", None).to_csv();
        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("Password, MD5, SHA1, SHA224"));
        assert!(header.ends_with("SHA3 512"));
        assert!(lines.next().unwrap().starts_with("pw, "));
    }

    #[test]
    fn test_json_format() {
        let json = hash_secret("pw", Some(&[0xAB; 2])).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["Password"], "pw");
        assert_eq!(value["Salt"], "abab");
        assert_eq!(value["Hashes"].as_object().unwrap().len(), 10);
        assert!(value["Hashes"]["SHA3 256"].is_string());
    }

    #[test]
    fn test_generate_salt() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
