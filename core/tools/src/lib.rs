//! File, checksum and password tooling built on the HexSeal envelope.
//!
//! - [`batch`]: encrypt and decrypt single files or whole directory trees
//! - [`checksum`]: digests over a closed set of hash algorithms
//! - [`passgen`]: random password generation

pub mod batch;
pub mod checksum;
pub mod passgen;

pub use batch::{
    decrypt_directory, decrypt_file, encrypt_directory, encrypt_file, BatchFailure, BatchReport,
};
pub use checksum::{compute_checksums, hash_secret, verify_checksum, Checksum, DigestAlgorithm, HashReport};
pub use passgen::{generate_password, PasswordCategory};
