//! Batch file encryption on top of [`AesCipher`].
//!
//! Encrypted files hold envelope text. Directory operations mirror the input
//! tree into a fresh output directory and keep going past per-file failures,
//! reporting a tally at the end.

use rand::{CryptoRng, RngCore};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use hexseal_common::{Error, Result};
use hexseal_crypto::AesCipher;

/// A file that could not be processed.
#[derive(Debug, Clone)]
pub struct BatchFailure {
    /// Input path of the file.
    pub path: PathBuf,
    /// Error description.
    pub reason: String,
}

/// Outcome of a directory operation.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Input files written successfully.
    pub processed: Vec<PathBuf>,
    /// Input files that failed.
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    /// True when no file failed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of files attempted.
    pub fn total(&self) -> usize {
        self.processed.len() + self.failed.len()
    }
}

/// Encrypt one file into envelope text.
///
/// # Preconditions
/// - `input` and `output` must differ
/// - `output` must not exist
///
/// # Postconditions
/// - `output` holds the envelope text
/// - Returns the plaintext size in bytes
///
/// # Errors
/// - Same path, existing output, I/O or encryption failure
pub fn encrypt_file<R: RngCore + CryptoRng>(
    cipher: &AesCipher<R>,
    input: &Path,
    output: &Path,
) -> Result<u64> {
    check_file_paths(input, output)?;

    let plaintext = fs::read(input)?;
    let envelope = cipher.encrypt(&plaintext)?;
    fs::write(output, envelope)?;

    debug!(input = %input.display(), output = %output.display(), "File encrypted");
    Ok(plaintext.len() as u64)
}

/// Decrypt one envelope file.
///
/// Trailing whitespace after the envelope text is ignored.
///
/// # Preconditions
/// - `input` and `output` must differ
/// - `output` must not exist
///
/// # Errors
/// - Same path, existing output, I/O failure
/// - Any envelope or decryption error from [`AesCipher::decrypt`]
pub fn decrypt_file<R: RngCore + CryptoRng>(
    cipher: &AesCipher<R>,
    input: &Path,
    output: &Path,
) -> Result<u64> {
    check_file_paths(input, output)?;

    let envelope = fs::read_to_string(input)?;
    let plaintext = cipher.decrypt(envelope.trim_end())?;
    fs::write(output, &plaintext)?;

    debug!(input = %input.display(), output = %output.display(), "File decrypted");
    Ok(plaintext.len() as u64)
}

/// Encrypt every regular file below `input_dir` into `output_dir`.
///
/// # Preconditions
/// - `input_dir` is an existing directory
/// - `output_dir` does not exist and is not inside `input_dir`
///
/// # Postconditions
/// - `output_dir` mirrors the relative layout of `input_dir`
/// - Per-file failures are listed in the report, not returned
pub fn encrypt_directory<R: RngCore + CryptoRng>(
    cipher: &AesCipher<R>,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<BatchReport> {
    process_directory(input_dir, output_dir, "encrypt", |input, output| {
        encrypt_file(cipher, input, output)
    })
}

/// Decrypt every regular file below `input_dir` into `output_dir`.
///
/// Same preconditions and reporting as [`encrypt_directory`].
pub fn decrypt_directory<R: RngCore + CryptoRng>(
    cipher: &AesCipher<R>,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<BatchReport> {
    process_directory(input_dir, output_dir, "decrypt", |input, output| {
        decrypt_file(cipher, input, output)
    })
}

fn check_file_paths(input: &Path, output: &Path) -> Result<()> {
    if input == output {
        return Err(Error::InvalidInput(
            "Input and output file paths cannot be the same".to_string(),
        ));
    }
    if output.exists() {
        return Err(Error::AlreadyExists(format!(
            "Output file {}",
            output.display()
        )));
    }
    Ok(())
}

fn is_same_dir(path: &Path, root: &Path) -> bool {
    path.is_dir() && fs::canonicalize(path).is_ok_and(|path| path == root)
}

fn process_directory<F>(
    input_dir: &Path,
    output_dir: &Path,
    action: &str,
    op: F,
) -> Result<BatchReport>
where
    F: Fn(&Path, &Path) -> Result<u64>,
{
    if input_dir == output_dir {
        return Err(Error::InvalidInput(
            "Input and output directories cannot be the same".to_string(),
        ));
    }
    if !input_dir.is_dir() {
        return Err(Error::InvalidInput(format!(
            "Not a directory: {}",
            input_dir.display()
        )));
    }
    if output_dir.exists() {
        return Err(Error::AlreadyExists(format!(
            "Output directory {}",
            output_dir.display()
        )));
    }
    if output_dir.starts_with(input_dir) {
        return Err(Error::InvalidInput(
            "Output directory cannot be inside the input directory".to_string(),
        ));
    }

    let input_root = fs::canonicalize(input_dir)?;
    fs::create_dir_all(output_dir)?;
    let output_root = fs::canonicalize(output_dir)?;

    // Aliases (symlinks, `..`) can hide nesting from the textual check.
    if output_root.starts_with(&input_root) {
        let _ = fs::remove_dir(output_dir);
        return Err(Error::InvalidInput(
            "Output directory cannot be inside the input directory".to_string(),
        ));
    }

    info!(input = %input_dir.display(), output = %output_dir.display(), "Starting batch {}", action);

    let mut report = BatchReport::default();

    let walker = WalkDir::new(input_dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_same_dir(entry.path(), &output_root));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(input_dir).to_path_buf();
                warn!(path = %path.display(), "Skipping unreadable entry: {}", e);
                report.failed.push(BatchFailure {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let input = entry.path();
        let outcome = input
            .strip_prefix(input_dir)
            .map_err(|e| Error::InvalidInput(e.to_string()))
            .map(|relative| output_dir.join(relative))
            .and_then(|output| {
                if let Some(parent) = output.parent() {
                    fs::create_dir_all(parent)?;
                }
                op(input, &output)
            });

        match outcome {
            Ok(_) => report.processed.push(input.to_path_buf()),
            Err(e) => {
                warn!(path = %input.display(), "Failed to {}: {}", action, e);
                report.failed.push(BatchFailure {
                    path: input.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        processed = report.processed.len(),
        failed = report.failed.len(),
        "Batch {} finished",
        action
    );
    Ok(report)
}
