//! HexSeal CLI - Command line interface for envelope encryption.
//!
//! This tool encrypts text, files and directory trees into hex envelopes,
//! and provides checksum, hashing and password generation helpers.
//!
//! The password is read from `HEXSEAL_PASSWORD` when set, otherwise it is
//! prompted for on the terminal. It is never taken from the command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use hexseal_common::{Error, Password};
use hexseal_crypto::{validate_password, AesCipher, CipherConfig, SaltMode};
use hexseal_tools::{batch, checksum, passgen, BatchReport, PasswordCategory};

#[derive(Parser)]
#[command(name = "hexseal")]
#[command(about = "HexSeal - Password-based envelope encryption")]
#[command(
    after_help = "The password is read from HEXSEAL_PASSWORD if set, otherwise prompted for."
)]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Reuse one salt for every envelope produced by this invocation.
    #[arg(long, global = true)]
    per_context_salt: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt text and print the envelope.
    Encrypt {
        /// Text to encrypt.
        #[arg(short, long)]
        text: String,
    },

    /// Decrypt an envelope and print the text.
    Decrypt {
        /// Envelope hex string.
        #[arg(short, long)]
        envelope: String,
    },

    /// Encrypt a file.
    EncryptFile {
        /// Plaintext file.
        #[arg(short, long)]
        input: PathBuf,

        /// Envelope file to create.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Decrypt a file.
    DecryptFile {
        /// Envelope file.
        #[arg(short, long)]
        input: PathBuf,

        /// Plaintext file to create.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Encrypt every file in a directory tree.
    EncryptDir {
        /// Directory to encrypt.
        #[arg(short, long)]
        input: PathBuf,

        /// Directory to create for the envelopes.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Decrypt every file in a directory tree.
    DecryptDir {
        /// Directory of envelopes.
        #[arg(short, long)]
        input: PathBuf,

        /// Directory to create for the plaintext.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Generate or validate file checksums.
    Checksum {
        #[command(subcommand)]
        action: ChecksumAction,
    },

    /// Hash a secret with every supported algorithm.
    Hash {
        /// Secret to hash.
        #[arg(short, long)]
        secret: String,

        /// Append a random salt before hashing.
        #[arg(long)]
        salt: bool,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },

    /// Generate a random password.
    GeneratePassword {
        /// Number of characters.
        #[arg(short, long)]
        length: usize,

        /// Category: "normal" or "secure".
        #[arg(short, long, default_value = "normal")]
        category: String,
    },
}

#[derive(Subcommand)]
enum ChecksumAction {
    /// Print the file's digest under every algorithm.
    Generate {
        /// File to digest.
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Check a digest against the file under every algorithm.
    Validate {
        /// File to digest.
        #[arg(short, long)]
        file: PathBuf,

        /// Expected hex digest.
        #[arg(short, long)]
        checksum: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

/// Environment variable holding the password for non-interactive use.
const PASSWORD_ENV: &str = "HEXSEAL_PASSWORD";

/// Prompted passwords get this many tries.
const MAX_ATTEMPTS: usize = 3;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let salt_mode = if cli.per_context_salt {
        SaltMode::PerContext
    } else {
        SaltMode::PerMessage
    };

    match cli.command {
        Commands::Encrypt { text } => cmd_encrypt(salt_mode, &text),

        Commands::Decrypt { envelope } => cmd_decrypt(&envelope),

        Commands::EncryptFile { input, output } => cmd_encrypt_file(salt_mode, &input, &output),

        Commands::DecryptFile { input, output } => cmd_decrypt_file(&input, &output),

        Commands::EncryptDir { input, output } => cmd_encrypt_dir(salt_mode, &input, &output),

        Commands::DecryptDir { input, output } => cmd_decrypt_dir(&input, &output),

        Commands::Checksum { action } => match action {
            ChecksumAction::Generate { file } => cmd_checksum_generate(&file),
            ChecksumAction::Validate { file, checksum } => cmd_checksum_validate(&file, &checksum),
        },

        Commands::Hash {
            secret,
            salt,
            format,
        } => cmd_hash(&secret, salt, format),

        Commands::GeneratePassword { length, category } => {
            cmd_generate_password(length, &category)
        }
    }
}

/// Prompt for password securely.
fn prompt_password(prompt: &str) -> Result<Password> {
    rpassword::prompt_password(prompt)
        .map(Password::new)
        .context("Failed to read password")
}

/// Password from the environment; an empty value counts as unset.
fn env_password() -> Option<Password> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|password| !password.is_empty())
        .map(Password::new)
}

/// Run `attempt` until it succeeds, fails with a non-retryable error, or
/// MAX_ATTEMPTS is reached.
fn with_retries<T>(mut attempt: impl FnMut() -> Result<T>) -> Result<T> {
    for _ in 1..MAX_ATTEMPTS {
        match attempt() {
            Err(err) if is_retryable(&err) => eprintln!("{:#}", err),
            result => return result,
        }
    }
    attempt()
}

fn is_retryable(err: &anyhow::Error) -> bool {
    err.downcast_ref::<Error>().is_some_and(Error::is_retryable)
}

/// Password for encryption: must satisfy the composition policy.
fn prompt_encryption_password() -> Result<Password> {
    let password = prompt_password("Enter password: ")?;
    let confirm = prompt_password("Confirm password: ")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }

    validate_password(password.as_str())?;
    Ok(password)
}

/// Cipher for encryption. A prompted password that breaks the policy is
/// asked for again.
fn encryption_cipher(salt_mode: SaltMode) -> Result<AesCipher> {
    let config = CipherConfig::with_salt_mode(salt_mode);

    let password = match env_password() {
        Some(password) => {
            validate_password(password.as_str())?;
            password
        }
        None => with_retries(prompt_encryption_password)?,
    };
    Ok(AesCipher::with_config(password, config))
}

/// Run `open` with a decryption cipher. Any password is accepted; a
/// prompted one that fails the padding check is asked for again.
fn with_decryption<T>(mut open: impl FnMut(&AesCipher) -> Result<T>) -> Result<T> {
    if let Some(password) = env_password() {
        return open(&AesCipher::new(password));
    }

    with_retries(|| {
        let password = prompt_password("Enter password: ")?;
        if password.is_empty() {
            anyhow::bail!("Password cannot be empty");
        }
        open(&AesCipher::new(password))
    })
}

/// Encrypt text.
fn cmd_encrypt(salt_mode: SaltMode, text: &str) -> Result<()> {
    let cipher = encryption_cipher(salt_mode)?;
    let envelope = cipher
        .encrypt(text.as_bytes())
        .context("Encryption failed")?;

    println!("Encrypted: {}", envelope);
    Ok(())
}

/// Decrypt an envelope.
fn cmd_decrypt(envelope: &str) -> Result<()> {
    let text = with_decryption(|cipher| {
        cipher
            .decrypt_to_string(envelope.trim())
            .context("Decryption failed")
    })?;

    println!("Decrypted: {}", text);
    Ok(())
}

/// Encrypt a single file.
fn cmd_encrypt_file(salt_mode: SaltMode, input: &Path, output: &Path) -> Result<()> {
    info!("Encrypting {} to {}", input.display(), output.display());

    let cipher = encryption_cipher(salt_mode)?;
    let size = batch::encrypt_file(&cipher, input, output).context("Failed to encrypt file")?;

    println!(
        "File '{}' encrypted and saved as '{}' ({} bytes).",
        input.display(),
        output.display(),
        size
    );
    Ok(())
}

/// Decrypt a single file.
fn cmd_decrypt_file(input: &Path, output: &Path) -> Result<()> {
    info!("Decrypting {} to {}", input.display(), output.display());

    let size = with_decryption(|cipher| {
        batch::decrypt_file(cipher, input, output).context("Failed to decrypt file")
    })?;

    println!(
        "File '{}' decrypted and saved as '{}' ({} bytes).",
        input.display(),
        output.display(),
        size
    );
    Ok(())
}

/// Encrypt a directory tree.
fn cmd_encrypt_dir(salt_mode: SaltMode, input: &Path, output: &Path) -> Result<()> {
    let cipher = encryption_cipher(salt_mode)?;
    let report = batch::encrypt_directory(&cipher, input, output)
        .context("Failed to encrypt directory")?;
    print_report("encrypted", &report)
}

/// Decrypt a directory tree.
fn cmd_decrypt_dir(input: &Path, output: &Path) -> Result<()> {
    // Per-file failures land in the report, so there is nothing to retry.
    let report = with_decryption(|cipher| {
        batch::decrypt_directory(cipher, input, output).context("Failed to decrypt directory")
    })?;
    print_report("decrypted", &report)
}

fn print_report(verb: &str, report: &BatchReport) -> Result<()> {
    for failure in &report.failed {
        println!("  [FAILED] {}: {}", failure.path.display(), failure.reason);
    }

    println!("\n=== BATCH COMPLETE ===");
    println!("{}: {}", capitalize(verb), report.processed.len());
    println!("Failed: {}", report.failed.len());

    if !report.is_clean() {
        anyhow::bail!(
            "{} of {} files could not be {}",
            report.failed.len(),
            report.total(),
            verb
        );
    }
    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Print every checksum of a file.
fn cmd_checksum_generate(file: &Path) -> Result<()> {
    let data = std::fs::read(file)
        .with_context(|| format!("Failed to read '{}'", file.display()))?;

    for entry in checksum::compute_checksums(&data) {
        println!("{}: {}", entry.algorithm, entry.digest);
    }
    Ok(())
}

/// Look for the algorithm that produced a checksum.
fn cmd_checksum_validate(file: &Path, expected: &str) -> Result<()> {
    let data = std::fs::read(file)
        .with_context(|| format!("Failed to read '{}'", file.display()))?;

    match checksum::verify_checksum(&data, expected) {
        Some(algorithm) => {
            println!("Checksum matched using {}", algorithm);
            Ok(())
        }
        None => {
            for entry in checksum::compute_checksums(&data) {
                println!("  {}: {}", entry.algorithm, entry.digest);
            }
            anyhow::bail!("No matching checksum found")
        }
    }
}

/// Hash a secret with every algorithm.
fn cmd_hash(secret: &str, salted: bool, format: OutputFormat) -> Result<()> {
    if secret.is_empty() {
        anyhow::bail!("Secret cannot be empty");
    }

    let salt = salted.then(checksum::generate_salt);
    let report = checksum::hash_secret(secret, salt.as_ref().map(|s| s.as_slice()));

    let output = match format {
        OutputFormat::Csv => report.to_csv(),
        OutputFormat::Json => report.to_json()?,
    };
    println!("{}", output);
    Ok(())
}

/// Generate a random password.
fn cmd_generate_password(length: usize, category: &str) -> Result<()> {
    let category: PasswordCategory = category.parse()?;
    let password = passgen::generate_password(length, category, &mut rand::rngs::OsRng)?;

    println!("Generated Password: {}", password);
    Ok(())
}
