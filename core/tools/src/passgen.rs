//! Random password generation.

use rand::{CryptoRng, Rng, RngCore};
use std::str::FromStr;

use hexseal_common::{Error, Result};

const LETTERS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;

/// Minimum number of digits in a secure password.
pub const SECURE_MIN_DIGITS: usize = 5;

/// Shortest length for which a secure password exists.
pub const SECURE_MIN_LENGTH: usize = SECURE_MIN_DIGITS + 1;

/// Password strength category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordCategory {
    /// Uniform draws from letters, digits and punctuation.
    #[default]
    Normal,
    /// As `Normal`, but resampled until it holds at least one punctuation
    /// character and [`SECURE_MIN_DIGITS`] digits.
    Secure,
}

impl FromStr for PasswordCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "1" => Ok(PasswordCategory::Normal),
            "secure" | "2" => Ok(PasswordCategory::Secure),
            other => Err(Error::InvalidInput(format!(
                "Unknown password category: {}",
                other
            ))),
        }
    }
}

/// Generate a random password of `length` characters.
///
/// # Errors
/// - `InvalidInput` if `length` is zero, or below [`SECURE_MIN_LENGTH`] for
///   the secure category
pub fn generate_password<R: RngCore + CryptoRng + ?Sized>(
    length: usize,
    category: PasswordCategory,
    rng: &mut R,
) -> Result<String> {
    if length == 0 {
        return Err(Error::InvalidInput(
            "Password length must be a positive integer".to_string(),
        ));
    }

    let pool: Vec<char> = LETTERS.chars().chain(DIGITS.chars()).chain(PUNCTUATION.chars()).collect();

    match category {
        PasswordCategory::Normal => Ok(draw(&pool, length, rng)),
        PasswordCategory::Secure => {
            if length < SECURE_MIN_LENGTH {
                return Err(Error::InvalidInput(format!(
                    "Secure passwords need at least {} characters",
                    SECURE_MIN_LENGTH
                )));
            }
            loop {
                let candidate = draw(&pool, length, rng);
                if is_secure(&candidate) {
                    return Ok(candidate);
                }
            }
        }
    }
}

fn draw<R: RngCore + ?Sized>(pool: &[char], length: usize, rng: &mut R) -> String {
    (0..length).map(|_| pool[rng.gen_range(0..pool.len())]).collect()
}

fn is_secure(candidate: &str) -> bool {
    let digits = candidate.chars().filter(|c| c.is_ascii_digit()).count();
    let has_punctuation = candidate.chars().any(|c| PUNCTUATION.contains(c));
    has_punctuation && digits >= SECURE_MIN_DIGITS
}
