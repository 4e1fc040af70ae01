//! Common utilities and types shared across HexSeal crates.
//!
//! This module provides the error taxonomy used by every library crate and
//! the secret types that carry user passwords through the envelope core.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::Password;
