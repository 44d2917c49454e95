//! Cryptographic primitives for Steam web login.
//!
//! Provides:
//! - [`rsa::PublicKey`]: a modulus/exponent pair parsed from the hex strings
//!   returned by the key-retrieval endpoint
//! - [`rsa::encrypt_pkcs1v15`]: RSAES-PKCS1-v1_5 encryption of the password

#![deny(unsafe_code)]

pub mod rsa;

pub use rsa::{PublicKey, encrypt_pkcs1v15};

use std::fmt;

/// Errors from key parsing and encryption.
#[derive(Clone, Debug, PartialEq)]
pub enum RsaError {
    /// The modulus or exponent was not a non-empty hex string.
    InvalidHex(&'static str),
    /// The modulus is too small to carry any PKCS#1 v1.5 block.
    KeyTooSmall,
    /// The plaintext does not fit: at most `max` bytes for this key.
    MessageTooLong { len: usize, max: usize },
    /// The OS random source failed.
    Random(String),
}

impl fmt::Display for RsaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHex(field)            => write!(f, "invalid hex in RSA {field}"),
            Self::KeyTooSmall                  => write!(f, "RSA modulus too small for PKCS#1 v1.5"),
            Self::MessageTooLong { len, max }  => write!(f, "message of {len} bytes exceeds {max}-byte limit"),
            Self::Random(e)                    => write!(f, "random source failed: {e}"),
        }
    }
}

impl std::error::Error for RsaError {}
