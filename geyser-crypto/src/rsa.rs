//! RSAES-PKCS1-v1_5 encryption (RFC 8017 §7.2.1).

use num_bigint::BigUint;
use num_traits::Zero;

use crate::RsaError;

/// Minimum padding-string length mandated by PKCS#1 v1.5.
const MIN_PADDING: usize = 8;

/// An RSA public key (n, e).
#[derive(Clone, Debug, PartialEq)]
pub struct PublicKey {
    n: BigUint,
    e: BigUint,
}

impl PublicKey {
    /// Parse hex `modulus` and `exponent` strings (no `0x` prefix).
    pub fn from_hex(modulus: &str, exponent: &str) -> Result<Self, RsaError> {
        let n = parse_hex(modulus).ok_or(RsaError::InvalidHex("modulus"))?;
        let e = parse_hex(exponent).ok_or(RsaError::InvalidHex("exponent"))?;
        if n.is_zero() || e.is_zero() {
            return Err(RsaError::KeyTooSmall);
        }
        Ok(Self { n, e })
    }

    /// Length of the modulus in bytes; every ciphertext has exactly this length.
    pub fn size(&self) -> usize {
        (self.n.bits() as usize).div_ceil(8)
    }

    /// Largest plaintext [`encrypt_pkcs1v15`] accepts for this key.
    pub fn max_message_len(&self) -> usize {
        self.size().saturating_sub(MIN_PADDING + 3)
    }
}

fn parse_hex(s: &str) -> Option<BigUint> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    BigUint::parse_bytes(s.as_bytes(), 16)
}

/// Fill `buf` with random non-zero bytes.
fn nonzero_random(buf: &mut [u8]) -> Result<(), RsaError> {
    getrandom::getrandom(buf).map_err(|e| RsaError::Random(e.to_string()))?;
    let mut byte = [0u8; 1];
    for b in buf.iter_mut() {
        while *b == 0 {
            getrandom::getrandom(&mut byte).map_err(|e| RsaError::Random(e.to_string()))?;
            *b = byte[0];
        }
    }
    Ok(())
}

/// Build `0x00 || 0x02 || PS || 0x00 || M` for a `k`-byte modulus.
fn pad(message: &[u8], k: usize) -> Result<Vec<u8>, RsaError> {
    if k < MIN_PADDING + 3 {
        return Err(RsaError::KeyTooSmall);
    }
    let max = k - MIN_PADDING - 3;
    if message.len() > max {
        return Err(RsaError::MessageTooLong { len: message.len(), max });
    }

    let ps_len = k - message.len() - 3;
    let mut block = Vec::with_capacity(k);
    block.push(0x00);
    block.push(0x02);
    block.resize(2 + ps_len, 0);
    nonzero_random(&mut block[2..])?;
    block.push(0x00);
    block.extend_from_slice(message);
    Ok(block)
}

/// RSA-encrypt `message` under `key` with PKCS#1 v1.5 type-2 padding.
///
/// The result is left-padded with zeros to the modulus length.
pub fn encrypt_pkcs1v15(message: &[u8], key: &PublicKey) -> Result<Vec<u8>, RsaError> {
    let k     = key.size();
    let block = pad(message, k)?;

    let encrypted = BigUint::from_bytes_be(&block).modpow(&key.e, &key.n);
    let bytes     = encrypted.to_bytes_be();
    let mut out   = vec![0u8; k - bytes.len()];
    out.extend_from_slice(&bytes);
    Ok(out)
}
