//! The symmetric key pair every envelope operation works with.
//!
//! A pair is an AES-256 encryption key plus an HMAC-SHA-256
//! authentication key.  Pairs are derived (from a password), randomly
//! generated (per item) or unwrapped from an envelope; they are never
//! serialized directly.

use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::primitives;
use crate::errors::{OpVaultError, Result};

/// Length of each half of a key pair (256 bits).
pub const KEY_LEN: usize = 32;

/// Length of a key pair laid out as `encryption || authentication`.
pub const KEY_PAIR_LEN: usize = 2 * KEY_LEN;

/// An encryption key and an authentication key used together.
///
/// Memory is zeroed on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKeyPair {
    encryption_key: [u8; KEY_LEN],
    authentication_key: [u8; KEY_LEN],
}

impl SymmetricKeyPair {
    pub fn new(encryption_key: [u8; KEY_LEN], authentication_key: [u8; KEY_LEN]) -> Self {
        Self {
            encryption_key,
            authentication_key,
        }
    }

    /// Fresh random key pair (used for per-item keys).
    pub fn generate() -> Self {
        let mut encryption_key = [0u8; KEY_LEN];
        let mut authentication_key = [0u8; KEY_LEN];
        primitives::fill_random(&mut encryption_key);
        primitives::fill_random(&mut authentication_key);
        Self::new(encryption_key, authentication_key)
    }

    /// Split 64 bytes into `encryption || authentication`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_PAIR_LEN {
            return Err(OpVaultError::MalformedEnvelope(format!(
                "key pair must be {KEY_PAIR_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        let mut encryption_key = [0u8; KEY_LEN];
        let mut authentication_key = [0u8; KEY_LEN];
        encryption_key.copy_from_slice(&bytes[..KEY_LEN]);
        authentication_key.copy_from_slice(&bytes[KEY_LEN..]);
        Ok(Self::new(encryption_key, authentication_key))
    }

    /// Build a pair from its two hex-encoded halves.
    pub fn from_hex(encryption_hex: &str, authentication_hex: &str) -> Result<Self> {
        let mut encryption_key = [0u8; KEY_LEN];
        let mut authentication_key = [0u8; KEY_LEN];
        hex::decode_to_slice(encryption_hex, &mut encryption_key)
            .map_err(|e| OpVaultError::MalformedEnvelope(format!("encryption key hex: {e}")))?;
        hex::decode_to_slice(authentication_hex, &mut authentication_key).map_err(|e| {
            OpVaultError::MalformedEnvelope(format!("authentication key hex: {e}"))
        })?;
        Ok(Self::new(encryption_key, authentication_key))
    }

    pub fn encryption_key(&self) -> &[u8; KEY_LEN] {
        &self.encryption_key
    }

    pub fn authentication_key(&self) -> &[u8; KEY_LEN] {
        &self.authentication_key
    }

    /// `encryption || authentication`, the payload that gets wrapped.
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        let mut out = Zeroizing::new(Vec::with_capacity(KEY_PAIR_LEN));
        out.extend_from_slice(&self.encryption_key);
        out.extend_from_slice(&self.authentication_key);
        out
    }

    /// Both halves hex-encoded, in `[encryption, authentication]` order.
    pub fn to_hex(&self) -> [Zeroizing<String>; 2] {
        [
            Zeroizing::new(hex::encode(self.encryption_key)),
            Zeroizing::new(hex::encode(self.authentication_key)),
        ]
    }
}

impl PartialEq for SymmetricKeyPair {
    fn eq(&self, other: &Self) -> bool {
        let enc = self.encryption_key.ct_eq(&other.encryption_key);
        let auth = self.authentication_key.ct_eq(&other.authentication_key);
        (enc & auth).into()
    }
}

impl Eq for SymmetricKeyPair {}

impl fmt::Debug for SymmetricKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKeyPair(..)")
    }
}
