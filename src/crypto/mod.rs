//! Cryptographic building blocks for OpVault.
//!
//! This module provides:
//! - The primitive adapter: AES-256-CBC, HMAC-SHA-256, SHA-512, CSPRNG (`primitives`)
//! - Single-block PBKDF2 password stretching (`kdf`)
//! - The `SymmetricKeyPair` type (`keys`)
//! - The `opdata01` envelope codec (`opdata`)
//! - A random password generator (`password`)

pub mod kdf;
pub mod keys;
pub mod opdata;
pub mod password;
pub mod primitives;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, SymmetricKeyPair, ...};
pub use kdf::{derive, derive_hex};
pub use keys::SymmetricKeyPair;
pub use opdata::{
    decrypt, encrypt, DecryptedPayload, Envelope, LABEL_ITEM, LABEL_ITEM_KEY, LABEL_PROFILE_KEY,
};
