use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in OpVault.
#[derive(Debug, Error)]
pub enum OpVaultError {
    // --- Envelope errors ---
    #[error("Authentication failed: wrong key or tampered data")]
    Authentication,

    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    // --- Key derivation errors ---
    #[error("Unsupported derived key length: {requested_bits} bits (one HMAC block yields at most 512)")]
    UnsupportedLength { requested_bits: u32 },

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Wrong password")]
    WrongPassword,

    // --- Item errors ---
    #[error("Item {0} is locked")]
    ItemLocked(&'static str),

    #[error("Integrity check failed for item {0}; item may be tampered")]
    IntegrityMismatch(String),

    #[error("Item '{0}' not found")]
    ItemNotFound(String),

    #[error("Invalid item: {0}")]
    InvalidItem(String),

    // --- Vault file errors ---
    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for OpVault results.
pub type Result<T> = std::result::Result<T, OpVaultError>;
