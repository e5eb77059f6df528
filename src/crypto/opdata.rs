//! The `opdata01` authenticated envelope.
//!
//! Layout of an envelope (integers little-endian):
//!
//! ```text
//! [ "opdata01": 8 ][ plaintext len: u64 ][ IV: 16 ][ ciphertext: P ][ HMAC-SHA256: 32 ]
//! ```
//!
//! - The plaintext is prefixed with random padding so that the padded
//!   buffer is block-aligned.  Padding is never omitted: an aligned
//!   plaintext still gets one full block, an unaligned one gets the
//!   alignment remainder plus one full block.
//! - The padded buffer is encrypted with AES-256-CBC (no cipher padding)
//!   under the pair's encryption key.
//! - The HMAC covers every byte before it and uses the pair's
//!   authentication key.  It is checked before anything is decrypted.
//!
//! The label passed to `decrypt` selects post-processing only; it is not
//! authenticated.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroizing;

use super::keys::{SymmetricKeyPair, KEY_LEN, KEY_PAIR_LEN};
use super::primitives::{self, BLOCK_LEN};
use crate::errors::{OpVaultError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Format identifier and version at the start of every envelope.
pub const MAGIC: &[u8; 8] = b"opdata01";

const LENGTH_LEN: usize = 8;
const IV_LEN: usize = 16;
/// Length of the trailing HMAC-SHA256 tag.
pub const TAG_LEN: usize = 32;

/// magic + length + IV.
const HEADER_LEN: usize = MAGIC.len() + LENGTH_LEN + IV_LEN;

/// Label for a per-item key pair wrapped under the master keys.
pub const LABEL_ITEM_KEY: &str = "itemKey";

/// Label for profile key material (master or overview) wrapped under
/// the password-derived keys.
pub const LABEL_PROFILE_KEY: &str = "profileKey";

/// Label for item details and overview JSON.
pub const LABEL_ITEM: &str = "item";

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// An opaque `opdata01` blob.
///
/// Only the codec looks inside; everyone else stores it and hands it
/// back.  Serialized as base64 text.
#[derive(Clone, PartialEq, Eq)]
pub struct Envelope(Vec<u8>);

impl Envelope {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn from_base64(encoded: &str) -> Result<Self> {
        BASE64
            .decode(encoded.trim())
            .map(Self)
            .map_err(|e| OpVaultError::MalformedEnvelope(format!("invalid base64: {e}")))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Envelope({} bytes)", self.0.len())
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Envelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        BASE64
            .decode(&s)
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Decrypted payloads
// ---------------------------------------------------------------------------

/// What `decrypt` hands back, depending on the label.
pub enum DecryptedPayload {
    /// Raw plaintext for the caller to interpret.
    Bytes(Zeroizing<Vec<u8>>),
    /// A wrapped key pair as `[encryption_key_hex, authentication_key_hex]`.
    KeyPair([Zeroizing<String>; 2]),
}

impl DecryptedPayload {
    pub fn into_bytes(self) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            Self::KeyPair(_) => Err(OpVaultError::MalformedEnvelope(
                "expected raw bytes, got a key pair".into(),
            )),
        }
    }

    pub fn into_key_pair(self) -> Result<SymmetricKeyPair> {
        match self {
            Self::KeyPair([enc, auth]) => SymmetricKeyPair::from_hex(&enc, &auth),
            Self::Bytes(_) => Err(OpVaultError::MalformedEnvelope(
                "expected a key pair, got raw bytes".into(),
            )),
        }
    }
}

impl fmt::Debug for DecryptedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            Self::KeyPair(_) => f.write_str("KeyPair(..)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Number of random padding bytes prepended to a plaintext of `len` bytes.
pub fn padding_len(len: usize) -> usize {
    BLOCK_LEN + (BLOCK_LEN - len % BLOCK_LEN) % BLOCK_LEN
}

/// Encrypt `plaintext` into an envelope under `keys`.
///
/// `label` is accepted for symmetry with [`decrypt`]; encryption treats
/// all labels the same.
pub fn encrypt(label: &str, plaintext: &[u8], keys: &SymmetricKeyPair) -> Result<Envelope> {
    let iv = primitives::random_bytes(IV_LEN);

    let pad = padding_len(plaintext.len());
    let mut padded = Zeroizing::new(Vec::with_capacity(pad + plaintext.len()));
    padded.extend_from_slice(&primitives::random_bytes(pad));
    padded.extend_from_slice(plaintext);

    let ciphertext = primitives::encrypt_block_cipher(keys.encryption_key(), &iv, &padded)?;

    let mut out = Vec::with_capacity(HEADER_LEN + ciphertext.len() + TAG_LEN);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&(plaintext.len() as u64).to_le_bytes());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);

    let tag = primitives::keyed_hash(keys.authentication_key(), &out)?;
    out.extend_from_slice(&tag);

    tracing::debug!(
        label,
        plaintext_len = plaintext.len(),
        envelope_len = out.len(),
        "encrypted envelope"
    );

    Ok(Envelope(out))
}

/// Authenticate and decrypt `envelope` under `keys`.
///
/// Size and alignment are checked first, then the tag.  The magic and the
/// declared length are only trusted once the tag has verified, so any
/// modification of an authentic envelope fails with `Authentication`.
/// A buffer that is not authentic reports `Authentication` even when its
/// magic is missing.
pub fn decrypt(label: &str, envelope: &Envelope, keys: &SymmetricKeyPair) -> Result<DecryptedPayload> {
    let data = envelope.as_bytes();

    if data.len() < HEADER_LEN + TAG_LEN {
        return Err(OpVaultError::MalformedEnvelope(format!(
            "envelope is {} bytes, shorter than the {} byte minimum",
            data.len(),
            HEADER_LEN + TAG_LEN
        )));
    }

    let ciphertext_len = data.len() - HEADER_LEN - TAG_LEN;
    if ciphertext_len % BLOCK_LEN != 0 {
        return Err(OpVaultError::MalformedEnvelope(format!(
            "ciphertext length {ciphertext_len} is not a multiple of {BLOCK_LEN}"
        )));
    }

    let (authenticated, tag) = data.split_at(data.len() - TAG_LEN);
    primitives::verify_keyed_hash(keys.authentication_key(), authenticated, tag)?;

    if &authenticated[..MAGIC.len()] != MAGIC {
        return Err(OpVaultError::MalformedEnvelope(
            "missing opdata01 magic".into(),
        ));
    }

    let mut length_bytes = [0u8; LENGTH_LEN];
    length_bytes.copy_from_slice(&authenticated[MAGIC.len()..MAGIC.len() + LENGTH_LEN]);
    let declared = u64::from_le_bytes(length_bytes);
    let declared = usize::try_from(declared)
        .ok()
        .filter(|&n| n <= ciphertext_len)
        .ok_or_else(|| {
            OpVaultError::MalformedEnvelope(format!(
                "declared length {declared} exceeds ciphertext length {ciphertext_len}"
            ))
        })?;

    let iv = &authenticated[MAGIC.len() + LENGTH_LEN..HEADER_LEN];
    let ciphertext = &authenticated[HEADER_LEN..];
    let padded = Zeroizing::new(primitives::decrypt_block_cipher(
        keys.encryption_key(),
        iv,
        ciphertext,
    )?);

    // Padding sits in front; the plaintext is the tail.
    let plaintext = &padded[padded.len() - declared..];

    tracing::debug!(label, plaintext_len = declared, "decrypted envelope");

    match label {
        LABEL_ITEM_KEY => split_key_pair(plaintext),
        LABEL_PROFILE_KEY => {
            let digest = Zeroizing::new(primitives::hash(plaintext));
            split_key_pair(digest.as_slice())
        }
        _ => Ok(DecryptedPayload::Bytes(Zeroizing::new(plaintext.to_vec()))),
    }
}

fn split_key_pair(bytes: &[u8]) -> Result<DecryptedPayload> {
    if bytes.len() != KEY_PAIR_LEN {
        return Err(OpVaultError::MalformedEnvelope(format!(
            "key pair payload must be {KEY_PAIR_LEN} bytes, got {}",
            bytes.len()
        )));
    }

    Ok(DecryptedPayload::KeyPair([
        Zeroizing::new(hex::encode(&bytes[..KEY_LEN])),
        Zeroizing::new(hex::encode(&bytes[KEY_LEN..])),
    ]))
}
