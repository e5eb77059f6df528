//! The vault profile: password salt, iteration count and the wrapped
//! master and overview key material.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::format::{base64_decode, base64_encode};
use super::keychain::{derive_key_pair, KeyHierarchy};
use crate::crypto::opdata::{self, Envelope, LABEL_PROFILE_KEY};
use crate::crypto::primitives;
use crate::errors::{OpVaultError, Result};

/// Length of the password salt in bytes.
const SALT_LEN: usize = 16;

/// Length of the random material behind each profile key pair.
/// The key pair is the SHA-512 digest of this material.
const KEY_MATERIAL_LEN: usize = 256;

/// Per-vault key derivation parameters and wrapped key material.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub uuid: String,

    /// Salt for password stretching (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    /// PBKDF2 iteration count used with this profile.
    pub iterations: u32,

    /// Master key material wrapped under the password-derived keys.
    pub master_key: Envelope,

    /// Overview key material wrapped under the password-derived keys.
    pub overview_key: Envelope,

    pub created_at: i64,
    pub updated_at: i64,
}

impl Profile {
    /// Create a new profile protected by `password`.
    ///
    /// Returns the profile together with its already-unlocked keys so the
    /// caller does not pay for key derivation twice.
    pub fn create(password: &[u8], iterations: u32) -> Result<(Self, KeyHierarchy)> {
        if iterations < 1 {
            return Err(OpVaultError::KeyDerivationFailed(
                "PBKDF2 iterations must be at least 1".into(),
            ));
        }

        let salt = primitives::random_bytes(SALT_LEN);
        let derived = derive_key_pair(password, &salt, iterations)?;

        let master_material = Zeroizing::new(primitives::random_bytes(KEY_MATERIAL_LEN));
        let overview_material = Zeroizing::new(primitives::random_bytes(KEY_MATERIAL_LEN));

        let now = Utc::now().timestamp();
        let profile = Self {
            uuid: new_uuid(),
            salt,
            iterations,
            master_key: opdata::encrypt(LABEL_PROFILE_KEY, &master_material, &derived)?,
            overview_key: opdata::encrypt(LABEL_PROFILE_KEY, &overview_material, &derived)?,
            created_at: now,
            updated_at: now,
        };

        let keys = KeyHierarchy::from_derived(&derived, &profile)?;
        tracing::debug!(profile = %profile.uuid, iterations, "created profile");
        Ok((profile, keys))
    }

    /// Unlock this profile with `password`.
    pub fn unlock(&self, password: &[u8]) -> Result<KeyHierarchy> {
        KeyHierarchy::from_password(password, self)
    }
}

/// 32 uppercase hex characters from 16 random bytes.
pub(crate) fn new_uuid() -> String {
    hex::encode_upper(primitives::random_bytes(16))
}
