//! The three-tier key hierarchy.
//!
//! - **master**: unwrapped from the profile with the password-derived
//!   keys; wraps every item's key pair and keys item integrity tags.
//! - **overview**: unwrapped alongside master; encrypts item overviews
//!   (titles, URLs) so they can be browsed without touching details.
//! - **item keys**: one random pair per item, stored wrapped under
//!   master, encrypting that item's details.

use zeroize::Zeroizing;

use super::profile::Profile;
use crate::crypto::kdf::{self, KEY_PAIR_BITS};
use crate::crypto::keys::SymmetricKeyPair;
use crate::crypto::opdata::{self, Envelope, LABEL_ITEM_KEY, LABEL_PROFILE_KEY};
use crate::errors::{OpVaultError, Result};

/// Master and overview key pairs of an unlocked vault.
#[derive(Debug, Clone)]
pub struct KeyHierarchy {
    master: SymmetricKeyPair,
    overview: SymmetricKeyPair,
}

impl KeyHierarchy {
    pub fn new(master: SymmetricKeyPair, overview: SymmetricKeyPair) -> Self {
        Self { master, overview }
    }

    /// Unlock a profile with the user's password.
    ///
    /// A password that derives keys which fail to authenticate the
    /// profile's key envelopes is reported as `WrongPassword`.
    pub fn from_password(password: &[u8], profile: &Profile) -> Result<Self> {
        let derived = derive_key_pair(password, &profile.salt, profile.iterations)?;

        Self::from_derived(&derived, profile).map_err(|e| match e {
            OpVaultError::Authentication => {
                tracing::warn!(profile = %profile.uuid, "profile keys failed to authenticate");
                OpVaultError::WrongPassword
            }
            other => other,
        })
    }

    /// Unwrap the profile's master and overview key envelopes.
    pub(crate) fn from_derived(derived: &SymmetricKeyPair, profile: &Profile) -> Result<Self> {
        let master = opdata::decrypt(LABEL_PROFILE_KEY, &profile.master_key, derived)?
            .into_key_pair()?;
        let overview = opdata::decrypt(LABEL_PROFILE_KEY, &profile.overview_key, derived)?
            .into_key_pair()?;

        tracing::debug!(profile = %profile.uuid, "unlocked key hierarchy");
        Ok(Self { master, overview })
    }

    pub fn master(&self) -> &SymmetricKeyPair {
        &self.master
    }

    pub fn overview(&self) -> &SymmetricKeyPair {
        &self.overview
    }

    /// Wrap an item's key pair under this hierarchy's master keys.
    pub fn wrap_item_keys(&self, item_keys: &SymmetricKeyPair) -> Result<Envelope> {
        wrap_item_keys(&self.master, item_keys)
    }

    /// Recover an item's key pair from its wrapped envelope.
    pub fn unwrap_item_keys(&self, envelope: &Envelope) -> Result<SymmetricKeyPair> {
        unwrap_item_keys(&self.master, envelope)
    }
}

/// Stretch a password into the key pair that unlocks a profile.
///
/// 512 derived bits: the first 32 bytes encrypt, the last 32 authenticate.
pub fn derive_key_pair(password: &[u8], salt: &[u8], iterations: u32) -> Result<SymmetricKeyPair> {
    let bytes = kdf::derive(password, salt, iterations, KEY_PAIR_BITS)?;
    SymmetricKeyPair::from_slice(&bytes)
}

/// `encrypt("itemKey", enc || auth, master)`.
pub fn wrap_item_keys(master: &SymmetricKeyPair, item_keys: &SymmetricKeyPair) -> Result<Envelope> {
    let payload: Zeroizing<Vec<u8>> = item_keys.to_bytes();
    opdata::encrypt(LABEL_ITEM_KEY, &payload, master)
}

/// Inverse of [`wrap_item_keys`].
pub fn unwrap_item_keys(master: &SymmetricKeyPair, envelope: &Envelope) -> Result<SymmetricKeyPair> {
    opdata::decrypt(LABEL_ITEM_KEY, envelope, master)?.into_key_pair()
}
