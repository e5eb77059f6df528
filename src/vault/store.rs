//! High-level vault operations used by CLI commands.
//!
//! `VaultStore` wraps the file format layer and the key hierarchy so the
//! rest of the application can work with simple calls like
//! `store.add_item(item)` and `store.save()`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;

use super::format;
use super::item::VaultItem;
use super::keychain::KeyHierarchy;
use super::profile::Profile;
use crate::errors::{OpVaultError, Result};

/// The main vault handle.  Create one with `VaultStore::create` or
/// `VaultStore::open`, then use its methods to manage items.
pub struct VaultStore {
    /// Path to the vault file on disk.
    path: PathBuf,

    /// Salt, iterations and wrapped profile keys.
    profile: Profile,

    /// Items keyed by uuid (sorted, so saves are deterministic).
    items: BTreeMap<String, VaultItem>,

    /// Unlocked master and overview keys (zeroized on drop).
    keys: KeyHierarchy,
}

impl VaultStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a brand-new, empty vault at `path`.
    pub fn create(path: &Path, password: &[u8], iterations: u32) -> Result<Self> {
        if path.exists() {
            return Err(OpVaultError::VaultAlreadyExists(path.to_path_buf()));
        }

        let (profile, keys) = Profile::create(password, iterations)?;

        let mut store = Self {
            path: path.to_path_buf(),
            profile,
            items: BTreeMap::new(),
            keys,
        };
        store.save()?;

        tracing::debug!(path = %path.display(), "created vault");
        Ok(store)
    }

    /// Open an existing vault and unlock its key hierarchy.
    ///
    /// Item integrity is not checked here; use `verify_all` or
    /// `VaultItem::verify` before trusting an item.
    pub fn open(path: &Path, password: &[u8]) -> Result<Self> {
        let file = format::read_vault(path)?;
        let keys = file.profile.unlock(password)?;

        let items = file
            .items
            .into_iter()
            .map(|item| (item.uuid().to_string(), item))
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            profile: file.profile,
            items,
            keys,
        })
    }

    // ------------------------------------------------------------------
    // Item operations
    // ------------------------------------------------------------------

    pub fn add_item(&mut self, item: VaultItem) {
        self.items.insert(item.uuid().to_string(), item);
    }

    pub fn item(&self, uuid: &str) -> Result<&VaultItem> {
        self.items
            .get(uuid)
            .ok_or_else(|| OpVaultError::ItemNotFound(uuid.to_string()))
    }

    pub fn item_mut(&mut self, uuid: &str) -> Result<&mut VaultItem> {
        self.items
            .get_mut(uuid)
            .ok_or_else(|| OpVaultError::ItemNotFound(uuid.to_string()))
    }

    pub fn remove_item(&mut self, uuid: &str) -> Result<VaultItem> {
        self.items
            .remove(uuid)
            .ok_or_else(|| OpVaultError::ItemNotFound(uuid.to_string()))
    }

    /// Resolve a uuid prefix (case-insensitive) to a single item uuid.
    pub fn resolve(&self, prefix: &str) -> Result<String> {
        let prefix = prefix.to_ascii_uppercase();
        let mut matches = self.items.keys().filter(|uuid| uuid.starts_with(&prefix));

        match (matches.next(), matches.next()) {
            (Some(uuid), None) => Ok(uuid.clone()),
            (Some(_), Some(_)) => Err(OpVaultError::CommandFailed(format!(
                "'{prefix}' matches more than one item"
            ))),
            (None, _) => Err(OpVaultError::ItemNotFound(prefix.clone())),
        }
    }

    /// All items, sorted by uuid.
    pub fn items(&self) -> impl Iterator<Item = &VaultItem> {
        self.items.values()
    }

    /// An item together with the keys that unlock it.
    pub fn item_with_keys(&mut self, uuid: &str) -> Result<(&mut VaultItem, &KeyHierarchy)> {
        let item = self
            .items
            .get_mut(uuid)
            .ok_or_else(|| OpVaultError::ItemNotFound(uuid.to_string()))?;
        Ok((item, &self.keys))
    }

    /// All items (sorted by uuid) together with the keys that unlock them.
    pub fn items_with_keys(&mut self) -> (impl Iterator<Item = &mut VaultItem>, &KeyHierarchy) {
        (self.items.values_mut(), &self.keys)
    }

    /// Uuids of items whose integrity tag does not verify.
    pub fn verify_all(&self) -> Vec<String> {
        self.items
            .values()
            .filter(|item| !item.verify(self.keys.master()))
            .map(|item| item.uuid().to_string())
            .collect()
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Lock every item (re-encrypting pending edits) and write the vault
    /// to disk atomically.
    pub fn save(&mut self) -> Result<()> {
        for item in self.items.values_mut() {
            item.lock(&self.keys)?;
        }
        self.profile.updated_at = Utc::now().timestamp();

        format::write_vault(&self.path, &self.profile, self.items.values())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn keys(&self) -> &KeyHierarchy {
        &self.keys
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}
