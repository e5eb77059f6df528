//! Vault items and their lock/unlock lifecycle.
//!
//! An item persists three envelopes:
//!
//! - `k`: the item's own key pair, wrapped under the master keys
//! - `d`: details JSON (fields, notes), encrypted under the item keys
//! - `o`: overview JSON (title, URLs), encrypted under the overview keys
//!
//! Decrypted keys, details and overview are held only between an unlock
//! and the matching lock, and are never serialized.  Every lock
//! re-encrypts with a fresh IV and padding and refreshes the integrity
//! tag, but only for an item whose stored tag verified when it was
//! unlocked.  A lock on an item that failed that check discards the
//! plaintext and returns `IntegrityMismatch`, leaving the stored tag as is.

use std::fmt;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use super::format::base64_opt;
use super::integrity;
use super::keychain::KeyHierarchy;
use super::profile::new_uuid;
use crate::crypto::keys::SymmetricKeyPair;
use crate::crypto::opdata::{self, Envelope, LABEL_ITEM};
use crate::errors::{OpVaultError, Result};

/// Length of the note preview kept in a secure note's overview.
const NOTE_PREVIEW_CHARS: usize = 80;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Closed set of item variants, persisted as their category code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "001")]
    Login,
    #[serde(rename = "003")]
    SecureNote,
}

impl Category {
    pub fn code(self) -> &'static str {
        match self {
            Self::Login => "001",
            Self::SecureNote => "003",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::SecureNote => "Secure Note",
        }
    }

    /// The overview preview derived from a note body, for variants that
    /// keep one.
    pub fn notes_preview(self, body: &str) -> Option<String> {
        match self {
            Self::Login => None,
            Self::SecureNote => Some(body.chars().take(NOTE_PREVIEW_CHARS).collect()),
        }
    }
}

// ---------------------------------------------------------------------------
// Decrypted content
// ---------------------------------------------------------------------------

/// One entry of an item's details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
pub struct Field {
    /// Field type code: `T` text, `P` password, ...
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub designation: String,
}

impl Field {
    pub fn new(kind: &str, name: &str, value: &str, designation: &str) -> Self {
        Self {
            kind: kind.to_string(),
            name: name.to_string(),
            value: value.to_string(),
            designation: designation.to_string(),
        }
    }
}

/// Secret content of an item, encrypted under the item keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Zeroize)]
pub struct Details {
    #[serde(default)]
    pub fields: Vec<Field>,

    #[serde(rename = "notesPlain", default)]
    pub notes_plain: String,

    /// Keys this crate does not model, carried through unchanged.
    #[serde(flatten)]
    #[zeroize(skip)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Details {
    /// Value of the first field with the given designation.
    pub fn designated(&self, designation: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.designation == designation)
            .map(|f| f.value.as_str())
    }
}

/// A labelled URL in an overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUrl {
    #[serde(rename = "l", default)]
    pub label: String,
    #[serde(rename = "u")]
    pub url: String,
}

/// Browsable metadata of an item, encrypted under the overview keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    #[serde(default)]
    pub title: String,

    #[serde(rename = "ainfo", default)]
    pub username: String,

    #[serde(default)]
    pub url: String,

    #[serde(rename = "URLS", default)]
    pub urls: Vec<ItemUrl>,

    /// Leading part of a secure note's body.
    #[serde(rename = "notesPlain", default, skip_serializing_if = "Option::is_none")]
    pub notes_preview: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Input for [`VaultItem::create_login`].
#[derive(Debug, Clone, Default)]
pub struct LoginData {
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: String,
    pub notes: String,
}

// ---------------------------------------------------------------------------
// VaultItem
// ---------------------------------------------------------------------------

/// A persisted vault record plus its transient decrypted state.
#[derive(Clone, Serialize, Deserialize)]
pub struct VaultItem {
    uuid: String,
    category: Category,
    created: i64,
    updated: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    tx: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    folder: Option<String>,

    k: Envelope,
    d: Envelope,
    o: Envelope,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "base64_opt")]
    hmac: Option<Vec<u8>>,

    #[serde(skip)]
    item_keys: Option<SymmetricKeyPair>,

    #[serde(skip)]
    details: Option<Details>,

    #[serde(skip)]
    overview: Option<Overview>,

    /// Whether the stored tag matched the metadata when first unlocked.
    #[serde(skip)]
    tag_verified: bool,
}

impl VaultItem {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a login item.  The item comes back fully locked.
    pub fn create_login(keys: &KeyHierarchy, data: &LoginData) -> Result<Self> {
        let overview = Overview {
            title: data.title.clone(),
            username: data.username.clone(),
            url: data.url.clone(),
            urls: vec![ItemUrl {
                label: "website".to_string(),
                url: data.url.clone(),
            }],
            ..Overview::default()
        };
        let details = Details {
            fields: vec![
                Field::new("T", "username", &data.username, "username"),
                Field::new("P", "password", &data.password, "password"),
            ],
            notes_plain: data.notes.clone(),
            ..Details::default()
        };

        Self::create(keys, Category::Login, overview, details)
    }

    /// Create a secure note.  The item comes back fully locked.
    pub fn create_note(keys: &KeyHierarchy, title: &str, body: &str) -> Result<Self> {
        let overview = Overview {
            title: title.to_string(),
            notes_preview: Category::SecureNote.notes_preview(body),
            ..Overview::default()
        };
        let details = Details {
            notes_plain: body.to_string(),
            ..Details::default()
        };

        Self::create(keys, Category::SecureNote, overview, details)
    }

    fn create(
        keys: &KeyHierarchy,
        category: Category,
        overview: Overview,
        mut details: Details,
    ) -> Result<Self> {
        let item_keys = SymmetricKeyPair::generate();
        let now = Utc::now().timestamp();

        let k = keys.wrap_item_keys(&item_keys)?;
        let d = encrypt_json(&details, &item_keys);
        details.zeroize();
        let o = encrypt_json(&overview, keys.overview())?;

        let mut item = Self {
            uuid: new_uuid(),
            category,
            created: now,
            updated: now,
            tx: None,
            folder: None,
            k,
            d: d?,
            o,
            hmac: None,
            item_keys: None,
            details: None,
            overview: None,
            tag_verified: false,
        };
        item.seal(keys.master())?;

        tracing::debug!(uuid = %item.uuid, category = category.code(), "created item");
        Ok(item)
    }

    /// Load an item from its serialized form.  All parts start locked.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| OpVaultError::InvalidItem(format!("item JSON: {e}")))
    }

    /// Serialized form: persistent fields only.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| OpVaultError::SerializationError(format!("item: {e}")))
    }

    // ------------------------------------------------------------------
    // Overview
    // ------------------------------------------------------------------

    /// Decrypt `o` under the overview keys.
    ///
    /// An already unlocked overview is returned as is, pending edits included.
    pub fn unlock_overview(&mut self, keys: &KeyHierarchy) -> Result<&Overview> {
        if self.overview.is_some() {
            return self.overview.as_ref().ok_or(OpVaultError::ItemLocked("overview"));
        }
        self.check_tag(keys);

        let overview: Overview = decrypt_json(&self.o, keys.overview())?;
        tracing::debug!(uuid = %self.uuid, "unlocked overview");
        Ok(self.overview.insert(overview))
    }

    /// Re-encrypt the current overview into `o` and drop the plaintext.
    pub fn lock_overview(&mut self, keys: &KeyHierarchy) -> Result<()> {
        if self.overview.is_none() {
            return Err(OpVaultError::ItemLocked("overview"));
        }
        self.ensure_tag_verified()?;

        let overview = self.overview.as_ref().ok_or(OpVaultError::ItemLocked("overview"))?;
        self.o = encrypt_json(overview, keys.overview())?;
        self.overview = None;
        self.seal(keys.master())?;
        tracing::debug!(uuid = %self.uuid, "locked overview");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Item keys
    // ------------------------------------------------------------------

    /// Unwrap `k` under the master keys.
    pub fn unlock_keys(&mut self, keys: &KeyHierarchy) -> Result<()> {
        if self.item_keys.is_some() {
            return Ok(());
        }
        self.check_tag(keys);

        self.item_keys = Some(keys.unwrap_item_keys(&self.k)?);
        tracing::debug!(uuid = %self.uuid, "unlocked item keys");
        Ok(())
    }

    /// Re-wrap the item keys into a fresh `k` and drop them.
    pub fn lock_keys(&mut self, keys: &KeyHierarchy) -> Result<()> {
        if self.item_keys.is_none() {
            return Err(OpVaultError::ItemLocked("keys"));
        }
        self.ensure_tag_verified()?;

        let item_keys = self.item_keys.as_ref().ok_or(OpVaultError::ItemLocked("keys"))?;
        self.k = keys.wrap_item_keys(item_keys)?;
        self.item_keys = None;
        self.seal(keys.master())?;
        tracing::debug!(uuid = %self.uuid, "locked item keys");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Details
    // ------------------------------------------------------------------

    /// Decrypt `d`, unlocking the item keys first when needed.
    ///
    /// Already unlocked details are returned as is, pending edits included.
    pub fn unlock_details(&mut self, keys: &KeyHierarchy) -> Result<&Details> {
        if self.details.is_some() {
            return self.details.as_ref().ok_or(OpVaultError::ItemLocked("details"));
        }
        self.unlock_keys(keys)?;
        self.check_tag(keys);

        let item_keys = self.item_keys.as_ref().ok_or(OpVaultError::ItemLocked("keys"))?;
        let details: Details = decrypt_json(&self.d, item_keys)?;
        tracing::debug!(uuid = %self.uuid, "unlocked details");
        Ok(self.details.insert(details))
    }

    /// Re-encrypt the current details into `d` and drop the plaintext.
    ///
    /// Item keys unwrapped only for this call are discarded again
    /// afterwards; `k` is left as it was.
    pub fn lock_details(&mut self, keys: &KeyHierarchy) -> Result<()> {
        if self.details.is_none() {
            return Err(OpVaultError::ItemLocked("details"));
        }
        self.ensure_tag_verified()?;

        let details = self.details.as_ref().ok_or(OpVaultError::ItemLocked("details"))?;

        let d = match &self.item_keys {
            Some(item_keys) => encrypt_json(details, item_keys)?,
            None => {
                let item_keys = keys.unwrap_item_keys(&self.k)?;
                encrypt_json(details, &item_keys)?
            }
        };

        self.d = d;
        if let Some(mut details) = self.details.take() {
            details.zeroize();
        }
        self.seal(keys.master())?;
        tracing::debug!(uuid = %self.uuid, "locked details");
        Ok(())
    }

    /// Lock keys, details and overview, skipping parts already locked.
    pub fn lock(&mut self, keys: &KeyHierarchy) -> Result<()> {
        skip_locked(self.lock_keys(keys))?;
        skip_locked(self.lock_details(keys))?;
        skip_locked(self.lock_overview(keys))
    }

    // ------------------------------------------------------------------
    // Content mutation
    // ------------------------------------------------------------------

    /// Edit unlocked details in place; bumps `updated`.
    pub fn update_details<F>(&mut self, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Details),
    {
        let details = self.details.as_mut().ok_or(OpVaultError::ItemLocked("details"))?;
        edit(details);
        self.touch();
        Ok(())
    }

    /// Edit the unlocked overview in place; bumps `updated`.
    pub fn update_overview<F>(&mut self, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Overview),
    {
        let overview = self.overview.as_mut().ok_or(OpVaultError::ItemLocked("overview"))?;
        edit(overview);
        self.touch();
        Ok(())
    }

    /// Replace the note body.
    ///
    /// Secure notes also refresh their overview preview, which therefore
    /// must be unlocked too.
    pub fn set_notes(&mut self, body: &str) -> Result<()> {
        let preview = self.category.notes_preview(body);
        if preview.is_some() && self.overview.is_none() {
            return Err(OpVaultError::ItemLocked("overview"));
        }
        let details = self.details.as_mut().ok_or(OpVaultError::ItemLocked("details"))?;

        details.notes_plain.zeroize();
        details.notes_plain = body.to_string();
        if let (Some(preview), Some(overview)) = (preview, self.overview.as_mut()) {
            overview.notes_preview = Some(preview);
        }
        self.touch();
        Ok(())
    }

    /// Case-insensitive substring match on the unlocked overview title.
    pub fn matches(&self, query: &str) -> bool {
        self.overview.as_ref().is_some_and(|o| {
            o.title
                .to_lowercase()
                .contains(&query.to_lowercase())
        })
    }

    // ------------------------------------------------------------------
    // Integrity
    // ------------------------------------------------------------------

    /// Recompute and store the integrity tag.
    ///
    /// Callers must have established that the current metadata is
    /// authentic: either the item was just created, or its stored tag
    /// verified at unlock.
    pub(crate) fn seal(&mut self, master: &SymmetricKeyPair) -> Result<()> {
        let tag = integrity::compute_tag(self, master.authentication_key())?;
        self.hmac = Some(tag.to_vec());
        self.tag_verified = true;
        Ok(())
    }

    /// Record whether the stored tag matches, once per unlock session.
    fn check_tag(&mut self, keys: &KeyHierarchy) {
        if !self.tag_verified {
            self.tag_verified = self.verify(keys.master());
        }
    }

    /// Refuse to re-seal metadata that never verified.
    ///
    /// The plaintext of every unlocked part is discarded first, so a
    /// failed lock still leaves the item locked.
    fn ensure_tag_verified(&mut self) -> Result<()> {
        if self.tag_verified {
            return Ok(());
        }

        self.item_keys = None;
        if let Some(mut details) = self.details.take() {
            details.zeroize();
        }
        self.overview = None;

        tracing::warn!(uuid = %self.uuid, "refusing to re-seal item with a bad integrity tag");
        Err(OpVaultError::IntegrityMismatch(self.uuid.clone()))
    }

    /// Check the stored integrity tag.
    pub fn verify(&self, master: &SymmetricKeyPair) -> bool {
        integrity::verify_tag(self, master.authentication_key())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn created(&self) -> i64 {
        self.created
    }

    pub fn updated(&self) -> i64 {
        self.updated
    }

    pub fn tx(&self) -> Option<u64> {
        self.tx
    }

    pub fn folder(&self) -> Option<&str> {
        self.folder.as_deref()
    }

    pub fn key_envelope(&self) -> &Envelope {
        &self.k
    }

    pub fn details_envelope(&self) -> &Envelope {
        &self.d
    }

    pub fn overview_envelope(&self) -> &Envelope {
        &self.o
    }

    pub fn hmac(&self) -> Option<&[u8]> {
        self.hmac.as_deref()
    }

    pub fn keys_unlocked(&self) -> bool {
        self.item_keys.is_some()
    }

    pub fn details_unlocked(&self) -> bool {
        self.details.is_some()
    }

    pub fn overview_unlocked(&self) -> bool {
        self.overview.is_some()
    }

    pub fn details(&self) -> Option<&Details> {
        self.details.as_ref()
    }

    pub fn overview(&self) -> Option<&Overview> {
        self.overview.as_ref()
    }

    fn touch(&mut self) {
        // Keep `updated` strictly increasing even within one second.
        self.updated = Utc::now().timestamp().max(self.updated + 1);
    }
}

impl fmt::Debug for VaultItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultItem")
            .field("uuid", &self.uuid)
            .field("category", &self.category)
            .field("created", &self.created)
            .field("updated", &self.updated)
            .field("keys_unlocked", &self.keys_unlocked())
            .field("details_unlocked", &self.details_unlocked())
            .field("overview_unlocked", &self.overview_unlocked())
            .finish_non_exhaustive()
    }
}

fn skip_locked(result: Result<()>) -> Result<()> {
    match result {
        Err(OpVaultError::ItemLocked(_)) => Ok(()),
        other => other,
    }
}

fn encrypt_json<T: Serialize>(value: &T, keys: &SymmetricKeyPair) -> Result<Envelope> {
    let json = Zeroizing::new(
        serde_json::to_vec(value)
            .map_err(|e| OpVaultError::SerializationError(format!("item content: {e}")))?,
    );
    opdata::encrypt(LABEL_ITEM, &json, keys)
}

fn decrypt_json<T: DeserializeOwned>(envelope: &Envelope, keys: &SymmetricKeyPair) -> Result<T> {
    let json = opdata::decrypt(LABEL_ITEM, envelope, keys)?.into_bytes()?;
    serde_json::from_slice(&json)
        .map_err(|e| OpVaultError::InvalidItem(format!("decrypted content is not valid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> KeyHierarchy {
        KeyHierarchy::new(SymmetricKeyPair::generate(), SymmetricKeyPair::generate())
    }

    #[test]
    fn note_preview_is_first_80_chars() {
        let body = "é".repeat(100);
        let preview = Category::SecureNote.notes_preview(&body).unwrap();
        assert_eq!(preview.chars().count(), 80);
        assert!(Category::Login.notes_preview(&body).is_none());
    }

    #[test]
    fn category_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Category::Login).unwrap(), "\"001\"");
        assert_eq!(serde_json::to_string(&Category::SecureNote).unwrap(), "\"003\"");
        assert!(serde_json::from_str::<Category>("\"099\"").is_err());
    }

    #[test]
    fn overview_uses_wire_names() {
        let overview = Overview {
            title: "Bank".into(),
            username: "alice".into(),
            url: "https://bank.example".into(),
            urls: vec![ItemUrl {
                label: "website".into(),
                url: "https://bank.example".into(),
            }],
            ..Overview::default()
        };
        let json = serde_json::to_value(&overview).unwrap();
        assert_eq!(json["ainfo"], "alice");
        assert_eq!(json["URLS"][0]["l"], "website");
        assert_eq!(json["URLS"][0]["u"], "https://bank.example");
        assert!(json.get("notesPlain").is_none());
    }

    #[test]
    fn unknown_detail_keys_survive_a_lock_cycle() {
        let keys = keys();
        let mut item = VaultItem::create_note(&keys, "n", "body").unwrap();
        item.unlock_details(&keys).unwrap();
        item.update_details(|d| {
            d.extra
                .insert("sections".into(), serde_json::json!([{"name": "extra"}]));
        })
        .unwrap();
        item.lock_details(&keys).unwrap();

        let details = item.unlock_details(&keys).unwrap();
        assert_eq!(details.extra["sections"][0]["name"], "extra");
    }

    #[test]
    fn lock_details_without_unlocked_keys_leaves_keys_locked() {
        let keys = keys();
        let mut item = VaultItem::create_note(&keys, "n", "body").unwrap();
        item.unlock_details(&keys).unwrap();
        item.lock_keys(&keys).unwrap();

        let k_before = item.key_envelope().clone();
        item.lock_details(&keys).unwrap();

        assert!(!item.keys_unlocked());
        assert!(!item.details_unlocked());
        assert_eq!(item.key_envelope(), &k_before);
    }

    #[test]
    fn set_notes_on_login_does_not_need_overview() {
        let keys = keys();
        let mut item = VaultItem::create_login(&keys, &LoginData::default()).unwrap();
        item.unlock_details(&keys).unwrap();
        item.set_notes("remember me").unwrap();
        assert_eq!(item.details().unwrap().notes_plain, "remember me");
    }

    #[test]
    fn debug_hides_content() {
        let keys = keys();
        let mut item = VaultItem::create_note(&keys, "title", "very secret body").unwrap();
        item.unlock_details(&keys).unwrap();
        let shown = format!("{item:?}");
        assert!(!shown.contains("very secret body"));
        assert!(shown.contains("details_unlocked: true"));
    }
}
