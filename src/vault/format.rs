//! On-disk vault file and its serde helpers.
//!
//! A vault file is a single JSON document:
//!
//! ```text
//! { "profile": { ... }, "items": [ { ... }, ... ] }
//! ```
//!
//! Binary fields (salt, envelopes, integrity tags) are base64 strings.
//! Items carry their own integrity tag, so the file itself has no outer
//! MAC.  Writes go through a temp file + rename so readers never see a
//! half-written vault.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::item::VaultItem;
use super::profile::Profile;
use crate::errors::{OpVaultError, Result};

/// Everything read back from a vault file.
#[derive(Debug, Deserialize)]
pub struct VaultFile {
    pub profile: Profile,
    #[serde(default)]
    pub items: Vec<VaultItem>,
}

/// Borrowed view used when writing, so items need not be cloned.
#[derive(Serialize)]
struct VaultFileRef<'a> {
    profile: &'a Profile,
    items: Vec<&'a VaultItem>,
}

/// Write a vault file to disk **atomically**.
///
/// 1. Serialize profile and items to pretty JSON.
/// 2. Write to a temp file in the same directory.
/// 3. Rename temp file over the target path.
pub fn write_vault<'a, I>(path: &Path, profile: &Profile, items: I) -> Result<()>
where
    I: IntoIterator<Item = &'a VaultItem>,
{
    let file = VaultFileRef {
        profile,
        items: items.into_iter().collect(),
    };
    let json = serde_json::to_vec_pretty(&file)
        .map_err(|e| OpVaultError::SerializationError(format!("vault: {e}")))?;

    let parent = path.parent().unwrap_or(Path::new("."));
    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, &json)?;
    fs::rename(&tmp_path, path)?;

    tracing::debug!(path = %path.display(), bytes = json.len(), "wrote vault file");
    Ok(())
}

/// Read and parse a vault file.
pub fn read_vault(path: &Path) -> Result<VaultFile> {
    if !path.exists() {
        return Err(OpVaultError::VaultNotFound(path.to_path_buf()));
    }

    let data = fs::read(path)?;
    let file: VaultFile = serde_json::from_slice(&data).map_err(|e| {
        OpVaultError::SerializationError(format!("{}: {e}", path.display()))
    })?;

    tracing::debug!(path = %path.display(), items = file.items.len(), "read vault file");
    Ok(file)
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded byte fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&BASE64.encode(data))
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}

/// Same as the helpers above, for `Option<Vec<u8>>` fields.
pub(crate) mod base64_opt {
    use super::BASE64;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(data: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match data {
            Some(bytes) => serializer.serialize_some(&BASE64.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| BASE64.decode(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
