//! Item integrity tags.
//!
//! The envelopes authenticate their own contents, but not the metadata
//! around them (timestamps, category, which envelope belongs to which
//! item).  The tag is HMAC-SHA-256, keyed with the master authentication
//! key, over every persistent field except the tag itself:
//!
//! ```text
//! category001created1700000000d<base64>k<base64>o<base64>updated1700000000uuid<hex>
//! ```
//!
//! Fields are taken in sorted name order, each as its name followed by
//! its external rendering.  Absent optional fields (`folder`, `tx`) are
//! left out.

use subtle::ConstantTimeEq;

use super::item::VaultItem;
use crate::crypto::primitives;
use crate::errors::Result;

/// Length of an integrity tag in bytes.
pub const TAG_LEN: usize = 32;

/// The exact bytes the tag is computed over.
pub fn tag_input(item: &VaultItem) -> String {
    let mut fields: Vec<(&str, String)> = vec![
        ("category", item.category().code().to_string()),
        ("created", item.created().to_string()),
        ("d", item.details_envelope().to_base64()),
        ("k", item.key_envelope().to_base64()),
        ("o", item.overview_envelope().to_base64()),
        ("updated", item.updated().to_string()),
        ("uuid", item.uuid().to_string()),
    ];
    if let Some(folder) = item.folder() {
        fields.push(("folder", folder.to_string()));
    }
    if let Some(tx) = item.tx() {
        fields.push(("tx", tx.to_string()));
    }
    fields.sort_by(|a, b| a.0.cmp(b.0));

    fields.into_iter().fold(String::new(), |mut acc, (name, value)| {
        acc.push_str(name);
        acc.push_str(&value);
        acc
    })
}

/// Keyed digest over the item's persistent fields.
pub fn compute_tag(item: &VaultItem, master_auth_key: &[u8]) -> Result<[u8; TAG_LEN]> {
    primitives::keyed_hash(master_auth_key, tag_input(item).as_bytes())
}

/// Recompute the tag and compare it with the stored one in constant time.
///
/// An item without a stored tag never verifies.
pub fn verify_tag(item: &VaultItem, master_auth_key: &[u8]) -> bool {
    let Some(stored) = item.hmac() else {
        return false;
    };
    let Ok(expected) = compute_tag(item, master_auth_key) else {
        return false;
    };

    let ok: bool = expected[..].ct_eq(stored).into();
    if !ok {
        tracing::warn!(uuid = %item.uuid(), "item integrity tag mismatch");
    }
    ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::SymmetricKeyPair;
    use crate::vault::keychain::KeyHierarchy;

    #[test]
    fn tag_input_is_sorted_name_value_pairs() {
        let keys = KeyHierarchy::new(SymmetricKeyPair::generate(), SymmetricKeyPair::generate());
        let item = VaultItem::create_note(&keys, "t", "b").unwrap();
        let input = tag_input(&item);

        assert!(input.starts_with("category003created"));
        let d = input.find(&format!("d{}", item.details_envelope().to_base64())).unwrap();
        let k = input.find(&format!("k{}", item.key_envelope().to_base64())).unwrap();
        let o = input.find(&format!("o{}", item.overview_envelope().to_base64())).unwrap();
        assert!(d < k && k < o);
        assert!(input.ends_with(&format!("uuid{}", item.uuid())));
    }

    #[test]
    fn tag_depends_on_key() {
        let keys = KeyHierarchy::new(SymmetricKeyPair::generate(), SymmetricKeyPair::generate());
        let item = VaultItem::create_note(&keys, "t", "b").unwrap();

        assert!(verify_tag(&item, keys.master().authentication_key()));
        assert!(!verify_tag(&item, &[0u8; 32]));
    }
}
