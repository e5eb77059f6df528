//! Integration tests for the OpVault store: profile, persistence, integrity.

use std::fs;

use opvault::errors::OpVaultError;
use opvault::vault::{LoginData, VaultItem, VaultStore};
use tempfile::TempDir;

/// Low iteration count so tests stay fast.
const ITERATIONS: u32 = 10;

/// Helper: create a temporary vault file path inside a fresh temp dir.
fn vault_path() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("test.opvault");
    (dir, path)
}

/// Helper: add a login to `store` and return its uuid.
fn add_login(store: &mut VaultStore, title: &str, password: &str) -> String {
    let data = LoginData {
        title: title.into(),
        username: "alice".into(),
        password: password.into(),
        ..LoginData::default()
    };
    let item = VaultItem::create_login(store.keys(), &data).unwrap();
    let uuid = item.uuid().to_string();
    store.add_item(item);
    uuid
}

// ---------------------------------------------------------------------------
// Create and re-open round-trip
// ---------------------------------------------------------------------------

#[test]
fn create_vault_and_reopen() {
    let (_dir, path) = vault_path();
    let password = b"test-password";

    let mut store = VaultStore::create(&path, password, ITERATIONS).expect("create vault");
    let uuid = add_login(&mut store, "Mail", "s3cret!");
    store.save().unwrap();

    let mut reopened = VaultStore::open(&path, password).expect("open vault");
    assert_eq!(reopened.item_count(), 1);
    assert_eq!(reopened.profile().iterations, ITERATIONS);
    assert_eq!(reopened.keys().master(), store.keys().master());

    let (item, keys) = reopened.item_with_keys(&uuid).unwrap();
    assert_eq!(item.unlock_overview(keys).unwrap().title, "Mail");
    assert_eq!(
        item.unlock_details(keys).unwrap().designated("password"),
        Some("s3cret!")
    );
}

#[test]
fn wrong_password_is_rejected() {
    let (_dir, path) = vault_path();
    VaultStore::create(&path, b"correct-password", ITERATIONS).unwrap();

    let result = VaultStore::open(&path, b"wrong-password");
    assert!(matches!(result, Err(OpVaultError::WrongPassword)));
}

#[test]
fn create_refuses_to_overwrite() {
    let (_dir, path) = vault_path();
    VaultStore::create(&path, b"password", ITERATIONS).unwrap();

    let result = VaultStore::create(&path, b"password", ITERATIONS);
    assert!(matches!(result, Err(OpVaultError::VaultAlreadyExists(_))));
}

#[test]
fn open_missing_vault_fails() {
    let (_dir, path) = vault_path();

    let result = VaultStore::open(&path, b"password");
    assert!(matches!(result, Err(OpVaultError::VaultNotFound(_))));
}

#[test]
fn create_makes_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("v.opvault");

    VaultStore::create(&path, b"password", ITERATIONS).unwrap();
    assert!(path.exists());
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn saved_file_holds_no_plaintext() {
    let (_dir, path) = vault_path();
    let mut store = VaultStore::create(&path, b"password", ITERATIONS).unwrap();
    add_login(&mut store, "Very Secret Title", "plaintext-password");

    // Leave the item unlocked; save must lock it.
    let uuid = store.items().next().unwrap().uuid().to_string();
    let (item, keys) = store.item_with_keys(&uuid).unwrap();
    item.unlock_overview(keys).unwrap();
    item.unlock_details(keys).unwrap();
    store.save().unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(!contents.contains("Very Secret Title"));
    assert!(!contents.contains("plaintext-password"));
    assert!(contents.contains("\"profile\""));
    assert!(contents.contains("\"masterKey\""));

    assert!(store.items().all(|i| !i.details_unlocked() && !i.overview_unlocked()));
}

#[test]
fn edits_persist_across_save() {
    let (_dir, path) = vault_path();
    let mut store = VaultStore::create(&path, b"password", ITERATIONS).unwrap();
    let uuid = add_login(&mut store, "Old", "pw");

    let (item, keys) = store.item_with_keys(&uuid).unwrap();
    item.unlock_overview(keys).unwrap();
    item.update_overview(|o| o.title = "New".into()).unwrap();
    store.save().unwrap();

    let mut reopened = VaultStore::open(&path, b"password").unwrap();
    assert!(reopened.verify_all().is_empty());
    let (item, keys) = reopened.item_with_keys(&uuid).unwrap();
    assert_eq!(item.unlock_overview(keys).unwrap().title, "New");
}

#[test]
fn remove_item_drops_it_from_the_file() {
    let (_dir, path) = vault_path();
    let mut store = VaultStore::create(&path, b"password", ITERATIONS).unwrap();
    let keep = add_login(&mut store, "Keep", "a");
    let drop = add_login(&mut store, "Drop", "b");

    store.remove_item(&drop).unwrap();
    store.save().unwrap();

    let reopened = VaultStore::open(&path, b"password").unwrap();
    assert_eq!(reopened.item_count(), 1);
    assert!(reopened.item(&keep).is_ok());
    assert!(matches!(
        reopened.item(&drop),
        Err(OpVaultError::ItemNotFound(_))
    ));
}

#[test]
fn item_mut_edits_in_place() {
    let (_dir, path) = vault_path();
    let mut store = VaultStore::create(&path, b"password", ITERATIONS).unwrap();
    let uuid = add_login(&mut store, "Title", "pw");
    let keys = store.keys().clone();

    let item = store.item_mut(&uuid).unwrap();
    item.unlock_details(&keys).unwrap();
    item.set_notes("remember me").unwrap();
    assert!(store.item(&uuid).unwrap().details_unlocked());

    store.save().unwrap();
    assert!(!store.item(&uuid).unwrap().details_unlocked());
    assert!(store.verify_all().is_empty());
}

#[test]
fn resolve_accepts_unique_lowercase_prefix() {
    let (_dir, path) = vault_path();
    let mut store = VaultStore::create(&path, b"password", ITERATIONS).unwrap();
    let uuid = add_login(&mut store, "Only", "pw");

    let prefix = uuid[..6].to_ascii_lowercase();
    assert_eq!(store.resolve(&prefix).unwrap(), uuid);
    assert!(store.resolve("not-a-uuid").is_err());
}

// ---------------------------------------------------------------------------
// Integrity
// ---------------------------------------------------------------------------

#[test]
fn verify_all_flags_tampered_items() {
    let (_dir, path) = vault_path();
    let mut store = VaultStore::create(&path, b"password", ITERATIONS).unwrap();
    let good = add_login(&mut store, "Good", "a");
    let bad = add_login(&mut store, "Bad", "b");
    store.save().unwrap();

    // Bump the `created` timestamp of one item directly in the file.
    let mut value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    for item in value["items"].as_array_mut().unwrap() {
        if item["uuid"] == serde_json::json!(bad) {
            item["created"] = serde_json::json!(0);
        }
    }
    fs::write(&path, value.to_string()).unwrap();

    let reopened = VaultStore::open(&path, b"password").unwrap();
    assert_eq!(reopened.verify_all(), vec![bad.clone()]);
    assert!(reopened.item(&good).unwrap().verify(reopened.keys().master()));
}

#[test]
fn save_does_not_reseal_tampered_items() {
    let (_dir, path) = vault_path();
    let mut store = VaultStore::create(&path, b"password", ITERATIONS).unwrap();
    let uuid = add_login(&mut store, "Bank", "pw");
    store.save().unwrap();

    let mut value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    value["items"][0]["created"] = serde_json::json!(1);
    fs::write(&path, value.to_string()).unwrap();

    let mut reopened = VaultStore::open(&path, b"password").unwrap();
    let (item, keys) = reopened.item_with_keys(&uuid).unwrap();
    item.unlock_overview(keys).unwrap();

    assert!(matches!(
        reopened.save(),
        Err(OpVaultError::IntegrityMismatch(_))
    ));
    assert_eq!(reopened.verify_all(), vec![uuid]);
}
