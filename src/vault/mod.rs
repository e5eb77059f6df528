//! Vault module: key hierarchy, items and storage.
//!
//! This module provides:
//! - The master/overview/item key hierarchy (`keychain`)
//! - The password profile holding wrapped key material (`profile`)
//! - Lockable `VaultItem` records (`item`)
//! - Item integrity tags (`integrity`)
//! - JSON vault file format (`format`)
//! - High-level `VaultStore` for creating, opening, and managing vaults (`store`)

pub mod format;
pub mod integrity;
pub mod item;
pub mod keychain;
pub mod profile;
pub mod store;

// Re-export the most commonly used items.
pub use item::{Category, Details, Field, ItemUrl, LoginData, Overview, VaultItem};
pub use keychain::{unwrap_item_keys, wrap_item_keys, KeyHierarchy};
pub use profile::Profile;
pub use store::VaultStore;
