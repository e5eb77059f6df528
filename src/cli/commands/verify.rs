//! `opvault verify`: check every item's integrity tag.

use crate::cli::output;
use crate::cli::{load_settings, prompt_password, vault_path, Cli};
use crate::errors::{OpVaultError, Result};
use crate::vault::VaultStore;

/// Execute the `verify` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings()?;
    let path = vault_path(cli, &settings)?;

    let password = prompt_password()?;
    let store = VaultStore::open(&path, password.as_bytes())?;

    let failed = store.verify_all();
    if failed.is_empty() {
        output::success(&format!("All {} item(s) verified", store.item_count()));
        return Ok(());
    }

    for uuid in &failed {
        output::warning(&format!("Item {uuid} failed its integrity check"));
    }
    Err(OpVaultError::IntegrityMismatch(failed.join(", ")))
}
