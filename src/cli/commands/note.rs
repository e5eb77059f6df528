//! `opvault note`: add a secure note.

use crate::cli::output;
use crate::cli::{load_settings, prompt_password, vault_path, Cli};
use crate::errors::Result;
use crate::vault::{VaultItem, VaultStore};

/// Execute the `note` command.
pub fn execute(cli: &Cli, title: &str, body: &str) -> Result<()> {
    let settings = load_settings()?;
    let path = vault_path(cli, &settings)?;

    let password = prompt_password()?;
    let mut store = VaultStore::open(&path, password.as_bytes())?;

    let item = VaultItem::create_note(store.keys(), title, body)?;
    let uuid = item.uuid().to_string();

    store.add_item(item);
    store.save()?;

    output::success(&format!("Added secure note '{title}' ({uuid})"));

    Ok(())
}
