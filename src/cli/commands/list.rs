//! `opvault list`: display every item's overview in a table.
//!
//! Only overviews are decrypted; item keys and details stay locked.

use crate::cli::output::{self, ItemRow};
use crate::cli::{load_settings, prompt_password, vault_path, Cli};
use crate::errors::Result;
use crate::vault::VaultStore;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings()?;
    let path = vault_path(cli, &settings)?;

    let password = prompt_password()?;
    let mut store = VaultStore::open(&path, password.as_bytes())?;

    let (items, keys) = store.items_with_keys();
    let mut rows = Vec::new();
    for item in items {
        item.unlock_overview(keys)?;
        let Some(overview) = item.overview() else {
            continue;
        };
        rows.push(ItemRow {
            uuid: item.uuid().to_string(),
            category: item.category().name(),
            title: overview.title.clone(),
            username: overview.username.clone(),
            updated: item.updated(),
        });
    }

    output::info(&format!("{} item(s)", rows.len()));
    output::print_items_table(&rows);

    Ok(())
}
