//! `opvault show`: print one item after checking its integrity tag.

use crate::cli::output;
use crate::cli::{load_settings, prompt_password, vault_path, Cli};
use crate::errors::{OpVaultError, Result};
use crate::vault::{Category, VaultStore};

/// Execute the `show` command.
pub fn execute(cli: &Cli, uuid_prefix: &str, reveal: bool) -> Result<()> {
    let settings = load_settings()?;
    let path = vault_path(cli, &settings)?;

    let password = prompt_password()?;
    let mut store = VaultStore::open(&path, password.as_bytes())?;

    let uuid = store.resolve(uuid_prefix)?;
    let (item, keys) = store.item_with_keys(&uuid)?;

    // Never decrypt an item whose metadata may have been tampered with.
    if !item.verify(keys.master()) {
        return Err(OpVaultError::IntegrityMismatch(uuid));
    }

    item.unlock_overview(keys)?;
    item.unlock_details(keys)?;
    let overview = item.overview().ok_or(OpVaultError::ItemLocked("overview"))?;
    let details = item.details().ok_or(OpVaultError::ItemLocked("details"))?;

    output::field("uuid", &uuid);
    output::field("type", item.category().name());
    output::field("title", &overview.title);

    if item.category() == Category::Login {
        output::field("username", &overview.username);
        if !overview.url.is_empty() {
            output::field("url", &overview.url);
        }
        let secret = details.designated("password").unwrap_or_default();
        if reveal {
            output::field("password", secret);
        } else if !secret.is_empty() {
            output::field("password", "********");
        }
    }

    if !details.notes_plain.is_empty() {
        output::field("notes", &details.notes_plain);
    }

    output::field("created", &output::timestamp(item.created()));
    output::field("updated", &output::timestamp(item.updated()));

    if item.category() == Category::Login && !reveal {
        output::tip("Pass --reveal to print the password.");
    }

    Ok(())
}
