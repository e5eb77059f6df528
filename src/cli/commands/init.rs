//! `opvault init`: create a new, empty vault.

use crate::cli::output;
use crate::cli::{load_settings, prompt_new_password, vault_path, Cli};
use crate::errors::{OpVaultError, Result};
use crate::vault::VaultStore;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings()?;
    let path = vault_path(cli, &settings)?;

    // Bail out before prompting if the vault is already there.
    if path.exists() {
        output::tip("Use `opvault add` to add items to the existing vault.");
        return Err(OpVaultError::VaultAlreadyExists(path));
    }

    let password = prompt_new_password()?;
    let store = VaultStore::create(&path, password.as_bytes(), settings.pbkdf2_iterations)?;

    output::success(&format!(
        "Vault created at {} ({} PBKDF2 iterations)",
        store.path().display(),
        store.profile().iterations
    ));
    output::tip("Run `opvault add <TITLE>` to add a login.");
    output::tip("Run `opvault note <TITLE> <BODY>` to add a secure note.");

    Ok(())
}
