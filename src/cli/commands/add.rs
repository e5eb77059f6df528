//! `opvault add`: add a login item.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{load_settings, prompt_password, vault_path, Cli};
use crate::crypto::password;
use crate::errors::Result;
use crate::vault::{LoginData, VaultItem, VaultStore};

/// Execute the `add` command.
pub fn execute(
    cli: &Cli,
    title: &str,
    username: &str,
    url: &str,
    login_password: Option<&str>,
    notes: &str,
) -> Result<()> {
    let settings = load_settings()?;
    let path = vault_path(cli, &settings)?;

    let vault_password = prompt_password()?;
    let mut store = VaultStore::open(&path, vault_password.as_bytes())?;

    let generated = login_password.is_none();
    let secret = Zeroizing::new(match login_password {
        Some(pw) => pw.to_string(),
        None => password::generate(
            settings.password_length,
            settings.password_digits,
            settings.password_symbols,
        ),
    });

    let data = LoginData {
        title: title.to_string(),
        username: username.to_string(),
        password: secret.to_string(),
        url: url.to_string(),
        notes: notes.to_string(),
    };
    let item = VaultItem::create_login(store.keys(), &data)?;
    let uuid = item.uuid().to_string();

    store.add_item(item);
    store.save()?;

    output::success(&format!("Added login '{title}' ({uuid})"));
    if generated {
        output::info("A password was generated for this login.");
        output::tip(&format!("Run `opvault show {uuid} --reveal` to see it."));
    }

    Ok(())
}
