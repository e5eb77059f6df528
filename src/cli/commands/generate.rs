//! `opvault generate`: print a random password. No vault needed.

use crate::cli::load_settings;
use crate::crypto::password;
use crate::errors::{OpVaultError, Result};

/// Execute the `generate` command.
pub fn execute(length: Option<usize>, digits: Option<usize>, symbols: Option<usize>) -> Result<()> {
    let settings = load_settings()?;

    let length = length.unwrap_or(settings.password_length);
    let digits = digits.unwrap_or(settings.password_digits);
    let symbols = symbols.unwrap_or(settings.password_symbols);

    if length == 0 {
        return Err(OpVaultError::CommandFailed(
            "password length must be at least 1".into(),
        ));
    }

    println!("{}", password::generate(length, digits, symbols));

    Ok(())
}
