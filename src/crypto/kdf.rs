//! Password stretching with a single PBKDF2 block.
//!
//! This computes only the *first* PBKDF2 output block (block index 1):
//!
//! ```text
//! U1 = HMAC(password, salt || 00 00 00 01)
//! Ui = HMAC(password, U(i-1))
//! out = U1 ^ U2 ^ ... ^ Uc
//! ```
//!
//! The HMAC hash is picked from `output_bits` (SHA-256, SHA-384 or
//! SHA-512).  Requests longer than one SHA-512 block are refused with
//! `UnsupportedLength` instead of concatenating further blocks.

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

use crate::errors::{OpVaultError, Result};

/// Big-endian PBKDF2 block index appended to the salt.  Always 1.
const FIRST_BLOCK_INDEX: [u8; 4] = [0, 0, 0, 1];

/// Largest output a single HMAC-SHA-512 block can provide.
pub const MAX_OUTPUT_BITS: u32 = 512;

/// Output size used to derive a vault's key pair (encryption + auth key).
pub const KEY_PAIR_BITS: u32 = 512;

/// Derive `output_bits / 8` bytes from `password` and `salt`.
///
/// Identical inputs always produce identical output.
pub fn derive(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    output_bits: u32,
) -> Result<Zeroizing<Vec<u8>>> {
    if iterations < 1 {
        return Err(OpVaultError::KeyDerivationFailed(
            "PBKDF2 iterations must be at least 1".into(),
        ));
    }
    if output_bits == 0 || output_bits % 8 != 0 {
        return Err(OpVaultError::UnsupportedLength {
            requested_bits: output_bits,
        });
    }

    tracing::debug!(iterations, output_bits, "deriving key from password");

    let mut block = match output_bits {
        1..=256 => first_block::<Hmac<Sha256>>(password, salt, iterations)?,
        257..=384 => first_block::<Hmac<Sha384>>(password, salt, iterations)?,
        385..=MAX_OUTPUT_BITS => first_block::<Hmac<Sha512>>(password, salt, iterations)?,
        _ => {
            return Err(OpVaultError::UnsupportedLength {
                requested_bits: output_bits,
            })
        }
    };

    block.truncate(output_bits as usize / 8);
    Ok(block)
}

/// Same as [`derive`], hex-encoded for external consumption.
pub fn derive_hex(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    output_bits: u32,
) -> Result<Zeroizing<String>> {
    let bytes = derive(password, salt, iterations, output_bits)?;
    Ok(Zeroizing::new(hex::encode(bytes.as_slice())))
}

/// PBKDF2 block 1 for an arbitrary HMAC.
fn first_block<M>(password: &[u8], salt: &[u8], iterations: u32) -> Result<Zeroizing<Vec<u8>>>
where
    M: Mac + KeyInit + Clone,
{
    let prf = <M as KeyInit>::new_from_slice(password)
        .map_err(|e| OpVaultError::KeyDerivationFailed(format!("invalid HMAC key: {e}")))?;

    let mut mac = prf.clone();
    Mac::update(&mut mac, salt);
    Mac::update(&mut mac, &FIRST_BLOCK_INDEX);
    let mut u = Zeroizing::new(mac.finalize().into_bytes().to_vec());
    let mut accumulator = Zeroizing::new(u.to_vec());

    for _ in 1..iterations {
        let mut mac = prf.clone();
        Mac::update(&mut mac, &u);
        u = Zeroizing::new(mac.finalize().into_bytes().to_vec());

        for (acc, byte) in accumulator.iter_mut().zip(u.iter()) {
            *acc ^= byte;
        }
    }

    Ok(accumulator)
}
