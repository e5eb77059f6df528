//! Thin adapter over the RustCrypto primitives the vault core consumes.
//!
//! - AES-256 in CBC mode with **no** cipher-level padding (the envelope
//!   codec pads on its own terms).
//! - HMAC-SHA-256 for envelope and item authentication.
//! - SHA-512 for turning profile key material into a key pair.
//! - CSPRNG bytes from the thread-local generator.

use aes::cipher::block_padding::NoPadding;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256, Sha512};

use crate::errors::{OpVaultError, Result};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES block size in bytes.
pub const BLOCK_LEN: usize = 16;

/// Encrypt block-aligned `plaintext` with AES-256-CBC.
pub fn encrypt_block_cipher(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    if plaintext.len() % BLOCK_LEN != 0 {
        return Err(OpVaultError::EncryptionFailed(format!(
            "plaintext length {} is not a multiple of {BLOCK_LEN}",
            plaintext.len()
        )));
    }

    let cipher = Aes256CbcEnc::new_from_slices(key, iv)
        .map_err(|e| OpVaultError::EncryptionFailed(format!("invalid key or IV length: {e}")))?;

    Ok(cipher.encrypt_padded_vec_mut::<NoPadding>(plaintext))
}

/// Decrypt block-aligned `ciphertext` with AES-256-CBC.
pub fn decrypt_block_cipher(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256CbcDec::new_from_slices(key, iv).map_err(|e| {
        OpVaultError::MalformedEnvelope(format!("invalid key or IV length: {e}"))
    })?;

    cipher
        .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
        .map_err(|_| OpVaultError::MalformedEnvelope("ciphertext is not block-aligned".into()))
}

/// HMAC-SHA-256 of `data` under `key`.
pub fn keyed_hash(key: &[u8], data: &[u8]) -> Result<[u8; 32]> {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(key)
        .map_err(|e| OpVaultError::EncryptionFailed(format!("invalid HMAC key: {e}")))?;
    mac.update(data);

    let mut tag = [0u8; 32];
    tag.copy_from_slice(&mac.finalize().into_bytes());
    Ok(tag)
}

/// Check an HMAC-SHA-256 tag in constant time.
pub fn verify_keyed_hash(key: &[u8], data: &[u8], tag: &[u8]) -> Result<()> {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(key)
        .map_err(|_| OpVaultError::Authentication)?;
    mac.update(data);
    mac.verify_slice(tag).map_err(|_| OpVaultError::Authentication)
}

/// SHA-512 digest of `data`.
pub fn hash(data: &[u8]) -> [u8; 64] {
    let mut digest = [0u8; 64];
    digest.copy_from_slice(&Sha512::digest(data));
    digest
}

/// `n` bytes from the CSPRNG.
pub fn random_bytes(n: usize) -> Vec<u8> {
    let mut buf = vec![0u8; n];
    fill_random(&mut buf);
    buf
}

/// Overwrite `buf` with CSPRNG output.
pub fn fill_random(buf: &mut [u8]) {
    rand::rng().fill_bytes(buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cbc_roundtrip_without_padding() {
        let key = [7u8; 32];
        let iv = [9u8; 16];
        let plaintext = [0x42u8; 48];

        let ct = encrypt_block_cipher(&key, &iv, &plaintext).unwrap();
        assert_eq!(ct.len(), 48, "no cipher-level padding may be added");

        let pt = decrypt_block_cipher(&key, &iv, &ct).unwrap();
        assert_eq!(pt, plaintext);
    }

    #[test]
    fn encrypt_rejects_unaligned_input() {
        let result = encrypt_block_cipher(&[0u8; 32], &[0u8; 16], b"not aligned");
        assert!(result.is_err());
    }

    #[test]
    fn keyed_hash_verifies_its_own_tag() {
        let tag = keyed_hash(b"key", b"data").unwrap();
        assert!(verify_keyed_hash(b"key", b"data", &tag).is_ok());
        assert!(verify_keyed_hash(b"key", b"datA", &tag).is_err());
    }

    #[test]
    fn random_bytes_have_requested_length() {
        assert_eq!(random_bytes(0).len(), 0);
        assert_eq!(random_bytes(33).len(), 33);
        assert_ne!(random_bytes(32), random_bytes(32));
    }
}
