//! Passphrase encryption in the OpenSSL `Salted__` envelope.
//!
//! Layout of the decoded ciphertext:
//!
//! ```text
//! "Salted__" | salt (8 bytes) | AES-256-CBC(PKCS#7) ciphertext
//! ```
//!
//! Key and IV come from `EVP_BytesToKey` with MD5 and one iteration, the
//! derivation CryptoJS uses for `AES.encrypt(text, passphrase)`. The whole
//! envelope is base64 (standard alphabet, padded).

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use md5::{Digest, Md5};
use thiserror::Error;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const MAGIC: &[u8; 8] = b"Salted__";
const SALT_LEN: usize = 8;
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;
const BLOCK_LEN: usize = 16;

/// Errors from [`encrypt`] and [`decrypt`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    /// Wrong password: the padding or the recovered text is invalid.
    #[error("Decryption failed: wrong password or corrupted text")]
    Mismatch,

    /// Not base64, or missing the salted header.
    #[error("Malformed ciphertext: {0}")]
    Malformed(&'static str),

    /// Empty password or other unusable input.
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),
}

/// Encrypt `plaintext` under `password` with a fresh random salt.
pub fn encrypt(plaintext: &str, password: &str) -> Result<String, CipherError> {
    if password.is_empty() {
        return Err(CipherError::InvalidInput("password must not be empty"));
    }
    let mut salt = [0u8; SALT_LEN];
    getrandom::getrandom(&mut salt).map_err(|_| CipherError::InvalidInput("no random source available"))?;
    encrypt_with_salt(plaintext, password, &salt)
}

fn encrypt_with_salt(plaintext: &str, password: &str, salt: &[u8; SALT_LEN]) -> Result<String, CipherError> {
    let (key, iv) = derive_key_iv(password.as_bytes(), salt);
    let ciphertext = Aes256CbcEnc::new_from_slices(&key, &iv)
        .map_err(|_| CipherError::InvalidInput("key derivation produced a bad length"))?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    let mut envelope = Vec::with_capacity(MAGIC.len() + SALT_LEN + ciphertext.len());
    envelope.extend_from_slice(MAGIC);
    envelope.extend_from_slice(salt);
    envelope.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(envelope))
}

/// Decrypt a base64 envelope produced by [`encrypt`] (or CryptoJS, or
/// `openssl enc -aes-256-cbc -md md5 -base64`).
///
/// # Errors
///
/// - `CipherError::InvalidInput` for an empty password
/// - `CipherError::Malformed` for bad base64, a missing header or a body
///   that isn't whole blocks
/// - `CipherError::Mismatch` for a wrong password
pub fn decrypt(ciphertext: &str, password: &str) -> Result<String, CipherError> {
    if password.is_empty() {
        return Err(CipherError::InvalidInput("password must not be empty"));
    }

    // Pasted text often carries line breaks every 64 characters
    let compact: String = ciphertext.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(CipherError::InvalidInput("ciphertext must not be empty"));
    }
    let raw = STANDARD.decode(compact).map_err(|_| CipherError::Malformed("not valid base64"))?;

    let header_len = MAGIC.len() + SALT_LEN;
    if raw.len() < header_len || &raw[..MAGIC.len()] != MAGIC {
        return Err(CipherError::Malformed("missing salted header"));
    }
    let body = &raw[header_len..];
    if body.is_empty() || body.len() % BLOCK_LEN != 0 {
        return Err(CipherError::Malformed("ciphertext is not a whole number of blocks"));
    }

    let (key, iv) = derive_key_iv(password.as_bytes(), &raw[MAGIC.len()..header_len]);
    let plaintext = Aes256CbcDec::new_from_slices(&key, &iv)
        .map_err(|_| CipherError::InvalidInput("key derivation produced a bad length"))?
        .decrypt_padded_vec_mut::<Pkcs7>(body)
        .map_err(|_| CipherError::Mismatch)?;

    String::from_utf8(plaintext).map_err(|_| CipherError::Mismatch)
}

/// `EVP_BytesToKey(MD5, count = 1)`: `D_i = MD5(D_{i-1} || password || salt)`
/// concatenated until key and IV are filled.
fn derive_key_iv(password: &[u8], salt: &[u8]) -> ([u8; KEY_LEN], [u8; IV_LEN]) {
    let mut material = Vec::with_capacity(KEY_LEN + IV_LEN + 16);
    let mut previous: Vec<u8> = Vec::new();
    while material.len() < KEY_LEN + IV_LEN {
        let mut hasher = Md5::new();
        hasher.update(&previous);
        hasher.update(password);
        hasher.update(salt);
        previous = hasher.finalize().to_vec();
        material.extend_from_slice(&previous);
    }

    let mut key = [0u8; KEY_LEN];
    let mut iv = [0u8; IV_LEN];
    key.copy_from_slice(&material[..KEY_LEN]);
    iv.copy_from_slice(&material[KEY_LEN..KEY_LEN + IV_LEN]);
    (key, iv)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Produced by `openssl enc -aes-256-cbc -md md5 -S <salt> -pass pass:<pw>`
    const HELLO_SECRET: &str = "U2FsdGVkX18AAQIDBAUGBx+4yh1dTDrd/BSdZH2M06c=";
    const FOX_HORSE: &str = "U2FsdGVkX1+hssPU5fYHGJg7iTpoMaZoAv02/OeJJGIrQ8SZTnCl2RanD/LhStJ/";

    #[test]
    fn test_round_trip() {
        let ct = encrypt("hello", "secret").unwrap();
        assert_eq!(decrypt(&ct, "secret").unwrap(), "hello");
    }

    #[test]
    fn test_wrong_password_never_recovers_plaintext() {
        let ct = encrypt("hello", "secret").unwrap();
        assert_ne!(decrypt(&ct, "wrong"), Ok("hello".to_string()));
        assert_eq!(decrypt(HELLO_SECRET, "wrong"), Err(CipherError::Mismatch));
    }

    #[test]
    fn test_matches_openssl_envelope() {
        let salt = [0, 1, 2, 3, 4, 5, 6, 7];
        assert_eq!(encrypt_with_salt("hello", "secret", &salt).unwrap(), HELLO_SECRET);
        assert_eq!(decrypt(HELLO_SECRET, "secret").unwrap(), "hello");
        assert_eq!(decrypt(FOX_HORSE, "correct-horse").unwrap(), "The quick brown fox");
    }

    #[test]
    fn test_fresh_salt_each_time() {
        let a = encrypt("hello", "secret").unwrap();
        let b = encrypt("hello", "secret").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("U2FsdGVkX1"));
    }

    #[test]
    fn test_whitespace_in_ciphertext_is_ignored() {
        let wrapped = format!("{}\n{}", &FOX_HORSE[..30], &FOX_HORSE[30..]);
        assert_eq!(decrypt(&wrapped, "correct-horse").unwrap(), "The quick brown fox");
    }

    #[test]
    fn test_malformed_inputs() {
        assert!(matches!(decrypt("not base64!!", "pw"), Err(CipherError::Malformed(_))));
        // "hello world" in base64, no header
        assert!(matches!(decrypt("aGVsbG8gd29ybGQ=", "pw"), Err(CipherError::Malformed(_))));
        // Header and salt only
        assert!(matches!(
            decrypt("U2FsdGVkX18AAQIDBAUGBw==", "pw"),
            Err(CipherError::Malformed(_))
        ));
    }

    #[test]
    fn test_empty_password_rejected() {
        assert!(matches!(encrypt("hello", ""), Err(CipherError::InvalidInput(_))));
        assert!(matches!(decrypt(HELLO_SECRET, ""), Err(CipherError::InvalidInput(_))));
    }

    #[test]
    fn test_empty_plaintext_is_one_padding_block() {
        let ct = encrypt("", "pw").unwrap();
        let raw = STANDARD.decode(&ct).unwrap();
        assert_eq!(raw.len(), 16 + BLOCK_LEN);
        assert_eq!(decrypt(&ct, "pw").unwrap(), "");
    }

    #[test]
    fn test_unicode_round_trip() {
        let ct = encrypt("héllo wörld 🌍", "пароль").unwrap();
        assert_eq!(decrypt(&ct, "пароль").unwrap(), "héllo wörld 🌍");
    }
}
