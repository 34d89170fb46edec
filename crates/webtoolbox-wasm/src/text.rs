//! Text tool bindings: encryption, hashing and base64.
//!
//! # Example
//!
//! ```typescript
//! import { encrypt_text, decrypt_text, hash_text } from '@webtoolbox/wasm';
//!
//! const sealed = encrypt_text('hello', 'secret');
//! decrypt_text(sealed, 'secret'); // 'hello'
//! hash_text('hello', 'sha-256');
//! ```

use wasm_bindgen::prelude::*;
use webtoolbox_core::text::{self, Base64Variant, HashAlgorithm};
use webtoolbox_core::ToolError;

use crate::types::js_error;

/// Encrypt with a passphrase. Output is the base64 OpenSSL envelope
/// (`U2FsdGVkX1...`).
#[wasm_bindgen]
pub fn encrypt_text(plaintext: &str, password: &str) -> Result<String, JsValue> {
    text::encrypt(plaintext, password).map_err(js_error)
}

/// Decrypt an envelope from [`encrypt_text`] or a CryptoJS page.
///
/// A wrong password rejects with the retry message and never yields text.
#[wasm_bindgen]
pub fn decrypt_text(ciphertext: &str, password: &str) -> Result<String, JsValue> {
    text::decrypt(ciphertext, password).map_err(js_error)
}

/// Lowercase hex digest. `algorithm` is `md5`, `sha1`, `sha256` or `sha512`
/// (dashes and case are ignored).
#[wasm_bindgen]
pub fn hash_text(text: &str, algorithm: &str) -> Result<String, JsValue> {
    let algorithm = parse_algorithm(algorithm).map_err(js_error)?;
    Ok(text::digest(text, algorithm))
}

/// Names of the supported digests, for the algorithm picker.
#[wasm_bindgen]
pub fn hash_algorithms() -> Vec<String> {
    HashAlgorithm::ALL.iter().map(|alg| alg.label().to_string()).collect()
}

/// bcrypt hash. `cost` is clamped to 4..=15; pass 0 for the default.
#[wasm_bindgen]
pub fn bcrypt_hash(text: &str, cost: u32) -> Result<String, JsValue> {
    let cost = if cost == 0 { text::DEFAULT_BCRYPT_COST } else { cost };
    text::bcrypt_hash(text, cost).map_err(js_error)
}

#[wasm_bindgen]
pub fn bcrypt_verify(text: &str, hash: &str) -> Result<bool, JsValue> {
    text::bcrypt_verify(text, hash).map_err(js_error)
}

/// Base64 of the UTF-8 bytes of `text`.
#[wasm_bindgen]
pub fn base64_encode(text: &str, url_safe: bool) -> String {
    text::base64_encode(text.as_bytes(), variant(url_safe))
}

/// Decode base64 back to text. Padding and whitespace are optional.
#[wasm_bindgen]
pub fn base64_decode(encoded: &str, url_safe: bool) -> Result<String, JsValue> {
    text::base64_decode_text(encoded, variant(url_safe)).map_err(js_error)
}

#[wasm_bindgen]
pub fn hex_encode(text: &str) -> String {
    text::hex_encode(text.as_bytes())
}

fn variant(url_safe: bool) -> Base64Variant {
    if url_safe {
        Base64Variant::UrlSafe
    } else {
        Base64Variant::Standard
    }
}

fn parse_algorithm(name: &str) -> Result<HashAlgorithm, ToolError> {
    HashAlgorithm::parse(name).ok_or_else(|| ToolError::InvalidInput(format!("Unknown hash algorithm: {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt() {
        let sealed = encrypt_text("hello", "secret").unwrap();
        assert!(sealed.starts_with("U2FsdGVkX1"));
        assert_eq!(decrypt_text(&sealed, "secret").unwrap(), "hello");
    }

    #[test]
    fn test_hash_text() {
        assert_eq!(hash_text("hello", "md5").unwrap(), "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(
            hash_text("hello", "SHA-256").unwrap(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_parse_algorithm_unknown() {
        assert!(matches!(parse_algorithm("crc32"), Err(ToolError::InvalidInput(_))));
    }

    #[test]
    fn test_hash_algorithms_listed() {
        assert_eq!(hash_algorithms().len(), HashAlgorithm::ALL.len());
    }

    #[test]
    fn test_bcrypt() {
        let hash = bcrypt_hash("hunter2", 4).unwrap();
        assert!(bcrypt_verify("hunter2", &hash).unwrap());
        assert!(!bcrypt_verify("hunter3", &hash).unwrap());
    }

    #[test]
    fn test_base64() {
        assert_eq!(base64_encode("hello", false), "aGVsbG8=");
        assert_eq!(base64_decode("aGVsbG8", false).unwrap(), "hello");
        assert_eq!(base64_encode("\u{fbff}", true), "76-_");
    }

    #[test]
    fn test_hex_encode() {
        assert_eq!(hex_encode("hi"), "6869");
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_wrong_password_message() {
        let sealed = encrypt_text("hello", "secret").unwrap();
        let err = decrypt_text(&sealed, "wrong").unwrap_err();
        assert_eq!(
            err.as_string().unwrap(),
            "Decryption failed. Please check the password and try again."
        );
    }

    #[wasm_bindgen_test]
    fn test_unknown_algorithm_rejected() {
        assert!(hash_text("hello", "crc32").is_err());
    }
}
