//! Message digests and bcrypt for the hash generator tools.

use serde::{Deserialize, Serialize};
use sha2::Digest;
use thiserror::Error;

use super::encoding::hex_encode;

pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 15;
pub const DEFAULT_BCRYPT_COST: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    #[error("Invalid bcrypt hash: {0}")]
    InvalidHash(String),

    #[error("bcrypt failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 4] = [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha512,
    ];

    /// Accepts `sha256`, `SHA-256`, `sha_256` and so on.
    pub fn parse(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "md5" => Some(HashAlgorithm::Md5),
            "sha1" => Some(HashAlgorithm::Sha1),
            "sha256" => Some(HashAlgorithm::Sha256),
            "sha512" => Some(HashAlgorithm::Sha512),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Sha1 => "SHA-1",
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha512 => "SHA-512",
        }
    }
}

/// Digest of the UTF-8 bytes of `text`, as lowercase hex.
pub fn digest(text: &str, algorithm: HashAlgorithm) -> String {
    digest_bytes(text.as_bytes(), algorithm)
}

pub fn digest_bytes(bytes: &[u8], algorithm: HashAlgorithm) -> String {
    match algorithm {
        HashAlgorithm::Md5 => hex_encode(&md5::Md5::digest(bytes)),
        HashAlgorithm::Sha1 => hex_encode(&sha1::Sha1::digest(bytes)),
        HashAlgorithm::Sha256 => hex_encode(&sha2::Sha256::digest(bytes)),
        HashAlgorithm::Sha512 => hex_encode(&sha2::Sha512::digest(bytes)),
    }
}

/// Hash with a fresh salt. `cost` is clamped to
/// [`MIN_BCRYPT_COST`]..=[`MAX_BCRYPT_COST`].
pub fn bcrypt_hash(text: &str, cost: u32) -> Result<String, HashError> {
    let cost = cost.clamp(MIN_BCRYPT_COST, MAX_BCRYPT_COST);
    log::debug!("bcrypt hashing with cost {}", cost);
    bcrypt::hash(text, cost).map_err(|e| HashError::Failed(e.to_string()))
}

/// # Errors
///
/// Returns `HashError::InvalidHash` if `hash` is not a `$2a$`/`$2b$`/`$2y$`
/// string. A well-formed hash that doesn't match is `Ok(false)`.
pub fn bcrypt_verify(text: &str, hash: &str) -> Result<bool, HashError> {
    bcrypt::verify(text, hash.trim()).map_err(|e| HashError::InvalidHash(e.to_string()))
}
