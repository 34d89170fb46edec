//! Text tools: passphrase encryption, digests and byte encodings.
//!
//! Primitives come from the RustCrypto crates, `bcrypt` and `base64`. This
//! module only fixes the envelope formats the pages exchange with users.

pub mod cipher;
pub mod encoding;
pub mod hash;

pub use cipher::{decrypt, encrypt, CipherError};
pub use encoding::{
    base64_decode, base64_decode_text, base64_encode, hex_decode, hex_encode, Base64Variant, EncodingError,
};
pub use hash::{bcrypt_hash, bcrypt_verify, digest, HashAlgorithm, HashError, DEFAULT_BCRYPT_COST};
