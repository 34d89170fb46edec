//! Base64 and hex codecs for the encoder/decoder tools.

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("Invalid base64: {0}")]
    InvalidBase64(String),

    #[error("Invalid hex: {0}")]
    InvalidHex(&'static str),

    /// Decoded bytes are not text.
    #[error("Decoded data is not valid UTF-8")]
    NotUtf8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Base64Variant {
    #[default]
    Standard,
    /// `-` and `_` instead of `+` and `/`.
    UrlSafe,
}

pub fn base64_encode(bytes: &[u8], variant: Base64Variant) -> String {
    match variant {
        Base64Variant::Standard => STANDARD.encode(bytes),
        Base64Variant::UrlSafe => URL_SAFE.encode(bytes),
    }
}

/// Whitespace is ignored and missing `=` padding is tolerated.
pub fn base64_decode(text: &str, variant: Base64Variant) -> Result<Vec<u8>, EncodingError> {
    let mut compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    while compact.len() % 4 != 0 {
        compact.push('=');
    }
    let result = match variant {
        Base64Variant::Standard => STANDARD.decode(&compact),
        Base64Variant::UrlSafe => URL_SAFE.decode(&compact),
    };
    result.map_err(|e| EncodingError::InvalidBase64(e.to_string()))
}

/// [`base64_decode`] for the text tools, which show the result as a string.
pub fn base64_decode_text(text: &str, variant: Base64Variant) -> Result<String, EncodingError> {
    String::from_utf8(base64_decode(text, variant)?).map_err(|_| EncodingError::NotUtf8)
}

/// Lowercase hex.
pub fn hex_encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Either case; whitespace and an optional `0x` prefix are ignored.
pub fn hex_decode(text: &str) -> Result<Vec<u8>, EncodingError> {
    let compact: Vec<u8> = text.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    let digits = compact
        .strip_prefix(b"0x")
        .or_else(|| compact.strip_prefix(b"0X"))
        .unwrap_or(&compact[..]);
    hex::decode(digits).map_err(|e| match e {
        hex::FromHexError::OddLength => EncodingError::InvalidHex("odd number of digits"),
        _ => EncodingError::InvalidHex("non-hex character"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_variants() {
        let data = b"hello world?>";
        assert_eq!(base64_encode(data, Base64Variant::Standard), "aGVsbG8gd29ybGQ/Pg==");
        assert_eq!(base64_encode(data, Base64Variant::UrlSafe), "aGVsbG8gd29ybGQ_Pg==");
        assert_eq!(base64_decode("aGVsbG8gd29ybGQ_Pg==", Base64Variant::UrlSafe).unwrap(), data);
    }

    #[test]
    fn test_base64_decode_lenient_padding_and_whitespace() {
        assert_eq!(base64_decode_text("aGVs\nbG8", Base64Variant::Standard).unwrap(), "hello");
    }

    #[test]
    fn test_base64_decode_errors() {
        assert!(matches!(
            base64_decode("a$b=", Base64Variant::Standard),
            Err(EncodingError::InvalidBase64(_))
        ));
        assert_eq!(base64_decode_text("/w==", Base64Variant::Standard), Err(EncodingError::NotUtf8));
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex_encode(&[0x00, 0xab, 0xff]), "00abff");
        assert_eq!(hex_decode("00ABff").unwrap(), vec![0x00, 0xab, 0xff]);
        assert_eq!(hex_decode("0x de ad").unwrap(), vec![0xde, 0xad]);
        assert_eq!(hex_decode("abc"), Err(EncodingError::InvalidHex("odd number of digits")));
        assert_eq!(hex_decode("zz"), Err(EncodingError::InvalidHex("non-hex character")));
    }
}

