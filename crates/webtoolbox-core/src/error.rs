//! Tool-level error taxonomy.
//!
//! Module errors roll up into [`ToolError`], which the pages show as an
//! inline message. No error is fatal: the page stays usable and the user
//! can reset or pick another file.

use thiserror::Error;

use crate::compositor::CompositeError;
use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::geometry::GeometryError;
use crate::input::InputError;
use crate::text::{CipherError, EncodingError, HashError};

const EMPTY_CROP: &str = "The crop area is empty. Please enlarge the selection.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// Malformed URL, wrong file type, empty field.
    #[error("{0}")]
    InvalidInput(String),

    /// A file the codecs cannot parse.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Wrong password for a ciphertext.
    #[error("Decryption failed: wrong password")]
    CryptoMismatch,

    #[error("Export failed: {0}")]
    Encode(String),

    /// An operation that needs a loaded image ran without one.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl ToolError {
    /// Text shown next to the tool.
    pub fn user_message(&self) -> String {
        match self {
            ToolError::InvalidInput(detail) => detail.clone(),
            ToolError::Decode(_) => "Please select a valid image file.".to_string(),
            ToolError::CryptoMismatch => {
                "Decryption failed. Please check the password and try again.".to_string()
            }
            ToolError::Encode(_) => "Could not export the image. Please try again.".to_string(),
            ToolError::InvalidState(_) => "Please upload an image first.".to_string(),
        }
    }

    /// Whether repeating the action can succeed after the user edits the
    /// current input, such as another password or a larger crop.
    ///
    /// A file that failed to decode, or a tool with no image, needs a new
    /// upload instead.
    pub fn is_retryable(&self) -> bool {
        match self {
            ToolError::InvalidInput(_) | ToolError::CryptoMismatch | ToolError::Encode(_) => true,
            ToolError::Decode(_) | ToolError::InvalidState(_) => false,
        }
    }
}

impl From<DecodeError> for ToolError {
    fn from(e: DecodeError) -> Self {
        match e {
            DecodeError::TooLarge { .. } => ToolError::InvalidInput(e.to_string()),
            _ => ToolError::Decode(e.to_string()),
        }
    }
}

impl From<EncodeError> for ToolError {
    fn from(e: EncodeError) -> Self {
        ToolError::Encode(e.to_string())
    }
}

impl From<CompositeError> for ToolError {
    fn from(e: CompositeError) -> Self {
        match e {
            CompositeError::EmptyRegion => ToolError::InvalidInput(EMPTY_CROP.to_string()),
            CompositeError::InvalidDimensions { .. } => ToolError::InvalidInput(e.to_string()),
        }
    }
}

impl From<GeometryError> for ToolError {
    fn from(e: GeometryError) -> Self {
        ToolError::InvalidState(e.to_string())
    }
}

impl From<InputError> for ToolError {
    fn from(e: InputError) -> Self {
        ToolError::InvalidInput(e.to_string())
    }
}

impl From<CipherError> for ToolError {
    fn from(e: CipherError) -> Self {
        match e {
            CipherError::Mismatch => ToolError::CryptoMismatch,
            CipherError::Malformed(_) | CipherError::InvalidInput(_) => ToolError::InvalidInput(e.to_string()),
        }
    }
}

impl From<HashError> for ToolError {
    fn from(e: HashError) -> Self {
        ToolError::InvalidInput(e.to_string())
    }
}

impl From<EncodingError> for ToolError {
    fn from(e: EncodingError) -> Self {
        ToolError::InvalidInput(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_failure_message() {
        let err = ToolError::from(DecodeError::InvalidFormat);
        assert!(matches!(err, ToolError::Decode(_)));
        assert_eq!(err.user_message(), "Please select a valid image file.");
    }

    #[test]
    fn test_too_large_is_input_error() {
        let err = ToolError::from(DecodeError::TooLarge {
            width: 10_000,
            height: 10_000,
            max_pixels: 40_000_000,
        });
        assert_eq!(
            err.user_message(),
            "Image too large: 10000x10000 exceeds 40000000 pixels"
        );
    }

    #[test]
    fn test_cipher_mapping() {
        assert_eq!(ToolError::from(CipherError::Mismatch), ToolError::CryptoMismatch);
        assert!(matches!(
            ToolError::from(CipherError::Malformed("not valid base64")),
            ToolError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_input_message_is_shown_verbatim() {
        let err = ToolError::from(InputError::UnsupportedType("image/png".into()));
        assert_eq!(err.user_message(), "Unsupported file type: image/png");
    }

    #[test]
    fn test_retryable_only_when_input_can_change() {
        assert!(ToolError::InvalidInput("x".into()).is_retryable());
        assert!(ToolError::CryptoMismatch.is_retryable());
        assert!(ToolError::Encode("x".into()).is_retryable());
        assert!(!ToolError::Decode("x".into()).is_retryable());
        assert!(!ToolError::InvalidState("x".into()).is_retryable());
    }

    #[test]
    fn test_empty_region_is_a_crop_message() {
        let err = ToolError::from(CompositeError::EmptyRegion);
        assert!(matches!(err, ToolError::InvalidInput(_)));
        assert_eq!(err.user_message(), "The crop area is empty. Please enlarge the selection.");
        assert_ne!(err.user_message(), ToolError::InvalidState(String::new()).user_message());
    }

    #[test]
    fn test_zero_target_size_is_input_error() {
        let err = ToolError::from(CompositeError::InvalidDimensions { width: 0, height: 10 });
        assert_eq!(err.user_message(), "Invalid dimensions: 0x10");
    }
}
