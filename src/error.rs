//! Error types for urqr operations

use thiserror::Error;

/// Result type alias using urqr's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for urqr operations
#[derive(Error, Debug)]
pub enum Error {
    /// A request parameter is outside its accepted range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The payload does not fit in any permitted symbol version
    #[error("Payload of {len} bytes does not fit in a version {max_version} symbol at level {level}")]
    DataTooLong {
        /// Payload length in bytes
        len: usize,
        /// Largest version that was tried
        max_version: i16,
        /// Error correction level label
        level: &'static str,
    },

    /// QR code encoding failed for a reason other than capacity
    #[error("Failed to encode QR code: {0}")]
    QrEncode(String),

    /// QR code decoding failed
    #[error("Failed to decode QR code: {0}")]
    QrDecode(String),

    /// No QR code found in image
    #[error("No QR code found in image")]
    NoQrCodeFound,

    /// Rendered image decoded to something other than the input
    #[error("Verification mismatch: expected {expected:?}, decoded {decoded:?}")]
    VerificationMismatch {
        /// The payload that was encoded
        expected: String,
        /// What the decoder read back
        decoded: String,
    },

    /// The image viewer could not be launched
    #[error("Display error: {0}")]
    Display(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    Image(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Report serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Image(e.to_string())
    }
}
