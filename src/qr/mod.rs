//! QR code encoding, rendering and verification
//!
//! Symbol construction is delegated to the `qrcode` crate and reading the
//! result back to `rqrr`. This module owns the request model, the fit loop
//! over symbol versions and the rasterization into a two-color bitmap.

mod decoder;
mod encoder;
mod render;

pub use decoder::QrDecoder;
pub use encoder::{QrGenerator, QrSymbol};
pub use render::{Palette, QrImage, RgbColor, render};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lowest symbol version defined by ISO/IEC 18004
pub const MIN_VERSION: i16 = 1;
/// Highest symbol version defined by ISO/IEC 18004
pub const MAX_VERSION: i16 = 40;

/// Largest accepted pixels-per-module
pub const MAX_BOX_SIZE: u32 = 64;
/// Largest accepted quiet zone, in modules
pub const MAX_BORDER: u32 = 64;
/// Largest rendered image side, in pixels
pub const MAX_IMAGE_SIDE: u32 = 8192;

/// Number of modules per side for a normal symbol version.
pub fn modules_for_version(version: i16) -> u32 {
    17 + 4 * version as u32
}

/// Error correction tolerance class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EcLevel {
    /// Recovers ~7% damage; highest capacity
    #[default]
    L,
    /// Recovers ~15% damage
    M,
    /// Recovers ~25% damage
    Q,
    /// Recovers ~30% damage; lowest capacity
    H,
}

impl EcLevel {
    /// Single-letter label
    pub fn label(self) -> &'static str {
        match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        }
    }

    pub(crate) fn to_qrcode(self) -> qrcode::EcLevel {
        match self {
            Self::L => qrcode::EcLevel::L,
            Self::M => qrcode::EcLevel::M,
            Self::Q => qrcode::EcLevel::Q,
            Self::H => qrcode::EcLevel::H,
        }
    }

    pub(crate) fn from_qrcode(level: qrcode::EcLevel) -> Self {
        match level {
            qrcode::EcLevel::L => Self::L,
            qrcode::EcLevel::M => Self::M,
            qrcode::EcLevel::Q => Self::Q,
            qrcode::EcLevel::H => Self::H,
        }
    }
}

impl fmt::Display for EcLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EcLevel {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "l" | "low" => Ok(Self::L),
            "m" | "medium" => Ok(Self::M),
            "q" | "quartile" => Ok(Self::Q),
            "h" | "high" => Ok(Self::H),
            other => Err(format!(
                "Unknown error correction level '{other}', expected L, M, Q or H"
            )),
        }
    }
}

/// A validated request to render one payload as a QR image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrRequest {
    payload: QrPayload,
    version: i16,
    fit: bool,
    ec_level: EcLevel,
    box_size: u32,
    border: u32,
    palette: Palette,
}

impl QrRequest {
    /// Start a request for `text` with the default encoding parameters
    /// (version 1 with fit, level L, 10px boxes, 4-module border, black on white).
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            payload: QrPayload::from_string(text.into()),
            version: MIN_VERSION,
            fit: true,
            ec_level: EcLevel::L,
            box_size: 10,
            border: 4,
            palette: Palette::default(),
        }
    }

    /// Requested (minimum) symbol version
    pub fn version(mut self, version: i16) -> Self {
        self.version = version;
        self
    }

    /// Whether the version may grow until the payload fits
    pub fn fit(mut self, fit: bool) -> Self {
        self.fit = fit;
        self
    }

    /// Error correction level
    pub fn ec_level(mut self, ec_level: EcLevel) -> Self {
        self.ec_level = ec_level;
        self
    }

    /// Pixels per module side
    pub fn box_size(mut self, box_size: u32) -> Self {
        self.box_size = box_size;
        self
    }

    /// Quiet zone width in modules
    pub fn border(mut self, border: u32) -> Self {
        self.border = border;
        self
    }

    /// Foreground/background colors
    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Check every parameter against its accepted range.
    pub fn validate(&self) -> Result<()> {
        if self.payload.as_bytes().is_empty() {
            return Err(Error::InvalidParameter("payload must not be empty".into()));
        }
        if !(MIN_VERSION..=MAX_VERSION).contains(&self.version) {
            return Err(Error::InvalidParameter(format!(
                "version {} is outside {MIN_VERSION}..={MAX_VERSION}",
                self.version
            )));
        }
        if !(1..=MAX_BOX_SIZE).contains(&self.box_size) {
            return Err(Error::InvalidParameter(format!(
                "box size {} is outside 1..={MAX_BOX_SIZE}",
                self.box_size
            )));
        }
        if self.border > MAX_BORDER {
            return Err(Error::InvalidParameter(format!(
                "border {} exceeds {MAX_BORDER} modules",
                self.border
            )));
        }
        if self.palette.fill == self.palette.back {
            return Err(Error::InvalidParameter(format!(
                "fill and back colors are both {}",
                self.palette.fill
            )));
        }
        Ok(())
    }

    /// Payload being encoded
    pub fn payload(&self) -> &QrPayload {
        &self.payload
    }

    /// Requested symbol version
    pub fn requested_version(&self) -> i16 {
        self.version
    }

    /// Whether version fitting is enabled
    pub fn fit_enabled(&self) -> bool {
        self.fit
    }

    /// Requested error correction level
    pub fn level(&self) -> EcLevel {
        self.ec_level
    }

    /// Pixels per module side
    pub fn module_pixels(&self) -> u32 {
        self.box_size
    }

    /// Quiet zone width in modules
    pub fn border_modules(&self) -> u32 {
        self.border
    }

    /// Render colors
    pub fn colors(&self) -> Palette {
        self.palette
    }
}

/// A QR code payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrPayload {
    /// The raw data
    pub data: Vec<u8>,
    /// String representation if valid UTF-8
    pub text: Option<String>,
}

impl QrPayload {
    /// Create a new QR payload from raw bytes
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let text = String::from_utf8(data.clone()).ok();
        Self { data, text }
    }

    /// Create a new QR payload from a string
    pub fn from_string(s: String) -> Self {
        Self {
            data: s.as_bytes().to_vec(),
            text: Some(s),
        }
    }

    /// Get the payload as a string, if valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Lossy text form for logs and error messages
    pub fn display_text(&self) -> String {
        match self.as_str() {
            Some(text) => text.to_string(),
            None => String::from_utf8_lossy(&self.data).into_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_payload_from_string() {
        let payload = QrPayload::from_string("hello world".to_string());
        assert_eq!(payload.as_str(), Some("hello world"));
        assert_eq!(payload.as_bytes(), b"hello world");
    }

    #[test]
    fn test_qr_payload_from_bytes() {
        let payload = QrPayload::from_bytes(vec![0xFF, 0xFE]);
        assert!(payload.as_str().is_none());
        assert_eq!(payload.as_bytes(), &[0xFF, 0xFE]);
    }

    #[test]
    fn test_modules_for_version() {
        assert_eq!(modules_for_version(1), 21);
        assert_eq!(modules_for_version(3), 29);
        assert_eq!(modules_for_version(40), 177);
    }

    #[test]
    fn test_ec_level_parse() {
        assert_eq!("l".parse::<EcLevel>(), Ok(EcLevel::L));
        assert_eq!("Quartile".parse::<EcLevel>(), Ok(EcLevel::Q));
        assert_eq!(" H ".parse::<EcLevel>(), Ok(EcLevel::H));
        assert!("x".parse::<EcLevel>().is_err());
    }

    #[test]
    fn test_request_defaults_validate() {
        let request = QrRequest::new("https://example.com/");
        assert!(request.validate().is_ok());
        assert_eq!(request.requested_version(), 1);
        assert!(request.fit_enabled());
        assert_eq!(request.level(), EcLevel::L);
        assert_eq!(request.module_pixels(), 10);
        assert_eq!(request.border_modules(), 4);
    }

    #[test]
    fn test_request_rejects_bad_parameters() {
        let empty = QrRequest::new("");
        assert!(matches!(empty.validate(), Err(Error::InvalidParameter(_))));

        let version = QrRequest::new("x").version(41);
        assert!(matches!(version.validate(), Err(Error::InvalidParameter(_))));

        let version = QrRequest::new("x").version(0);
        assert!(matches!(version.validate(), Err(Error::InvalidParameter(_))));

        let boxed = QrRequest::new("x").box_size(0);
        assert!(matches!(boxed.validate(), Err(Error::InvalidParameter(_))));

        let boxed = QrRequest::new("x").box_size(100_000);
        assert!(matches!(boxed.validate(), Err(Error::InvalidParameter(_))));

        let border = QrRequest::new("x").border(100_000);
        assert!(matches!(border.validate(), Err(Error::InvalidParameter(_))));

        let same = Palette::new(RgbColor::BLACK, RgbColor::BLACK);
        let colors = QrRequest::new("x").palette(same);
        assert!(matches!(colors.validate(), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_zero_border_is_allowed() {
        assert!(QrRequest::new("x").border(0).validate().is_ok());
        assert!(
            QrRequest::new("x")
                .border(MAX_BORDER)
                .box_size(MAX_BOX_SIZE)
                .validate()
                .is_ok()
        );
    }
}
