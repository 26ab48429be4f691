//! QR code encoder

use crate::error::{Error, Result};
use crate::qr::{EcLevel, MAX_VERSION, QrDecoder, QrImage, QrPayload, QrRequest, render};
use qrcode::types::QrError;
use qrcode::{Color, QrCode, Version};
use std::fmt;

/// An encoded symbol together with the parameters that produced it
#[derive(Clone)]
pub struct QrSymbol {
    code: QrCode,
    version: i16,
    ec_level: EcLevel,
}

impl QrSymbol {
    /// Version actually used, which may exceed the requested one when fitting
    pub fn version(&self) -> i16 {
        self.version
    }

    /// Error correction level of the symbol
    pub fn ec_level(&self) -> EcLevel {
        self.ec_level
    }

    /// Modules per side
    pub fn modules(&self) -> u32 {
        self.code.width() as u32
    }

    /// Whether the module at column `x`, row `y` is dark
    pub fn is_dark(&self, x: u32, y: u32) -> bool {
        self.code[(x as usize, y as usize)] == Color::Dark
    }
}

impl fmt::Debug for QrSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QrSymbol")
            .field("version", &self.version)
            .field("ec_level", &self.ec_level)
            .field("modules", &self.modules())
            .finish()
    }
}

/// Reads a rendered image back into the payload it carries
type Verifier = Box<dyn Fn(&QrImage) -> Result<QrPayload>>;

/// QR code generator
pub struct QrGenerator {
    verifier: Option<Verifier>,
}

impl QrGenerator {
    /// Create a generator that trusts the encoder output
    pub fn new() -> Self {
        Self { verifier: None }
    }

    /// Create a generator that decodes every rendered image with rqrr and
    /// checks it against the input payload
    pub fn verifying() -> Self {
        let decoder = QrDecoder::new();
        Self::with_verifier(move |image| decoder.decode_rgb(image))
    }

    /// Create a generator that reads rendered images back with `verifier`
    pub fn with_verifier(verifier: impl Fn(&QrImage) -> Result<QrPayload> + 'static) -> Self {
        Self {
            verifier: Some(Box::new(verifier)),
        }
    }

    /// Whether rendered images are read back before being returned
    pub fn verifies(&self) -> bool {
        self.verifier.is_some()
    }

    /// Encode the request payload into a symbol.
    ///
    /// With fitting enabled the smallest version at or above the requested
    /// one that holds the data is chosen. Data that fits nowhere is an error,
    /// never truncated.
    pub fn encode(&self, request: &QrRequest) -> Result<QrSymbol> {
        request.validate()?;

        let data = request.payload().as_bytes();
        let level = request.level();
        let first = request.requested_version();
        let last = if request.fit_enabled() { MAX_VERSION } else { first };

        for version in first..=last {
            match QrCode::with_version(data, Version::Normal(version), level.to_qrcode()) {
                Ok(code) => {
                    tracing::debug!(
                        requested = first,
                        version,
                        ec_level = %level,
                        bytes = data.len(),
                        "Encoded QR symbol"
                    );
                    return Ok(QrSymbol {
                        version,
                        ec_level: EcLevel::from_qrcode(code.error_correction_level()),
                        code,
                    });
                }
                Err(QrError::DataTooLong) => continue,
                Err(e) => {
                    return Err(Error::QrEncode(format!(
                        "version {version} level {level}: {e}"
                    )));
                }
            }
        }

        Err(Error::DataTooLong {
            len: data.len(),
            max_version: last,
            level: level.label(),
        })
    }

    /// Encode and rasterize the request, verifying the result when enabled.
    pub fn generate(&self, request: &QrRequest) -> Result<(QrSymbol, QrImage)> {
        let symbol = self.encode(request)?;
        let image = render(
            &symbol,
            request.module_pixels(),
            request.border_modules(),
            request.colors(),
        )?;

        if let Some(verifier) = &self.verifier {
            let decoded = verifier(&image)?;
            if decoded.as_bytes() != request.payload().as_bytes() {
                return Err(Error::VerificationMismatch {
                    expected: request.payload().display_text(),
                    decoded: decoded.display_text(),
                });
            }
            tracing::debug!("Rendered QR image decodes to the input payload");
        }

        Ok((symbol, image))
    }
}

impl Default for QrGenerator {
    fn default() -> Self {
        Self::new()
    }
}
