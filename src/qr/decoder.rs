//! QR code decoder using rqrr, used to read rendered images back

use crate::error::{Error, Result};
use crate::qr::{QrImage, QrPayload};
use image::{DynamicImage, GrayImage};

/// QR code decoder
pub struct QrDecoder {}

impl QrDecoder {
    /// Create a new QR decoder with default settings
    pub fn new() -> Self {
        Self {}
    }

    /// Decode a QR code from any image
    pub fn decode(&self, img: &DynamicImage) -> Result<QrPayload> {
        self.decode_gray(img.to_luma8())
    }

    /// Decode a QR code from a rendered RGB bitmap
    pub fn decode_rgb(&self, img: &QrImage) -> Result<QrPayload> {
        self.decode_gray(DynamicImage::ImageRgb8(img.clone()).into_luma8())
    }

    /// Decode a QR code from a grayscale image
    pub fn decode_gray(&self, img: GrayImage) -> Result<QrPayload> {
        let mut prepared = rqrr::PreparedImage::prepare(img);

        let grids = prepared.detect_grids();

        // A rendered symbol contains exactly one grid
        let grid = grids.first().ok_or(Error::NoQrCodeFound)?;

        match grid.decode() {
            Ok((meta, content)) => {
                tracing::debug!(
                    "Decoded QR: version={:?}, ecc_level={:?}, length={}",
                    meta.version,
                    meta.ecc_level,
                    content.len()
                );

                Ok(QrPayload::from_bytes(content.into_bytes()))
            }
            Err(e) => Err(Error::QrDecode(format!("Decode failed: {:?}", e))),
        }
    }
}

impl Default for QrDecoder {
    fn default() -> Self {
        Self::new()
    }
}
