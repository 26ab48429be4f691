//! Persisting rendered images and reporting what was produced

pub mod viewer;

pub use viewer::{DisplayOutcome, DisplayPolicy};

use crate::error::Result;
use crate::qr::{EcLevel, QrImage, QrRequest, QrSymbol};
use image::ImageFormat;
use serde::Serialize;
use serde_json::Value;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Write `image` as PNG to `path`, replacing any existing file.
///
/// Missing parent directories are created.
pub fn save_png(image: &QrImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    image.save_with_format(path, ImageFormat::Png)?;
    tracing::info!(path = %path.display(), "Saved QR image");
    Ok(())
}

/// Encode `image` as PNG bytes in memory.
pub fn encode_png(image: &QrImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

/// Summary of one generator run
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// Where the PNG was written
    pub path: PathBuf,
    /// Encoded text
    pub payload: String,
    /// Payload length in bytes
    pub payload_bytes: usize,
    /// Version asked for
    pub requested_version: i16,
    /// Version actually used
    pub version: i16,
    /// Error correction level
    pub ec_level: EcLevel,
    /// Modules per side, excluding the border
    pub modules: u32,
    /// Quiet zone in modules
    pub border: u32,
    /// Pixels per module
    pub box_size: u32,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Whether the image was decoded and compared with the payload
    pub verified: bool,
    /// What happened when handing the file to a viewer
    pub display: DisplayOutcome,
}

impl GenerationReport {
    /// Collect the report fields from one run's artefacts.
    pub fn new(
        path: &Path,
        request: &QrRequest,
        symbol: &QrSymbol,
        image: &QrImage,
        verified: bool,
        display: DisplayOutcome,
    ) -> Self {
        Self {
            path: path.to_path_buf(),
            payload: request.payload().display_text(),
            payload_bytes: request.payload().as_bytes().len(),
            requested_version: request.requested_version(),
            version: symbol.version(),
            ec_level: symbol.ec_level(),
            modules: symbol.modules(),
            border: request.border_modules(),
            box_size: request.module_pixels(),
            width: image.width(),
            height: image.height(),
            verified,
            display,
        }
    }

    /// Structured JSON representation
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Human-readable lines for terminal presentation
    pub fn human_lines(&self) -> Vec<String> {
        let mut human = Vec::new();

        human.push(format!("QR code written to {}", self.path.display()));
        human.push(format!(
            "  Payload: {} ({} bytes)",
            self.payload, self.payload_bytes
        ));
        if self.version == self.requested_version {
            human.push(format!("  Version: {}", self.version));
        } else {
            human.push(format!(
                "  Version: {} (requested {}, grown to fit)",
                self.version, self.requested_version
            ));
        }
        human.push(format!("  Error correction: {}", self.ec_level));
        human.push(format!(
            "  Modules: {} + {}x2 border, {}px each",
            self.modules, self.border, self.box_size
        ));
        human.push(format!("  Image: {}x{} px", self.width, self.height));
        if self.verified {
            human.push("  Verified: decodes to payload".to_string());
        }
        human.push(format!("  Display: {}", self.display));

        human
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::{QrGenerator, QrRequest};

    #[test]
    fn save_creates_parents_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/code.png");
        let (_, image) = QrGenerator::new().generate(&QrRequest::new("A")).unwrap();

        save_png(&image, &path).unwrap();
        assert!(path.exists());

        std::fs::write(&path, b"stale").unwrap();
        save_png(&image, &path).unwrap();

        let on_disk = std::fs::read(&path).unwrap();
        assert_eq!(on_disk, encode_png(&image).unwrap());
    }

    #[test]
    fn png_bytes_have_signature() {
        let (_, image) = QrGenerator::new().generate(&QrRequest::new("A")).unwrap();
        let bytes = encode_png(&image).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn report_describes_fit() {
        let request = QrRequest::new("https://snivallus.github.io/Multi-agent/");
        let (symbol, image) = QrGenerator::new().generate(&request).unwrap();
        let report = GenerationReport::new(
            Path::new("url_QR_code.png"),
            &request,
            &symbol,
            &image,
            false,
            DisplayOutcome::Skipped,
        );

        assert_eq!(report.width, (symbol.modules() + 8) * 10);
        assert_eq!(report.payload_bytes, 40);
        let lines = report.human_lines();
        assert!(lines.iter().any(|l| l.contains("grown to fit")));

        let json = report.to_json().unwrap();
        assert_eq!(json["ec_level"], "L");
        assert_eq!(json["display"]["status"], "skipped");
        assert_eq!(json["requested_version"], 1);
    }
}
