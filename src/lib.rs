//! URQR - render a URL as a QR code PNG
//!
//! Encodes one payload with the `qrcode` crate, rasterizes it with a fixed
//! box size and quiet zone, writes the PNG and hands it to the desktop's
//! image viewer.
//!
//! # Example
//!
//! ```no_run
//! use urqr::{QrGenerator, QrRequest, output};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let request = QrRequest::new("https://example.com/").box_size(8).border(2);
//!     let (symbol, image) = QrGenerator::new().generate(&request)?;
//!     output::save_png(&image, Path::new("example.png"))?;
//!     println!("version {} ({} modules)", symbol.version(), symbol.modules());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]

pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod qr;

// Re-exports for convenience
pub use error::{Error, Result};

pub use config::{LogRotation, LoggingOptions, OutputOptions, QrOptions, UrqrConfig};
pub use output::{DisplayOutcome, DisplayPolicy, GenerationReport};
pub use qr::{
    EcLevel, Palette, QrDecoder, QrGenerator, QrImage, QrPayload, QrRequest, QrSymbol, RgbColor,
};

/// Run the whole pipeline once for the fixed URL: encode, render, save,
/// then display.
///
/// Saving failures abort the run. Display follows
/// [`OutputOptions::display`], so under the default best-effort policy a
/// missing viewer only shows up in the report.
pub fn run(config: &UrqrConfig) -> Result<GenerationReport> {
    run_request(&config.qr.to_request(), config)
}

/// Same pipeline as [`run`] for an arbitrary request.
pub fn run_request(request: &QrRequest, config: &UrqrConfig) -> Result<GenerationReport> {
    let generator = if config.qr.verify {
        QrGenerator::verifying()
    } else {
        QrGenerator::new()
    };

    tracing::info!(
        payload = %request.payload().display_text(),
        version = request.requested_version(),
        ec_level = %request.level(),
        "Generating QR code"
    );

    let (symbol, image) = generator.generate(request)?;
    let path = config.output.path.as_path();
    output::save_png(&image, path)?;

    let display = output::viewer::present(path, config.output.display)?;

    Ok(GenerationReport::new(
        path,
        request,
        &symbol,
        &image,
        generator.verifies(),
        display,
    ))
}
