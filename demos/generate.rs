//! Render the project URL plus a larger-module variant without opening a viewer
//!
//! Usage: cargo run --example generate

use std::path::Path;
use urqr::config::DEFAULT_PAYLOAD;
use urqr::{QrGenerator, QrRequest, output};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let generator = QrGenerator::verifying();

    let request = QrRequest::new(DEFAULT_PAYLOAD);
    let (symbol, image) = generator.generate(&request)?;
    output::save_png(&image, Path::new("url_QR_code.png"))?;
    println!(
        "✓ version {} ({} modules) saved to url_QR_code.png",
        symbol.version(),
        symbol.modules()
    );

    // Same content, print-friendly geometry
    let large = QrRequest::new(DEFAULT_PAYLOAD).box_size(20).border(2);
    let (_, image) = generator.generate(&large)?;
    output::save_png(&image, Path::new("url_QR_code_large.png"))?;
    println!("✓ {}x{} copy saved to url_QR_code_large.png", image.width(), image.height());

    Ok(())
}
