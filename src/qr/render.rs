//! Rasterization of an encoded symbol into a two-color bitmap

use crate::error::{Error, Result};
use crate::qr::{MAX_IMAGE_SIDE, QrSymbol};
use image::{ImageBuffer, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rendered QR bitmap
pub type QrImage = RgbImage;

/// An opaque RGB color, written as a name or `#rgb`/`#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RgbColor(pub [u8; 3]);

impl RgbColor {
    /// `#000000`
    pub const BLACK: Self = Self([0, 0, 0]);
    /// `#ffffff`
    pub const WHITE: Self = Self([255, 255, 255]);

    fn named(name: &str) -> Option<Self> {
        let rgb = match name {
            "black" => [0, 0, 0],
            "white" => [255, 255, 255],
            "red" => [255, 0, 0],
            "green" => [0, 128, 0],
            "blue" => [0, 0, 255],
            "yellow" => [255, 255, 0],
            "cyan" => [0, 255, 255],
            "magenta" => [255, 0, 255],
            "gray" | "grey" => [128, 128, 128],
            _ => return None,
        };
        Some(Self(rgb))
    }

    fn hex(digits: &str) -> Option<Self> {
        if !digits.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (i, slot) in rgb.iter_mut().enumerate() {
                    let nibble = channel(&digits[i..i + 1])?;
                    *slot = nibble * 17;
                }
                Some(Self(rgb))
            }
            6 => Some(Self([
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            ])),
            _ => None,
        }
    }

    fn pixel(self) -> Rgb<u8> {
        Rgb(self.0)
    }
}

impl FromStr for RgbColor {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let value = value.trim().to_ascii_lowercase();
        let parsed = match value.strip_prefix('#') {
            Some(digits) => Self::hex(digits),
            None => Self::named(&value),
        };
        parsed.ok_or_else(|| format!("Unknown color '{value}', use a name or #rrggbb"))
    }
}

impl TryFrom<String> for RgbColor {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RgbColor> for String {
    fn from(color: RgbColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

/// Foreground (dark module) and background (light module) colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Dark modules
    pub fill: RgbColor,
    /// Light modules and the quiet zone
    pub back: RgbColor,
}

impl Palette {
    /// Build a palette from explicit colors
    pub fn new(fill: RgbColor, back: RgbColor) -> Self {
        Self { fill, back }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(RgbColor::BLACK, RgbColor::WHITE)
    }
}

/// Rasterize `symbol` with `box_size` pixels per module and `border` light
/// modules on every side.
///
/// The result is `(modules + 2 * border) * box_size` pixels square and only
/// ever contains the two palette colors.
pub fn render(symbol: &QrSymbol, box_size: u32, border: u32, palette: Palette) -> Result<QrImage> {
    if box_size == 0 {
        return Err(Error::InvalidParameter("box size must be at least 1".into()));
    }

    let modules = symbol.modules();
    let side = border
        .checked_mul(2)
        .and_then(|quiet| quiet.checked_add(modules))
        .and_then(|total| total.checked_mul(box_size))
        .filter(|side| *side <= MAX_IMAGE_SIDE)
        .ok_or_else(|| {
            Error::InvalidParameter(format!(
                "image side exceeds {MAX_IMAGE_SIDE}px: {modules} modules, border {border}, box {box_size}"
            ))
        })?;

    let fill = palette.fill.pixel();
    let back = palette.back.pixel();
    let mut img: QrImage = ImageBuffer::from_pixel(side, side, back);

    for y in 0..modules {
        for x in 0..modules {
            if !symbol.is_dark(x, y) {
                continue;
            }
            let left = (x + border) * box_size;
            let top = (y + border) * box_size;
            for dy in 0..box_size {
                for dx in 0..box_size {
                    img.put_pixel(left + dx, top + dy, fill);
                }
            }
        }
    }

    tracing::debug!(side, modules, border, box_size, "Rendered QR bitmap");
    Ok(img)
}
