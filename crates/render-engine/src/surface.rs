//! Offscreen RGBA surface frames are composited onto.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use montage_common::{MontageError, MontageResult};

/// An owned RGBA pixel buffer with fixed dimensions.
///
/// One surface lives for the whole export; the pipeline re-fills it each
/// frame rather than reallocating.
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// Allocate a surface. Zero-sized surfaces cannot be drawn on and are
    /// rejected here as well as by option validation.
    pub fn new(width: u32, height: u32) -> MontageResult<Self> {
        if width == 0 || height == 0 {
            return Err(MontageError::render(format!(
                "cannot allocate a {width}x{height} surface"
            )));
        }

        Ok(Self {
            pixels: RgbaImage::new(width, height),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Flood the whole surface with one color.
    pub fn fill(&mut self, color: Rgba<u8>) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = color;
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }

    /// Encode the current pixels as a PNG byte buffer.
    pub fn encode_png(&self) -> MontageResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| MontageError::render(format!("PNG encode failed: {e}")))?;
        Ok(bytes)
    }
}

/// Parse a `#rrggbb` or `#rrggbbaa` color string. Anything unparseable
/// falls back to opaque black, which matches what the compositor would
/// otherwise paint for an empty background.
pub fn parse_hex_color(value: &str) -> Rgba<u8> {
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    let hex = value.trim().trim_start_matches('#');
    let channel = |at: usize| {
        hex.get(at..at + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
    };

    match hex.len() {
        6 => match (channel(0), channel(2), channel(4)) {
            (Some(r), Some(g), Some(b)) => Rgba([r, g, b, 255]),
            _ => BLACK,
        },
        8 => match (channel(0), channel(2), channel(4), channel(6)) {
            (Some(r), Some(g), Some(b), Some(a)) => Rgba([r, g, b, a]),
            _ => BLACK,
        },
        _ => BLACK,
    }
}
