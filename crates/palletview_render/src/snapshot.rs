//! Still images of the scene
//!
//! A [`Snapshot`] is an RGBA8 image read back from an offscreen render, rows
//! top to bottom.

use std::path::Path;

use image::error::{ParameterError, ParameterErrorKind};
use image::{ImageError, RgbaImage};
use palletview_core::Color;

/// Default snapshot resolution
pub const SNAPSHOT_SIZE: (u32, u32) = (1920, 1080);

/// RGBA8 pixels of a captured frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Snapshot {
    /// Wrap tightly packed RGBA8 rows; `None` if the length does not match
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self { width, height, pixels })
    }

    /// Image of a single color
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let hex = color.to_hex();
        let rgba = [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 0xff];
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self { width, height, pixels }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA of one pixel
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]])
    }

    /// Write the image as a PNG file
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), ImageError> {
        let image = RgbaImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or_else(|| {
            ImageError::Parameter(ParameterError::from_kind(ParameterErrorKind::DimensionMismatch))
        })?;
        image.save_with_format(path, image::ImageFormat::Png)
    }
}
