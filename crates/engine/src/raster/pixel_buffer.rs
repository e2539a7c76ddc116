use std::fmt;
use std::str::FromStr;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError};
use thiserror::Error;

use crate::geom::{Vec2, Viewport};

pub const BYTES_PER_PIXEL: usize = 4;
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("pixel buffer dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },
    #[error("pixel buffer of {width}x{height} needs {expected} bytes, got {actual}")]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("failed to decode image: {0}")]
    Decode(#[source] ImageError),
    #[error("failed to encode png: {0}")]
    Encode(#[source] ImageError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid colour '{text}', expected #rrggbb")]
pub struct ColorParseError {
    text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn opaque(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || ColorParseError {
            text: text.to_string(),
        };
        let hex = text.trim().strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampMode {
    Draw(Rgb),
    Erase,
}

impl StampMode {
    fn rgba(self) -> [u8; 4] {
        match self {
            StampMode::Draw(color) => color.opaque(),
            StampMode::Erase => TRANSPARENT,
        }
    }
}

/// Owned row-major RGBA8 image. `pixels.len() == width * height * 4` always holds.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl PixelBuffer {
    pub fn new_transparent(width: u32, height: u32) -> Result<Self, RasterError> {
        let len = byte_len(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![0; len],
        })
    }

    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RasterError> {
        let expected = byte_len(width, height)?;
        if pixels.len() != expected {
            return Err(RasterError::LengthMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn from_fn(
        width: u32,
        height: u32,
        mut pixel_at: impl FnMut(u32, u32) -> [u8; 4],
    ) -> Result<Self, RasterError> {
        let mut buffer = Self::new_transparent(width, height)?;
        for y in 0..height {
            for x in 0..width {
                let offset = buffer.offset(x, y);
                buffer.pixels[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&pixel_at(x, y));
            }
        }
        Ok(buffer)
    }

    /// Decodes any format enabled on the `image` crate into RGBA8.
    pub fn decode(bytes: &[u8]) -> Result<Self, RasterError> {
        let rgba = image::load_from_memory(bytes)
            .map_err(RasterError::Decode)?
            .to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba(width, height, rgba.into_raw())
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, RasterError> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(
                &self.pixels,
                self.width,
                self.height,
                ExtendedColorType::Rgba8,
            )
            .map_err(RasterError::Encode)?;
        Ok(out)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.offset(x, y);
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.pixels[offset..offset + BYTES_PER_PIXEL]);
        Some(rgba)
    }

    /// Stamps a filled square of side `size` at `center` in place and returns how many
    /// pixels were written. The square spans `size / 2` pixels before the center pixel
    /// and the remainder after it; pixels outside the buffer are skipped.
    pub fn stamp_square(&mut self, center: Vec2, size: u32, mode: StampMode) -> usize {
        if size == 0 || !center.x.is_finite() || !center.y.is_finite() {
            return 0;
        }
        let rgba = mode.rgba();
        let half = i64::from(size / 2);
        let start_x = center.x.floor() as i64 - half;
        let start_y = center.y.floor() as i64 - half;
        let end_x = (start_x + i64::from(size)).min(i64::from(self.width));
        let end_y = (start_y + i64::from(size)).min(i64::from(self.height));

        let mut written = 0;
        for py in start_y.max(0)..end_y {
            for px in start_x.max(0)..end_x {
                let offset = self.offset(px as u32, py as u32);
                self.pixels[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&rgba);
                written += 1;
            }
        }
        written
    }

    /// Copy-on-write variant of [`PixelBuffer::stamp_square`].
    pub fn stamped(&self, center: Vec2, size: u32, mode: StampMode) -> PixelBuffer {
        let mut next = self.clone();
        next.stamp_square(center, size, mode);
        next
    }

    /// Copies the sub-rectangle clamped to the buffer bounds. Returns `None` when the
    /// clamped rectangle has no area.
    pub fn crop_rect(&self, x: i64, y: i64, width: i64, height: i64) -> Option<PixelBuffer> {
        let buffer_width = i64::from(self.width);
        let buffer_height = i64::from(self.height);
        let left = x.clamp(0, buffer_width);
        let top = y.clamp(0, buffer_height);
        let right = x.saturating_add(width).clamp(0, buffer_width);
        let bottom = y.saturating_add(height).clamp(0, buffer_height);
        if right - left < 1 || bottom - top < 1 {
            return None;
        }

        let crop_width = (right - left) as u32;
        let crop_height = (bottom - top) as u32;
        let row_bytes = crop_width as usize * BYTES_PER_PIXEL;
        let mut pixels = Vec::with_capacity(row_bytes * crop_height as usize);
        for row in top..bottom {
            let start = self.offset(left as u32, row as u32);
            pixels.extend_from_slice(&self.pixels[start..start + row_bytes]);
        }
        Some(PixelBuffer {
            width: crop_width,
            height: crop_height,
            pixels,
        })
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL
    }
}

fn byte_len(width: u32, height: u32) -> Result<usize, RasterError> {
    if width == 0 || height == 0 {
        return Err(RasterError::ZeroDimensions { width, height });
    }
    Ok(width as usize * height as usize * BYTES_PER_PIXEL)
}
