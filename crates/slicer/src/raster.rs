//! Module for 1-bit rasters and their png encoding

// crate modules
use crate::error::Result;

// standard library
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

// external crates
use image::GrayImage;

/// Gray level above which a pixel becomes white
const THRESHOLD: i32 = 128;

/// Strategy for reducing 8-bit grayscale to 1-bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dither {
    /// Floyd-Steinberg error diffusion, preserves mean tone
    #[default]
    FloydSteinberg,
    /// Hard threshold at mid-gray
    Threshold,
}

/// Packed black/white raster
///
/// Rows are packed most significant bit first with every row padded to a
/// whole number of bytes, exactly as a 1-bit grayscale png expects. A set bit
/// is white, pad bits are always clear.
///
/// ```rust
/// # use volstack_slicer::{Bitmap, Dither};
/// # use image::{GrayImage, Luma};
/// let gray = GrayImage::from_fn(10, 2, |x, _| Luma([if x < 5 { 0 } else { 255 }]));
/// let bitmap = Bitmap::from_gray(&gray, Dither::Threshold);
///
/// assert!(!bitmap.get(0, 0));
/// assert!(bitmap.get(9, 1));
/// assert!(bitmap.inverted().get(0, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    /// Bytes per packed row
    stride: usize,
    bits: Vec<u8>,
}

impl Bitmap {
    /// All-black bitmap of the given size
    pub fn new(width: u32, height: u32) -> Self {
        let stride = (width as usize).div_ceil(8);
        Self {
            width,
            height,
            stride,
            bits: vec![0; stride * height as usize],
        }
    }

    /// Reduce an 8-bit grayscale image to black and white
    pub fn from_gray(image: &GrayImage, dither: Dither) -> Self {
        match dither {
            Dither::FloydSteinberg => Self::floyd_steinberg(image),
            Dither::Threshold => Self::threshold(image),
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed rows, ready for a 1-bit png
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Whether the pixel at (x, y) is white
    pub fn get(&self, x: u32, y: u32) -> bool {
        let (byte, mask) = self.locate(x, y);
        self.bits[byte] & mask != 0
    }

    /// Count of white pixels
    pub fn count_white(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Tonal inverse, every pixel flipped
    pub fn inverted(&self) -> Self {
        let mut inverted = self.clone();
        if self.stride == 0 {
            return inverted;
        }

        let pad = (self.stride * 8 - self.width as usize) as u32;
        let last_mask = 0xFF_u8.checked_shl(pad).unwrap_or(0);

        for row in inverted.bits.chunks_exact_mut(self.stride) {
            row.iter_mut().for_each(|b| *b = !*b);
            if let Some(last) = row.last_mut() {
                *last &= last_mask;
            }
        }
        inverted
    }

    /// Write as a grayscale png with a bit depth of 1
    ///
    /// Uses the best available compression since slice stacks are mostly
    /// large uniform regions.
    pub fn write_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);

        let mut encoder = png::Encoder::new(writer, self.width, self.height);
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::One);
        encoder.set_compression(png::Compression::Best);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.bits)?;
        writer.finish()?;
        Ok(())
    }

    fn set(&mut self, x: u32, y: u32) {
        let (byte, mask) = self.locate(x, y);
        self.bits[byte] |= mask;
    }

    fn locate(&self, x: u32, y: u32) -> (usize, u8) {
        let byte = y as usize * self.stride + x as usize / 8;
        (byte, 0x80 >> (x % 8))
    }

    fn threshold(image: &GrayImage) -> Self {
        let mut bitmap = Self::new(image.width(), image.height());
        for (x, y, pixel) in image.enumerate_pixels() {
            if i32::from(pixel.0[0]) > THRESHOLD {
                bitmap.set(x, y);
            }
        }
        bitmap
    }

    fn floyd_steinberg(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        let mut bitmap = Self::new(width, height);
        let w = width as usize;

        // errors are carried in sixteenths, offset by one to avoid edge checks
        let mut current = vec![0_i32; w + 2];
        let mut below = vec![0_i32; w + 2];

        for y in 0..height {
            for x in 0..width {
                let i = x as usize;
                let level = i32::from(image.get_pixel(x, y).0[0]);
                let level = (level + current[i + 1] / 16).clamp(0, 255);

                let error = if level > THRESHOLD {
                    bitmap.set(x, y);
                    level - 255
                } else {
                    level
                };

                current[i + 2] += error * 7;
                below[i] += error * 3;
                below[i + 1] += error * 5;
                below[i + 2] += error;
            }

            std::mem::swap(&mut current, &mut below);
            below.fill(0);
        }

        bitmap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn rows_are_padded() {
        let bitmap = Bitmap::new(10, 3);
        assert_eq!(bitmap.as_bytes().len(), 6);
    }

    #[test]
    fn inverse_keeps_padding_clear() {
        let bitmap = Bitmap::new(10, 1);
        let inverted = bitmap.inverted();
        assert_eq!(inverted.as_bytes(), &[0xFF, 0xC0]);
        assert_eq!(inverted.count_white(), 10);
        assert_eq!(inverted.inverted(), bitmap);
    }

    #[test]
    fn threshold_is_strict() {
        let gray = GrayImage::from_fn(3, 1, |x, _| Luma([[128, 129, 255][x as usize]]));
        let bitmap = Bitmap::from_gray(&gray, Dither::Threshold);
        assert!(!bitmap.get(0, 0));
        assert!(bitmap.get(1, 0));
        assert!(bitmap.get(2, 0));
    }

    #[test]
    fn dithering_extremes_are_exact() {
        let black = GrayImage::from_pixel(16, 16, Luma([0]));
        let white = GrayImage::from_pixel(16, 16, Luma([255]));
        assert_eq!(Bitmap::from_gray(&black, Dither::FloydSteinberg).count_white(), 0);
        assert_eq!(
            Bitmap::from_gray(&white, Dither::FloydSteinberg).count_white(),
            256
        );
    }

    #[test]
    fn dithering_preserves_mean_tone() {
        let gray = GrayImage::from_pixel(64, 64, Luma([64]));
        let white = Bitmap::from_gray(&gray, Dither::FloydSteinberg).count_white();

        // a quarter of the pixels, give or take the diffusion at the edges
        let expected = 64 * 64 / 4;
        assert!(white.abs_diff(expected) < 128, "{white} white pixels");

        // plain thresholding loses the tone entirely
        assert_eq!(Bitmap::from_gray(&gray, Dither::Threshold).count_white(), 0);
    }
}
