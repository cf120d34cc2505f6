mod io;


use std::path::Path;

pub use io::{load_grayscale_square, present};

use crate::common::{Error, Result};

/// Supported image file extensions for reading and writing.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "tif"];

/// Row-major grid of 8-bit intensity samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelGrid {
    /// Creates a zero-filled grid.
    pub fn new_empty(width: u32, height: u32) -> PixelGrid {
        Self::filled(width, height, 0)
    }

    pub fn filled(width: u32, height: u32, value: u8) -> PixelGrid {
        PixelGrid {
            width,
            height,
            pixels: vec![value; width as usize * height as usize],
        }
    }

    pub fn new_with_data(width: u32, height: u32, pixels: Vec<u8>) -> Result<PixelGrid> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(Error::InvalidDimensions(format!(
                "pixel buffer length {} does not match {}x{}",
                pixels.len(),
                width,
                height
            )));
        }

        Ok(PixelGrid {
            width,
            height,
            pixels,
        })
    }

    /// Builds a grid by evaluating `f(x, y)` in row-major order.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> u8) -> PixelGrid {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }

        PixelGrid {
            width,
            height,
            pixels,
        }
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

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn take_pixels(self) -> Vec<u8> {
        self.pixels
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.pixels[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        let index = self.index(x, y);
        self.pixels[index] = value;
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Returns the side length of a square grid.
    pub fn side(&self) -> Result<u32> {
        if !self.is_square() {
            return Err(Error::InvalidDimensions(format!(
                "expected a square image, got {}x{}",
                self.width, self.height
            )));
        }

        Ok(self.width)
    }

    /// Reads an image file and converts it to 8-bit grayscale.
    pub fn read_file<P: AsRef<Path>>(filename: P) -> Result<PixelGrid> {
        check_extension(filename.as_ref())?;
        io::load_luma(filename)
    }

    pub fn save_file<P: AsRef<Path>>(&self, filename: P) -> Result<()> {
        check_extension(filename.as_ref())?;
        io::save_luma(self, filename)
    }
}

fn check_extension(filename: &Path) -> Result<()> {
    let extension = filename
        .extension()
        .and_then(|os_str| os_str.to_str())
        .ok_or_else(|| Error::InvalidExtension("missing extension".to_string()))?
        .to_ascii_lowercase();

    if SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(Error::InvalidExtension(extension))
    }
}
