//! Owned RGBA pixel buffers used for captured regions and tile images.

use crate::error::ImageError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps raw RGBA bytes, checking that the length matches the dimensions.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, ImageError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(ImageError::LengthMismatch {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self { width, height, rgba })
    }

    #[cfg(test)]
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            rgba.extend_from_slice(&color);
        }
        Self { width, height, rgba }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.rgba
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]])
    }

    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Result<PixelBuffer, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::Empty { width, height });
        }
        let fits_x = x.checked_add(width).is_some_and(|r| r <= self.width);
        let fits_y = y.checked_add(height).is_some_and(|b| b <= self.height);
        if !fits_x || !fits_y {
            return Err(ImageError::CropOutOfBounds {
                x,
                y,
                width,
                height,
                bounds_w: self.width,
                bounds_h: self.height,
            });
        }
        let row_bytes = width as usize * 4;
        let mut rgba = Vec::with_capacity(row_bytes * height as usize);
        for row in y..y + height {
            let start = (row as usize * self.width as usize + x as usize) * 4;
            rgba.extend_from_slice(&self.rgba[start..start + row_bytes]);
        }
        Ok(PixelBuffer { width, height, rgba })
    }

    /// Cuts the image into `cols * rows` row-major pieces of
    /// `floor(width / cols) x floor(height / rows)`; leftover edge pixels are dropped.
    pub fn slice_grid(&self, cols: u32, rows: u32) -> Result<Vec<PixelBuffer>, ImageError> {
        let piece_w = self.width / cols.max(1);
        let piece_h = self.height / rows.max(1);
        if piece_w == 0 || piece_h == 0 {
            return Err(ImageError::Empty {
                width: self.width,
                height: self.height,
            });
        }
        let mut pieces = Vec::with_capacity((cols * rows) as usize);
        for row in 0..rows {
            for col in 0..cols {
                pieces.push(self.crop(col * piece_w, row * piece_h, piece_w, piece_h)?);
            }
        }
        Ok(pieces)
    }
}
