use crate::error::Error;
use crate::palette::Rgb;

/// Frame represents a rendered image as packed RGB bytes, row by row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl Frame {
    /// Background colour of a fresh frame.
    pub const BACKGROUND: Rgb = Rgb::WHITE;

    /// Largest width or height of a frame. Bitmap dimensions are signed
    /// 32-bit values.
    pub const MAX_DIMENSION: usize = i32::MAX as usize;

    /// Returns a new frame filled with the background colour.
    pub fn new(width: usize, height: usize) -> Result<Self, Error> {
        let too_large = || Error::ImageTooLarge { width, height };
        if width > Frame::MAX_DIMENSION || height > Frame::MAX_DIMENSION {
            return Err(too_large());
        }

        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(3))
            .ok_or_else(too_large)?;

        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| too_large())?;

        let bg = Frame::BACKGROUND;
        for _ in 0..len / 3 {
            data.extend_from_slice(&[bg.0, bg.1, bg.2]);
        }

        Ok(Frame {
            width,
            height,
            data,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Sets a pixel in the given position with the given colour. Pixels
    /// outside the frame are ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: Rgb) {
        if x >= self.width || y >= self.height {
            return;
        }

        let base = (y * self.width + x) * 3;
        self.data[base] = rgb.0;
        self.data[base + 1] = rgb.1;
        self.data[base + 2] = rgb.2;
    }

    /// Returns the colour at the given position.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let base = (y * self.width + x) * 3;
        Some(Rgb(self.data[base], self.data[base + 1], self.data[base + 2]))
    }

    /// Returns the current frame contents.
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }
}
