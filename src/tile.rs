use crate::error::Error;
use crate::palette::{Palette, Rgb};
use crate::rom::TILE_SIZE;

pub const TILE_WIDTH: usize = 8;
pub const TILE_HEIGHT: usize = 8;

/// An 8x8 tile with its palette applied.
///
/// Keeps the raw 2-bit pixel values next to the colours so that compositing
/// can decide what to do with value 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedTile {
    values: [[u8; TILE_WIDTH]; TILE_HEIGHT],
    pixels: [[Rgb; TILE_WIDTH]; TILE_HEIGHT],
}

impl DecodedTile {
    /// Returns the 2-bit pixel value at the given position.
    pub fn value(&self, x: usize, y: usize) -> u8 {
        self.values[y][x]
    }

    /// Returns the colour at the given position.
    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y][x]
    }
}

/// Splits a tile into its 2-bit pixel values.
///
/// A tile is two 8 byte bit planes, low plane first. Row `y` takes its low bit
/// from `tile[y]` and its high bit from `tile[y + 8]`, leftmost pixel in the
/// most significant bit.
pub fn tile_values(tile: &[u8]) -> Result<[[u8; TILE_WIDTH]; TILE_HEIGHT], Error> {
    if tile.len() != TILE_SIZE {
        return Err(Error::InvalidTileData { len: tile.len() });
    }

    let mut values = [[0; TILE_WIDTH]; TILE_HEIGHT];
    for (y, row) in values.iter_mut().enumerate() {
        let mut lower = tile[y];
        let mut upper = tile[y + 8];

        for x in (0..TILE_WIDTH).rev() {
            row[x] = (1 & upper) << 1 | (1 & lower);
            upper >>= 1;
            lower >>= 1;
        }
    }

    Ok(values)
}

/// Decodes a 16 byte tile and colours it with a 4 colour palette.
pub fn decode_tile(tile: &[u8], palette: &[Rgb]) -> Result<DecodedTile, Error> {
    let palette = Palette::new(palette)?;
    decode_with(tile, &palette)
}

/// Like `decode_tile`, for an already validated palette.
pub fn decode_with(tile: &[u8], palette: &Palette) -> Result<DecodedTile, Error> {
    let values = tile_values(tile)?;

    let mut pixels = [[Rgb::BLACK; TILE_WIDTH]; TILE_HEIGHT];
    for (pixel_row, value_row) in pixels.iter_mut().zip(values.iter()) {
        for (pixel, value) in pixel_row.iter_mut().zip(value_row.iter()) {
            *pixel = palette.colour(*value);
        }
    }

    Ok(DecodedTile { values, pixels })
}
