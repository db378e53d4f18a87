pub mod font;
pub mod frame;

use std::num::NonZeroUsize;

use log::debug;
use serde::Deserialize;

use crate::error::Error;
use crate::palette::{Palette, Rgb};
use crate::rom::{read_tile_bytes, SpriteRegion, TILE_SIZE};
use crate::tile::{decode_with, DecodedTile, TILE_HEIGHT, TILE_WIDTH};
use frame::Frame;

/// Colour of the row labels in a sprite dump.
pub const LABEL_COLOUR: Rgb = Rgb::GREEN;

/// What to do with pixels of value 0 when placing a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Transparency {
    /// Draw value 0 with the palette's first colour.
    Opaque,

    /// Leave whatever is underneath value 0 pixels.
    Transparent,
}

/// A decoded tile and the tile-grid cell it goes in.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub tile: DecodedTile,
    pub row: usize,
    pub col: usize,
}

/// Copies a tile into the frame with its top-left corner at (x, y).
fn blit(frame: &mut Frame, tile: &DecodedTile, x: usize, y: usize, transparency: Transparency) {
    for ty in 0..TILE_HEIGHT {
        for tx in 0..TILE_WIDTH {
            if transparency == Transparency::Transparent && tile.value(tx, ty) == 0 {
                continue;
            }
            frame.set_pixel(x.saturating_add(tx), y.saturating_add(ty), tile.pixel(tx, ty));
        }
    }
}

/// Draws placements onto an existing frame in order; later placements win
/// where they overlap. Anything falling outside the frame is dropped.
pub fn compose_into(frame: &mut Frame, placements: &[Placement], transparency: Transparency) {
    for p in placements {
        let x = p.col.saturating_mul(TILE_WIDTH);
        let y = p.row.saturating_mul(TILE_HEIGHT);
        blit(frame, &p.tile, x, y, transparency);
    }
}

/// Returns a blank frame `cols` by `rows` tiles in size. Sizes that overflow
/// saturate and are then rejected by `Frame::new`.
fn tile_frame(cols: usize, rows: usize) -> Result<Frame, Error> {
    Frame::new(cols.saturating_mul(TILE_WIDTH), rows.saturating_mul(TILE_HEIGHT))
}

/// Builds a frame just big enough for every placement.
pub fn compose(placements: &[Placement], transparency: Transparency) -> Result<Frame, Error> {
    let cols = placements.iter().map(|p| p.col.saturating_add(1)).max().unwrap_or(0);
    let rows = placements.iter().map(|p| p.row.saturating_add(1)).max().unwrap_or(0);

    let mut frame = tile_frame(cols, rows)?;
    compose_into(&mut frame, placements, transparency);
    Ok(frame)
}

/// Tiles of a ROM's sprite region, addressed by index.
pub struct TileSheet<'a> {
    rom: &'a [u8],
    region: SpriteRegion,
}

impl<'a> TileSheet<'a> {
    pub fn new(rom: &'a [u8], region: SpriteRegion) -> Self {
        TileSheet { rom, region }
    }

    pub fn tile_count(&self) -> usize {
        self.region.tile_count()
    }

    /// Reads and decodes the tile with the given index.
    pub fn tile(&self, index: usize, palette: &Palette) -> Result<DecodedTile, Error> {
        if index >= self.tile_count() {
            return Err(Error::OutOfRange {
                offset: self
                    .region
                    .base_offset
                    .saturating_add(index.saturating_mul(TILE_SIZE)),
                len: TILE_SIZE,
                rom_len: self.rom.len(),
            });
        }

        let bytes = read_tile_bytes(self.rom, self.region.base_offset, index)?;
        decode_with(&bytes, palette)
    }
}

/// Returns the size in pixels of a sprite made of rows of tiles.
pub fn sprite_size(sprite: &[Vec<usize>]) -> (usize, usize) {
    let cols = sprite.iter().map(Vec::len).max().unwrap_or(0);
    (cols * TILE_WIDTH, sprite.len() * TILE_HEIGHT)
}

/// Places each tile of a sprite, starting at the given tile-grid cell.
pub fn sprite_placements(
    sheet: &TileSheet,
    sprite: &[Vec<usize>],
    palette: &Palette,
    row: usize,
    col: usize,
) -> Result<Vec<Placement>, Error> {
    let mut placements = Vec::new();
    for (sprite_row, indices) in sprite.iter().enumerate() {
        for (sprite_col, &index) in indices.iter().enumerate() {
            placements.push(Placement {
                tile: sheet.tile(index, palette)?,
                row: row + sprite_row,
                col: col + sprite_col,
            });
        }
    }

    Ok(placements)
}

/// Renders a single multi-tile sprite.
pub fn draw_sprite(
    sheet: &TileSheet,
    sprite: &[Vec<usize>],
    palette: &Palette,
    transparency: Transparency,
) -> Result<Frame, Error> {
    let (width, height) = sprite_size(sprite);
    let placements = sprite_placements(sheet, sprite, palette, 0, 0)?;

    let mut frame = Frame::new(width, height)?;
    compose_into(&mut frame, &placements, transparency);
    Ok(frame)
}

/// One sprite in a block, with the palette to draw it in.
#[derive(Debug, Clone)]
pub struct BlockEntry<'a> {
    pub sprite: &'a [Vec<usize>],
    pub palette: Palette,
}

/// Returns the size in pixels of a sprite block. Sprites in a row sit side by
/// side and the row is as tall as its tallest sprite.
pub fn block_size(block: &[Vec<BlockEntry>]) -> (usize, usize) {
    let mut width: usize = 0;
    let mut height: usize = 0;

    for row in block {
        let (row_width, row_height) = row
            .iter()
            .map(|entry| sprite_size(entry.sprite))
            .fold((0usize, 0usize), |(w, h), (sw, sh)| (w.saturating_add(sw), h.max(sh)));
        width = width.max(row_width);
        height = height.saturating_add(row_height);
    }

    (width, height)
}

/// Renders rows of sprites, each with its own palette.
pub fn draw_sprite_block(
    sheet: &TileSheet,
    block: &[Vec<BlockEntry>],
    transparency: Transparency,
) -> Result<Frame, Error> {
    let (width, height) = block_size(block);
    let mut frame = Frame::new(width, height)?;
    let mut placements = Vec::new();

    // Sprites are whole tiles, so the block can be laid out on the tile grid.
    let mut top = 0;
    for row in block {
        let mut left = 0;
        let mut row_height = 0;
        for entry in row {
            placements.extend(sprite_placements(sheet, entry.sprite, &entry.palette, top, left)?);

            let (sprite_width, sprite_height) = sprite_size(entry.sprite);
            left += sprite_width / TILE_WIDTH;
            row_height = row_height.max(sprite_height / TILE_HEIGHT);
        }
        top += row_height;
    }

    debug!("sprite block: {} tiles, {}x{}", placements.len(), width, height);

    compose_into(&mut frame, &placements, transparency);
    Ok(frame)
}

/// Renders every tile in the sheet, `per_row` to a row. When `labels` is set
/// each row starts with the index of its first tile, drawn over the tiles.
pub fn dump_all(
    sheet: &TileSheet,
    palette: &Palette,
    per_row: NonZeroUsize,
    labels: bool,
    transparency: Transparency,
) -> Result<Frame, Error> {
    let per_row = per_row.get();
    let count = sheet.tile_count();
    let rows = count.div_ceil(per_row);
    let cols = if count == 0 { 0 } else { per_row };
    let mut frame = tile_frame(cols, rows)?;

    let mut placements = Vec::with_capacity(count);
    for index in 0..count {
        placements.push(Placement {
            tile: sheet.tile(index, palette)?,
            row: index / per_row,
            col: index % per_row,
        });
    }

    compose_into(&mut frame, &placements, transparency);

    if labels {
        for row in 0..rows {
            font::stamp_number(&mut frame, 0, row * TILE_HEIGHT, row * per_row, LABEL_COLOUR);
        }
    }

    debug!("dumped {} tiles in {} rows", count, rows);
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::decode_tile;

    const COLOURS: [Rgb; 4] = [
        Rgb(0x10, 0x10, 0x10),
        Rgb(0x20, 0x20, 0x20),
        Rgb(0x30, 0x30, 0x30),
        Rgb(0x40, 0x40, 0x40),
    ];

    // Tile whose rows are all `value`.
    fn solid_bytes(value: u8) -> [u8; 16] {
        let low = if value & 1 == 1 { 0xFF } else { 0 };
        let high = if value & 2 == 2 { 0xFF } else { 0 };
        let mut bytes = [low; 16];
        bytes[8..].fill(high);
        bytes
    }

    fn solid(value: u8) -> DecodedTile {
        decode_tile(&solid_bytes(value), &COLOURS).unwrap()
    }

    // A sprite region holding tiles of value 0, 1, 2, 3, 1, 2, ...
    fn sheet_bytes(count: usize) -> Vec<u8> {
        (0..count)
            .flat_map(|i| solid_bytes(if i == 0 { 0 } else { ((i - 1) % 3 + 1) as u8 }))
            .collect()
    }

    fn region(bytes: &[u8]) -> SpriteRegion {
        SpriteRegion {
            base_offset: 0,
            len: bytes.len(),
        }
    }

    fn palette() -> Palette {
        Palette::new(&COLOURS).unwrap()
    }

    fn assert_tile_at(frame: &Frame, col: usize, row: usize, colour: Rgb) {
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(frame.pixel(col * 8 + x, row * 8 + y), Some(colour));
            }
        }
    }

    #[test]
    fn test_compose_distinct_cells() {
        let a = solid(1);
        let b = solid(2);
        let frame = compose(
            &[
                Placement { tile: a, row: 0, col: 0 },
                Placement { tile: b, row: 1, col: 2 },
            ],
            Transparency::Opaque,
        )
        .unwrap();

        assert_eq!((frame.width, frame.height), (24, 16));
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(frame.pixel(x, y), Some(a.pixel(x, y)));
                assert_eq!(frame.pixel(16 + x, 8 + y), Some(b.pixel(x, y)));
            }
        }
        assert_tile_at(&frame, 1, 0, Frame::BACKGROUND);
    }

    #[test]
    fn test_compose_last_write_wins() {
        let frame = compose(
            &[
                Placement { tile: solid(1), row: 0, col: 0 },
                Placement { tile: solid(3), row: 0, col: 0 },
            ],
            Transparency::Opaque,
        )
        .unwrap();

        assert_eq!((frame.width, frame.height), (8, 8));
        assert_tile_at(&frame, 0, 0, COLOURS[3]);
    }

    #[test]
    fn test_compose_transparent_keeps_underlying_pixels() {
        let placements = [
            Placement { tile: solid(2), row: 0, col: 0 },
            Placement { tile: solid(0), row: 0, col: 0 },
        ];

        let frame = compose(&placements, Transparency::Transparent).unwrap();
        assert_tile_at(&frame, 0, 0, COLOURS[2]);

        let frame = compose(&placements, Transparency::Opaque).unwrap();
        assert_tile_at(&frame, 0, 0, COLOURS[0]);
    }

    #[test]
    fn test_compose_empty() {
        let frame = compose(&[], Transparency::Opaque).unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn test_compose_too_large() {
        let far = Placement { tile: solid(1), row: 0, col: usize::MAX / 8 };
        assert!(matches!(
            compose(&[far], Transparency::Opaque),
            Err(Error::ImageTooLarge { .. })
        ));

        let last = Placement { tile: solid(1), row: usize::MAX, col: 0 };
        assert!(matches!(
            compose(&[last], Transparency::Opaque),
            Err(Error::ImageTooLarge { height: usize::MAX, .. })
        ));
    }

    #[test]
    fn test_compose_into_drops_far_placements() {
        let mut frame = Frame::new(8, 8).unwrap();
        let far = Placement { tile: solid(3), row: usize::MAX, col: usize::MAX };
        compose_into(&mut frame, &[far], Transparency::Opaque);
        assert_eq!(frame, Frame::new(8, 8).unwrap());
    }

    #[test]
    fn test_sheet_tile_out_of_range() {
        let bytes = sheet_bytes(2);
        let sheet = TileSheet::new(&bytes, region(&bytes));

        assert!(sheet.tile(1, &palette()).is_ok());
        assert!(matches!(
            sheet.tile(2, &palette()),
            Err(Error::OutOfRange { offset: 32, .. })
        ));
    }

    #[test]
    fn test_sprite_size() {
        let sprite = vec![vec![0, 1], vec![2, 3, 1]];
        assert_eq!(sprite_size(&sprite), (24, 16));
        assert_eq!(sprite_size(&[]), (0, 0));
    }

    #[test]
    fn test_draw_sprite() {
        let bytes = sheet_bytes(4);
        let sheet = TileSheet::new(&bytes, region(&bytes));
        let sprite = vec![vec![1, 2], vec![3]];

        let frame = draw_sprite(&sheet, &sprite, &palette(), Transparency::Opaque).unwrap();

        assert_eq!((frame.width, frame.height), (16, 16));
        assert_tile_at(&frame, 0, 0, COLOURS[1]);
        assert_tile_at(&frame, 1, 0, COLOURS[2]);
        assert_tile_at(&frame, 0, 1, COLOURS[3]);
        assert_tile_at(&frame, 1, 1, Frame::BACKGROUND);
    }

    #[test]
    fn test_draw_sprite_bad_index() {
        let bytes = sheet_bytes(4);
        let sheet = TileSheet::new(&bytes, region(&bytes));
        let sprite = vec![vec![1, 9]];

        assert!(matches!(
            draw_sprite(&sheet, &sprite, &palette(), Transparency::Opaque),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_draw_sprite_block() {
        let bytes = sheet_bytes(4);
        let sheet = TileSheet::new(&bytes, region(&bytes));

        let tall = vec![vec![1], vec![1]];
        let wide = vec![vec![2, 2]];
        let small = vec![vec![3]];

        let other = Palette::new(&[Rgb::BLACK, Rgb(9, 9, 9), Rgb::BLACK, Rgb::BLACK]).unwrap();
        let block = vec![
            vec![
                BlockEntry { sprite: &tall, palette: palette() },
                BlockEntry { sprite: &wide, palette: palette() },
            ],
            vec![BlockEntry { sprite: &small, palette: palette() }],
            vec![BlockEntry { sprite: &tall, palette: other }],
        ];

        assert_eq!(block_size(&block), (24, 40));

        let frame = draw_sprite_block(&sheet, &block, Transparency::Opaque).unwrap();
        assert_eq!((frame.width, frame.height), (24, 40));

        // First row is two tiles tall because of `tall`.
        assert_tile_at(&frame, 0, 0, COLOURS[1]);
        assert_tile_at(&frame, 0, 1, COLOURS[1]);
        assert_tile_at(&frame, 1, 0, COLOURS[2]);
        assert_tile_at(&frame, 2, 0, COLOURS[2]);
        assert_tile_at(&frame, 1, 1, Frame::BACKGROUND);

        // Second row starts below it.
        assert_tile_at(&frame, 0, 2, COLOURS[3]);
        assert_tile_at(&frame, 1, 2, Frame::BACKGROUND);

        // Third row uses its own palette.
        assert_tile_at(&frame, 0, 3, Rgb(9, 9, 9));
        assert_tile_at(&frame, 0, 4, Rgb(9, 9, 9));
    }

    #[test]
    fn test_dump_all() {
        let bytes = sheet_bytes(7);
        let sheet = TileSheet::new(&bytes, region(&bytes));
        let per_row = NonZeroUsize::new(3).unwrap();

        let frame = dump_all(&sheet, &palette(), per_row, false, Transparency::Opaque).unwrap();

        assert_eq!((frame.width, frame.height), (24, 24));
        assert_tile_at(&frame, 0, 0, COLOURS[0]);
        assert_tile_at(&frame, 1, 0, COLOURS[1]);
        assert_tile_at(&frame, 0, 1, COLOURS[3]);
        assert_tile_at(&frame, 0, 2, COLOURS[3]);
        assert_tile_at(&frame, 1, 2, Frame::BACKGROUND);
    }

    #[test]
    fn test_dump_all_labels() {
        let bytes = sheet_bytes(7);
        let sheet = TileSheet::new(&bytes, region(&bytes));
        let per_row = NonZeroUsize::new(3).unwrap();

        let frame = dump_all(&sheet, &palette(), per_row, true, Transparency::Opaque).unwrap();

        // "0", "3" and "6" all have a lit top-left pixel.
        for row in 0..3 {
            assert_eq!(frame.pixel(0, row * 8), Some(LABEL_COLOUR));
        }
        // Label glyphs are 5 rows tall; the rest of the tile is untouched.
        assert_eq!(frame.pixel(0, 7), Some(COLOURS[0]));
        assert_eq!(frame.pixel(4, 0), Some(COLOURS[0]));
    }

    #[test]
    fn test_dump_all_too_wide() {
        let bytes = sheet_bytes(2);
        let sheet = TileSheet::new(&bytes, region(&bytes));

        for per_row in [usize::MAX / 4, usize::MAX, Frame::MAX_DIMENSION] {
            let per_row = NonZeroUsize::new(per_row).unwrap();
            assert!(matches!(
                dump_all(&sheet, &palette(), per_row, true, Transparency::Opaque),
                Err(Error::ImageTooLarge { .. })
            ));
        }
    }

    #[test]
    fn test_dump_all_empty() {
        let sheet = TileSheet::new(&[], SpriteRegion { base_offset: 0, len: 0 });
        let per_row = NonZeroUsize::new(10).unwrap();

        let frame = dump_all(&sheet, &palette(), per_row, true, Transparency::Opaque).unwrap();
        assert!(frame.is_empty());
    }
}
