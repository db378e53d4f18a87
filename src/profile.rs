use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use lazy_static::lazy_static;
use log::debug;
use serde::Deserialize;

use crate::error::Error;
use crate::palette::{Palette, Rgb};
use crate::render::{BlockEntry, Transparency};

/// Where a named palette comes from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PaletteSource {
    /// File offset of four system palette indices.
    Address(usize),

    /// Colours given directly.
    Colours(Vec<[u8; 3]>),
}

/// A sprite in a block, referring to profile entries by name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlockRef {
    pub sprite: String,
    pub palette: String,
}

/// Cartridge specific layout data: where the tiles are, which palettes exist
/// and which tiles make up which sprites.
///
/// Profiles are plain data, loaded from JSON:
///
/// ```json
/// {
///   "name": "my-game",
///   "base_offset": 32784,
///   "palettes": { "hero": 4660, "grey": [[255,255,255],[117,117,117],[188,188,188],[0,0,0]] },
///   "sprites": { "hero": [[0, 2], [1, 3]] },
///   "blocks": { "scene": [[{ "sprite": "hero", "palette": "hero" }]] }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CartridgeProfile {
    pub name: String,

    /// Offset of tile 0 in the file. Taken from the iNES header when absent.
    #[serde(default)]
    pub base_offset: Option<usize>,

    #[serde(default)]
    pub transparency: Option<Transparency>,

    #[serde(default)]
    pub palettes: BTreeMap<String, PaletteSource>,

    /// Rows of tile indices.
    #[serde(default)]
    pub sprites: BTreeMap<String, Vec<Vec<usize>>>,

    #[serde(default)]
    pub blocks: BTreeMap<String, Vec<Vec<BlockRef>>>,
}

impl CartridgeProfile {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a profile from a JSON file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let profile = Self::from_json(&std::fs::read_to_string(path)?)?;
        debug!(
            "loaded profile '{}': {} palettes, {} sprites, {} blocks",
            profile.name,
            profile.palettes.len(),
            profile.sprites.len(),
            profile.blocks.len()
        );
        Ok(profile)
    }

    /// Returns one of the profiles compiled into the binary.
    pub fn builtin(name: &str) -> Option<&'static CartridgeProfile> {
        BUILTIN.get(name)
    }

    /// Names of the profiles compiled into the binary.
    pub fn builtin_names() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = BUILTIN.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Resolves a named palette against the ROM.
    pub fn palette(&self, rom: &[u8], name: &str) -> Result<Palette, Error> {
        match self.palettes.get(name) {
            Some(PaletteSource::Address(address)) => Palette::from_rom(rom, *address),
            Some(PaletteSource::Colours(colours)) => {
                let colours: Vec<Rgb> = colours.iter().copied().map(Rgb::from).collect();
                Palette::new(&colours)
            }
            None => Err(unknown("palette", name)),
        }
    }

    /// Returns the rows of tile indices making up a named sprite.
    pub fn sprite(&self, name: &str) -> Result<&[Vec<usize>], Error> {
        self.sprites
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| unknown("sprite", name))
    }

    /// Resolves every sprite and palette in a named block.
    pub fn block(&self, rom: &[u8], name: &str) -> Result<Vec<Vec<BlockEntry<'_>>>, Error> {
        let block = self.blocks.get(name).ok_or_else(|| unknown("block", name))?;

        let mut rows = Vec::with_capacity(block.len());
        for refs in block {
            let mut row = Vec::with_capacity(refs.len());
            for r in refs {
                row.push(BlockEntry {
                    sprite: self.sprite(&r.sprite)?,
                    palette: self.palette(rom, &r.palette)?,
                });
            }
            rows.push(row);
        }

        Ok(rows)
    }
}

fn unknown(kind: &'static str, name: &str) -> Error {
    Error::UnknownName {
        kind,
        name: name.to_string(),
    }
}

fn rows(rows: &[&[usize]]) -> Vec<Vec<usize>> {
    rows.iter().map(|r| r.to_vec()).collect()
}

fn block_row(entries: &[(&str, &str)]) -> Vec<BlockRef> {
    entries
        .iter()
        .map(|(sprite, palette)| BlockRef {
            sprite: sprite.to_string(),
            palette: palette.to_string(),
        })
        .collect()
}

/// Super Mario Bros. 3, for the ROM with MD5 sum bb5c4b6d4d78c101f94bdb360af502f3.
///
/// Palette addresses come from the datacrystal ROM map
/// (datacrystal.romhacking.net/wiki/Super_Mario_Bros._3:ROM_map). Sprite
/// tables are the hand-made SMB3 layouts from NES Sprite Reader's
/// `roms/smb3/smb3_sprites.py`, indexed from the start of CHR. That map gives
/// no separate tiles for standing with the tail down, so only one standing
/// pose is listed.
fn smb3() -> CartridgeProfile {
    let palettes = [
        ("regular_mario_palette", 0x10539),
        ("regular_luigi_palette", 0x1053d),
        ("fire_mario_palette", 0x10541),
        ("frog_mario_palette", 0x10549),
        ("tanooki_mario_palette", 0x1054d),
        ("hammer_mario_palette", 0x10551),
        ("lava_palette", 0x36daa),
        ("bowser_palette", 0x36dfe),
    ];

    let sprites = vec![
        // Pads sprites that end on a tile boundary.
        ("border", rows(&[&[30], &[30], &[30], &[30]])),
        ("small_mario_left", rows(&[&[60, 62], &[61, 63]])),
        (
            "regular_left_run_2",
            rows(&[&[5376, 5378], &[5377, 5379], &[5380, 5382], &[5381, 5383]]),
        ),
        ("raccoon_left_crouch", rows(&[&[52], &[53, 54, 55, 56]])),
        (
            "raccoon_left_run_2",
            rows(&[&[0, 2, 30, 30], &[1, 3, 30, 30], &[4, 6, 8, 30], &[5, 7, 9, 30]]),
        ),
        (
            "raccoon_left_walk",
            rows(&[&[10, 12, 30], &[11, 13, 30], &[14, 30, 28], &[15, 30, 43]]),
        ),
        (
            "raccoon_left_stand",
            rows(&[&[44, 46, 30], &[45, 47, 30], &[24, 26, 28], &[25, 27, 29]]),
        ),
        ("raccoon_straight_ahead", rows(&[&[37], &[38], &[39]])),
        (
            "raccoon_right_stand_tail_up",
            rows(&[&[64, 66, 68, 30], &[65, 67, 69, 30]]),
        ),
        (
            "tanooki_left_run_2",
            rows(&[
                &[4096, 4098, 30, 30],
                &[4097, 4099, 30, 30],
                &[4100, 4102, 4104, 30],
                &[4101, 4103, 4105, 30],
            ]),
        ),
        (
            "hammer_left_run_2",
            rows(&[&[4352, 4354, 30], &[4353, 4355, 30], &[4356, 4358, 30], &[4357, 4359, 30]]),
        ),
        (
            "frog_left_full_hop",
            rows(&[&[5121, 5123, 30], &[5124, 5167, 30], &[5144, 5146, 5148], &[5145, 5147, 5149]]),
        ),
        (
            "frog_left_crouch",
            rows(&[&[5120, 5122, 30], &[5121, 5123, 30], &[5124, 5126, 5128], &[5125, 5127, 5129]]),
        ),
        ("ghost", rows(&[&[916, 918], &[917, 919]])),
        ("goomba", rows(&[&[8186, 8188], &[8187, 8189]])),
        ("music_box", rows(&[&[312, 314], &[313, 315]])),
    ];

    // Every form of Mario above a row of alternating goombas and small
    // Marios, the latter in palettes small Mario never uses in game.
    let showcase = vec![
        block_row(&[
            ("regular_left_run_2", "regular_mario_palette"),
            ("border", "regular_mario_palette"),
            ("regular_left_run_2", "fire_mario_palette"),
            ("border", "regular_mario_palette"),
            ("raccoon_left_run_2", "regular_mario_palette"),
            ("tanooki_left_run_2", "tanooki_mario_palette"),
            ("hammer_left_run_2", "hammer_mario_palette"),
            ("frog_left_full_hop", "frog_mario_palette"),
        ]),
        block_row(&[
            ("goomba", "tanooki_mario_palette"),
            ("small_mario_left", "regular_mario_palette"),
            ("goomba", "tanooki_mario_palette"),
            ("small_mario_left", "fire_mario_palette"),
            ("goomba", "tanooki_mario_palette"),
            ("small_mario_left", "tanooki_mario_palette"),
            ("goomba", "tanooki_mario_palette"),
            ("small_mario_left", "hammer_mario_palette"),
            ("goomba", "tanooki_mario_palette"),
            ("small_mario_left", "regular_luigi_palette"),
        ]),
    ];

    CartridgeProfile {
        name: "smb3".to_string(),
        base_offset: None,
        transparency: None,
        palettes: palettes
            .iter()
            .map(|(name, address)| (name.to_string(), PaletteSource::Address(*address)))
            .collect(),
        sprites: sprites
            .into_iter()
            .map(|(name, tiles)| (name.to_string(), tiles))
            .collect(),
        blocks: BTreeMap::from([("showcase".to_string(), showcase)]),
    }
}

lazy_static! {
    static ref BUILTIN: HashMap<&'static str, CartridgeProfile> = {
        let mut m = HashMap::new();
        m.insert("smb3", smb3());
        m
    };
}
