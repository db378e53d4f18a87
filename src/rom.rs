use std::fmt;

use log::{debug, warn};

use crate::error::Error;

const INES_TAG: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];
pub const HEADER_SIZE: usize = 16;
pub const TRAINER_SIZE: usize = 512;
pub const PRG_PAGE_SIZE: usize = 16384;
pub const CHR_PAGE_SIZE: usize = 8192;

/// Number of bytes making up one 8x8 tile.
pub const TILE_SIZE: usize = 16;

/// The 16 byte iNES header at the start of a cartridge image.
///
/// Only the bank counts and the trainer bit affect where the tiles are. The
/// remaining bytes are kept for the `info` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    prg_banks: u8,

    /// Zero when the board uses CHR RAM, leaving no tiles in the file.
    chr_banks: u8,

    /// Bit 2 marks a 512 byte trainer ahead of PRG. The high nybble is the
    /// low half of the mapper number.
    flags_6: u8,

    /// High half of the mapper number; bits 2-3 equal to 2 mark NES 2.0.
    flags_7: u8,

    flags_8: u8,
    flags_9: u8,
    flags_10: u8,

    /// Bytes 11-15. Some dumps put a ripper's name here.
    padding: [u8; 5],
}

impl Header {
    /// Parses a header from the start of a ROM image. Returns None when the
    /// image does not start with the iNES tag.
    pub fn from_bytes(bytes: &[u8]) -> Option<Header> {
        if bytes.len() < HEADER_SIZE || bytes[0..4] != INES_TAG {
            return None;
        }

        let mut padding = [0; 5];
        padding.copy_from_slice(&bytes[11..16]);

        Some(Header {
            prg_banks: bytes[4],
            chr_banks: bytes[5],
            flags_6: bytes[6],
            flags_7: bytes[7],
            flags_8: bytes[8],
            flags_9: bytes[9],
            flags_10: bytes[10],
            padding,
        })
    }

    /// Returns the mapper number.
    pub fn mapper(&self) -> u8 {
        (self.flags_7 & 0xF0) | (self.flags_6 >> 4)
    }

    /// Returns the number of 16 KB PRG banks.
    pub fn prg_banks(&self) -> usize {
        self.prg_banks as usize
    }

    /// Returns the number of 8 KB CHR banks.
    pub fn chr_banks(&self) -> usize {
        self.chr_banks as usize
    }

    /// Returns the size of the PRG ROM in bytes.
    pub fn prg_len(&self) -> usize {
        self.prg_banks() * PRG_PAGE_SIZE
    }

    /// Returns the size of the CHR ROM in bytes.
    pub fn chr_len(&self) -> usize {
        self.chr_banks() * CHR_PAGE_SIZE
    }

    /// Returns true if the ROM contains a trainer.
    pub fn has_trainer(&self) -> bool {
        self.flags_6 & 0x4 != 0
    }

    /// Returns true if the header uses the NES 2.0 extensions.
    pub fn is_nes2(&self) -> bool {
        (self.flags_7 >> 2) & 0x3 == 2
    }

    /// Offset of the first PRG byte in the file.
    pub fn prg_start(&self) -> usize {
        HEADER_SIZE + if self.has_trainer() { TRAINER_SIZE } else { 0 }
    }

    /// Offset of the first CHR byte in the file.
    pub fn chr_start(&self) -> usize {
        self.prg_start() + self.prg_len()
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let padding: String = self.padding.iter().map(|b| format!("{:02x}", b)).collect();

        writeln!(f, "+{:-^30}+", "")?;
        writeln!(f, "|{: ^30}|", "Header Section")?;
        writeln!(f, "+{:-^30}+", "")?;
        writeln!(f, "| 0x0 Constant : {: <14}|", "4e45531a")?;
        writeln!(f, "| 0x4 PRG Banks: {: <14}|", self.prg_banks)?;
        writeln!(f, "| 0x5 CHR Banks: {: <14}|", self.chr_banks)?;
        writeln!(f, "| 0x6 Flags 6  : {: <14}|", self.flags_6)?;
        writeln!(f, "| 0x7 Flags 7  : {: <14}|", self.flags_7)?;
        writeln!(f, "| 0x8 PRG RAM  : {: <14}|", self.flags_8)?;
        writeln!(f, "| 0x9 Flags 9  : {: <14}|", self.flags_9)?;
        writeln!(f, "| 0xa Flags 10 : {: <14}|", self.flags_10)?;
        writeln!(f, "| 0xb Zero Fill: {: <14}|", padding)?;
        writeln!(f, "+{:-^30}+", "")?;
        writeln!(f)?;

        writeln!(f, "+{:-^59}+", "")?;
        writeln!(
            f,
            "| {: <10}| {: <10}| {: <10}| {: <10}| {: <10}|",
            "Section", "Banks", "Length", "Start", "End"
        )?;
        writeln!(f, "+{:-^59}+", "")?;
        write_section(f, "PRG ROM", self.prg_banks(), self.prg_start(), self.prg_len())?;
        write_section(f, "CHR ROM", self.chr_banks(), self.chr_start(), self.chr_len())?;
        write!(f, "+{:-^59}+", "")
    }
}

fn write_section(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    banks: usize,
    start: usize,
    len: usize,
) -> fmt::Result {
    writeln!(
        f,
        "| {: <10}| {: <10}| 0x{: <8x}| 0x{: <8x}| 0x{: <8x}|",
        name,
        banks,
        len,
        start,
        start + len
    )
}

/// The slice of a ROM image holding tile data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteRegion {
    /// Offset of tile 0 in the file.
    pub base_offset: usize,

    /// Length of the region in bytes.
    pub len: usize,
}

impl SpriteRegion {
    /// Number of whole tiles in the region.
    pub fn tile_count(&self) -> usize {
        self.len / TILE_SIZE
    }
}

/// An immutable NES ROM image.
///
/// See: https://www.nesdev.org/wiki/INES
pub struct Rom {
    /// The ROM header, if the image is in iNES format.
    pub header: Option<Header>,

    /// The raw file contents.
    raw: Vec<u8>,
}

impl Rom {
    pub fn new(raw: Vec<u8>) -> Rom {
        let header = Header::from_bytes(&raw);
        match &header {
            Some(h) => debug!(
                "loaded iNES rom: {} bytes, {} PRG banks, {} CHR banks, mapper {}",
                raw.len(),
                h.prg_banks(),
                h.chr_banks(),
                h.mapper()
            ),
            None => warn!("rom has no iNES header ({} bytes)", raw.len()),
        }

        Rom { header, raw }
    }

    /// Reads a ROM image from disk.
    pub fn open(path: &std::path::Path) -> Result<Rom, Error> {
        let raw = std::fs::read(path)?;
        Ok(Rom::new(raw))
    }

    /// Returns the whole file contents.
    pub fn bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Works out where the tiles live. An explicit base offset wins over the
    /// header; without either the region can't be located.
    ///
    /// The region never extends past the end of the file.
    pub fn sprite_region(&self, base_offset: Option<usize>) -> Result<SpriteRegion, Error> {
        let base_offset = match (base_offset, &self.header) {
            (Some(offset), _) => offset,
            (None, Some(h)) => h.chr_start(),
            (None, None) => return Err(Error::MissingBaseOffset),
        };

        let available = self.raw.len().saturating_sub(base_offset);
        let len = match &self.header {
            Some(h) if h.chr_len() > 0 && base_offset == h.chr_start() => {
                h.chr_len().min(available)
            }
            _ => available,
        };

        debug!("sprite region at 0x{:x}, 0x{:x} bytes", base_offset, len);
        Ok(SpriteRegion { base_offset, len })
    }
}

/// Returns the 16 bytes making up the given tile.
///
/// The tile lives at `base_offset + sprite_index * 16`; a read past the end of
/// the ROM fails rather than wrapping or clamping.
pub fn read_tile_bytes(
    rom: &[u8],
    base_offset: usize,
    sprite_index: usize,
) -> Result<[u8; TILE_SIZE], Error> {
    let out_of_range = || Error::OutOfRange {
        offset: base_offset.saturating_add(sprite_index.saturating_mul(TILE_SIZE)),
        len: TILE_SIZE,
        rom_len: rom.len(),
    };

    let offset = sprite_index
        .checked_mul(TILE_SIZE)
        .and_then(|o| o.checked_add(base_offset))
        .ok_or_else(out_of_range)?;
    let end = offset.checked_add(TILE_SIZE).ok_or_else(out_of_range)?;
    if end > rom.len() {
        return Err(out_of_range());
    }

    let mut tile = [0; TILE_SIZE];
    tile.copy_from_slice(&rom[offset..end]);
    Ok(tile)
}
