use crate::error::Error;

/// An RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb(0x00, 0x00, 0x00);
    pub const GREEN: Rgb = Rgb(0x00, 0xFF, 0x00);
}

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Rgb(c[0], c[1], c[2])
    }
}

/// The 64 colours the 2C02 PPU can output, indexed by palette RAM value.
#[rustfmt::skip]
pub static SYSTEM_PALETTE: [Rgb; 64] = [
   Rgb(0x80, 0x80, 0x80), Rgb(0x00, 0x3D, 0xA6), Rgb(0x00, 0x12, 0xB0), Rgb(0x44, 0x00, 0x96), Rgb(0xA1, 0x00, 0x5E),
   Rgb(0xC7, 0x00, 0x28), Rgb(0xBA, 0x06, 0x00), Rgb(0x8C, 0x17, 0x00), Rgb(0x5C, 0x2F, 0x00), Rgb(0x10, 0x45, 0x00),
   Rgb(0x05, 0x4A, 0x00), Rgb(0x00, 0x47, 0x2E), Rgb(0x00, 0x41, 0x66), Rgb(0x00, 0x00, 0x00), Rgb(0x05, 0x05, 0x05),
   Rgb(0x05, 0x05, 0x05), Rgb(0xC7, 0xC7, 0xC7), Rgb(0x00, 0x77, 0xFF), Rgb(0x21, 0x55, 0xFF), Rgb(0x82, 0x37, 0xFA),
   Rgb(0xEB, 0x2F, 0xB5), Rgb(0xFF, 0x29, 0x50), Rgb(0xFF, 0x22, 0x00), Rgb(0xD6, 0x32, 0x00), Rgb(0xC4, 0x62, 0x00),
   Rgb(0x35, 0x80, 0x00), Rgb(0x05, 0x8F, 0x00), Rgb(0x00, 0x8A, 0x55), Rgb(0x00, 0x99, 0xCC), Rgb(0x21, 0x21, 0x21),
   Rgb(0x09, 0x09, 0x09), Rgb(0x09, 0x09, 0x09), Rgb(0xFF, 0xFF, 0xFF), Rgb(0x0F, 0xD7, 0xFF), Rgb(0x69, 0xA2, 0xFF),
   Rgb(0xD4, 0x80, 0xFF), Rgb(0xFF, 0x45, 0xF3), Rgb(0xFF, 0x61, 0x8B), Rgb(0xFF, 0x88, 0x33), Rgb(0xFF, 0x9C, 0x12),
   Rgb(0xFA, 0xBC, 0x20), Rgb(0x9F, 0xE3, 0x0E), Rgb(0x2B, 0xF0, 0x35), Rgb(0x0C, 0xF0, 0xA4), Rgb(0x05, 0xFB, 0xFF),
   Rgb(0x5E, 0x5E, 0x5E), Rgb(0x0D, 0x0D, 0x0D), Rgb(0x0D, 0x0D, 0x0D), Rgb(0xFF, 0xFF, 0xFF), Rgb(0xA6, 0xFC, 0xFF),
   Rgb(0xB3, 0xEC, 0xFF), Rgb(0xDA, 0xAB, 0xEB), Rgb(0xFF, 0xA8, 0xF9), Rgb(0xFF, 0xAB, 0xB3), Rgb(0xFF, 0xD2, 0xB0),
   Rgb(0xFF, 0xEF, 0xA6), Rgb(0xFF, 0xF7, 0x9C), Rgb(0xD7, 0xE8, 0x95), Rgb(0xA6, 0xED, 0xAF), Rgb(0xA2, 0xF2, 0xDA),
   Rgb(0x99, 0xFF, 0xFC), Rgb(0xDD, 0xDD, 0xDD), Rgb(0x11, 0x11, 0x11), Rgb(0x11, 0x11, 0x11),
];

/// A 4-colour lookup table for a tile's 2-bit pixel values.
///
/// Index 0 is the backdrop colour for sprites. Whether it gets drawn is up to
/// the renderer, see `render::Transparency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    colours: [Rgb; 4],
}

impl Palette {
    /// Returns a palette made from exactly 4 colours.
    pub fn new(colours: &[Rgb]) -> Result<Self, Error> {
        let colours: [Rgb; 4] = colours
            .try_into()
            .map_err(|_| Error::InvalidPalette { len: colours.len() })?;
        Ok(Palette { colours })
    }

    /// Returns the fallback greyscale palette used when none is given.
    pub fn grey() -> Self {
        Palette {
            colours: [
                Rgb::WHITE,
                Rgb(0x75, 0x75, 0x75),
                Rgb(0xBC, 0xBC, 0xBC),
                Rgb::BLACK,
            ],
        }
    }

    /// Builds a palette from the four system palette indices stored at
    /// `address` in the ROM.
    ///
    /// Byte k of the ROM palette is the colour of pixel value k.
    pub fn from_rom(rom: &[u8], address: usize) -> Result<Self, Error> {
        let bytes = address
            .checked_add(4)
            .and_then(|end| rom.get(address..end))
            .ok_or(Error::OutOfRange {
                offset: address,
                len: 4,
                rom_len: rom.len(),
            })?;

        let mut colours = [Rgb::BLACK; 4];
        for (colour, idx) in colours.iter_mut().zip(bytes) {
            // Palette RAM only holds 6 bits.
            *colour = SYSTEM_PALETTE[(idx & 0x3F) as usize];
        }

        Ok(Palette { colours })
    }

    /// Returns the colour for a 2-bit pixel value.
    pub fn colour(&self, value: u8) -> Rgb {
        self.colours[(value & 0b11) as usize]
    }

    pub fn colours(&self) -> &[Rgb; 4] {
        &self.colours
    }
}
