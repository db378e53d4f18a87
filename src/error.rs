use std::fmt;
use std::io;

/// Errors raised while reading, decoding or rendering sprites.
#[derive(Debug)]
pub enum Error {
    /// A tile was not exactly 16 bytes long.
    InvalidTileData { len: usize },

    /// A palette did not contain exactly 4 colours.
    InvalidPalette { len: usize },

    /// A read of `len` bytes at `offset` would run past the end of the ROM.
    OutOfRange {
        offset: usize,
        len: usize,
        rom_len: usize,
    },

    /// Reading or writing a file failed.
    Io(io::Error),

    /// The image encoder rejected the pixel buffer.
    Encode(String),

    /// Attempted to write an image with no pixels.
    EmptyImage,

    /// A rendered image would be too large to allocate or encode. Sizes that
    /// overflow are reported as `usize::MAX`.
    ImageTooLarge { width: usize, height: usize },

    /// A cartridge profile could not be parsed.
    Profile(String),

    /// A palette, sprite or block name is not defined by the profile.
    UnknownName { kind: &'static str, name: String },

    /// The ROM has no iNES header and no base offset was supplied.
    MissingBaseOffset,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidTileData { len } => {
                write!(f, "invalid tile data: expected 16 bytes, got {}", len)
            }
            Error::InvalidPalette { len } => {
                write!(f, "invalid palette: expected 4 colours, got {}", len)
            }
            Error::OutOfRange {
                offset,
                len,
                rom_len,
            } => write!(
                f,
                "read of {} bytes at 0x{:x} is out of range (rom is 0x{:x} bytes)",
                len, offset, rom_len
            ),
            Error::Io(e) => write!(f, "i/o error: {}", e),
            Error::Encode(msg) => write!(f, "image encoding failed: {}", msg),
            Error::EmptyImage => write!(f, "image has no pixels"),
            Error::ImageTooLarge { width, height } => {
                write!(f, "image of {}x{} pixels is too large", width, height)
            }
            Error::Profile(msg) => write!(f, "invalid cartridge profile: {}", msg),
            Error::UnknownName { kind, name } => write!(f, "unknown {} '{}'", kind, name),
            Error::MissingBaseOffset => write!(
                f,
                "ROM has no iNES header; a sprite base offset must be supplied"
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::IoError(e) => Error::Io(e),
            other => Error::Encode(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Profile(e.to_string())
    }
}
