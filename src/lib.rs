pub mod bmp;
pub mod error;
pub mod palette;
pub mod profile;
pub mod render;
pub mod rom;
pub mod tile;

pub use error::Error;
