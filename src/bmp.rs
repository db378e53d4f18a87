use std::path::Path;

use image::{ColorType, ImageFormat};
use log::info;

use crate::error::Error;
use crate::render::frame::Frame;

/// Writes the frame to `path` as an uncompressed 24-bit bitmap.
pub fn write_bmp(frame: &Frame, path: &Path) -> Result<(), Error> {
    if frame.is_empty() {
        return Err(Error::EmptyImage);
    }

    let width = u32::try_from(frame.width).map_err(|e| Error::Encode(e.to_string()))?;
    let height = u32::try_from(frame.height).map_err(|e| Error::Encode(e.to_string()))?;

    image::save_buffer_with_format(
        path,
        frame.pixels(),
        width,
        height,
        ColorType::Rgb8,
        ImageFormat::Bmp,
    )?;

    info!("wrote {}x{} bitmap to {}", width, height, path.display());
    Ok(())
}

/// Reads a bitmap back into a frame.
pub fn read_bmp(path: &Path) -> Result<Frame, Error> {
    let img = image::open(path)?.to_rgb8();
    let (width, height) = img.dimensions();

    Ok(Frame {
        width: width as usize,
        height: height as usize,
        data: img.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Rgb;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("nes-sprite-reader-{}-{}.bmp", std::process::id(), name))
    }

    #[test]
    fn test_round_trip() {
        let mut frame = Frame::new(13, 5).unwrap();
        for y in 0..5 {
            for x in 0..13 {
                frame.set_pixel(x, y, Rgb((x * 19) as u8, (y * 51) as u8, (x * y) as u8));
            }
        }

        let path = temp_path("round-trip");
        write_bmp(&frame, &path).unwrap();
        let read = read_bmp(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(read, frame);
    }

    #[test]
    fn test_empty_frame() {
        let path = temp_path("empty");
        assert!(matches!(
            write_bmp(&Frame::new(0, 8).unwrap(), &path),
            Err(Error::EmptyImage)
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_path() {
        let path = std::env::temp_dir()
            .join("nes-sprite-reader-missing-dir")
            .join("nested")
            .join("out.bmp");

        assert!(matches!(
            write_bmp(&Frame::new(8, 8).unwrap(), &path),
            Err(Error::Io(_))
        ));
    }
}
