use super::frame::Frame;
use crate::palette::Rgb;

pub const GLYPH_WIDTH: usize = 3;
pub const GLYPH_HEIGHT: usize = 5;

// 3x5 digits, one byte per row, bit 2 is the leftmost column.
#[rustfmt::skip]
const DIGITS: [[u8; GLYPH_HEIGHT]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111], // 0
    [0b010, 0b110, 0b010, 0b010, 0b111], // 1
    [0b111, 0b001, 0b111, 0b100, 0b111], // 2
    [0b111, 0b001, 0b111, 0b001, 0b111], // 3
    [0b101, 0b101, 0b111, 0b001, 0b001], // 4
    [0b111, 0b100, 0b111, 0b001, 0b111], // 5
    [0b111, 0b100, 0b111, 0b101, 0b111], // 6
    [0b111, 0b001, 0b010, 0b010, 0b010], // 7
    [0b111, 0b101, 0b111, 0b101, 0b111], // 8
    [0b111, 0b101, 0b111, 0b001, 0b111], // 9
];

/// Stamps the decimal digits of `number` with the top-left corner at (x, y),
/// leaving one blank column between digits. Returns the width drawn.
pub fn stamp_number(frame: &mut Frame, x: usize, y: usize, number: usize, rgb: Rgb) -> usize {
    let text = number.to_string();
    let mut cursor = x;

    for digit in text.bytes().map(|b| (b - b'0') as usize) {
        for (row, &bits) in DIGITS[digit].iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits >> (GLYPH_WIDTH - 1 - col) & 1 == 1 {
                    frame.set_pixel(cursor + col, y + row, rgb);
                }
            }
        }
        cursor += GLYPH_WIDTH + 1;
    }

    cursor - x - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_single_digit() {
        let mut frame = Frame::new(4, 6).unwrap();
        let width = stamp_number(&mut frame, 0, 0, 1, Rgb::GREEN);

        assert_eq!(width, 3);
        // Top row of "1" is .#.
        assert_eq!(frame.pixel(0, 0), Some(Frame::BACKGROUND));
        assert_eq!(frame.pixel(1, 0), Some(Rgb::GREEN));
        assert_eq!(frame.pixel(2, 0), Some(Frame::BACKGROUND));
        // Bottom row is ###.
        for x in 0..3 {
            assert_eq!(frame.pixel(x, 4), Some(Rgb::GREEN));
        }
        assert_eq!(frame.pixel(1, 5), Some(Frame::BACKGROUND));
    }

    #[test]
    fn test_stamp_multiple_digits() {
        let mut frame = Frame::new(16, 8).unwrap();
        let width = stamp_number(&mut frame, 1, 1, 40, Rgb::GREEN);

        assert_eq!(width, 7);
        // The "4" starts with #.# and the "0" with ###.
        assert_eq!(frame.pixel(1, 1), Some(Rgb::GREEN));
        assert_eq!(frame.pixel(2, 1), Some(Frame::BACKGROUND));
        assert_eq!(frame.pixel(4, 1), Some(Frame::BACKGROUND));
        assert_eq!(frame.pixel(5, 1), Some(Rgb::GREEN));
        assert_eq!(frame.pixel(6, 1), Some(Rgb::GREEN));
    }

    #[test]
    fn test_stamp_clips_at_edge() {
        let mut frame = Frame::new(2, 2).unwrap();
        stamp_number(&mut frame, 0, 0, 8888, Rgb::GREEN);
        assert_eq!(frame.pixel(0, 0), Some(Rgb::GREEN));
    }
}
