//! Font rasterization onto the [`PixelBuffer`].
//!
//! Metrics follow the FreeType convention: the ascender and horizontal advance
//! are 26.6 fixed point, bearings are whole pixels with `top` measured upwards
//! from the baseline.

use core::fmt;

use crate::pixels::{PixelBuffer, WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontError {
    /// The font resource or face could not be initialized.
    LoadFailed,
    /// No face is available at the requested pixel height.
    UnsupportedHeight { height: u8 },
    /// A codepoint could not be rasterized.
    GlyphLoadFailed { codepoint: char },
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontError::LoadFailed => write!(f, "couldn't load font"),
            FontError::UnsupportedHeight { height } => {
                write!(f, "couldn't set font size to {}px", height)
            }
            FontError::GlyphLoadFailed { codepoint } => {
                write!(f, "couldn't load glyph {:?}", codepoint)
            }
        }
    }
}

impl core::error::Error for FontError {}

/// A monochrome glyph raster, borrowed from its provider until the next
/// rasterization.
#[derive(Debug, Clone, Copy)]
pub struct Glyph<'a> {
    pub width: u32,
    pub rows: u32,
    /// Bytes per raster row.
    pub pitch: usize,
    /// 1-bpp rows, MSB-first.
    pub buffer: &'a [u8],
    pub left: i32,
    pub top: i32,
    /// Horizontal advance, 26.6 fixed point.
    pub advance: i32,
}

impl Glyph<'_> {
    pub fn bit(&self, x: u32, row: u32) -> bool {
        let i = row as usize * self.pitch + x as usize / 8;
        self.buffer
            .get(i)
            .map(|b| b & (0x80 >> (x % 8)) != 0)
            .unwrap_or(false)
    }

    /// Advance in whole pixels, rounded up.
    pub fn advance_px(&self) -> i32 {
        self.advance.saturating_add(63).div_euclid(64)
    }
}

/// A loaded font face producing 1-bpp glyphs at a configurable pixel height.
pub trait FontProvider {
    fn set_pixel_height(&mut self, height: u8) -> Result<(), FontError>;

    fn rasterize(&mut self, c: char) -> Result<Glyph<'_>, FontError>;

    /// Ascender of the face at the current height, 26.6 fixed point.
    fn ascender(&self) -> i32;
}

/// Paints the set bits of `c`'s glyph with the top of the text line at `y`.
/// Returns the glyph's advance in pixels.
pub fn put_char<F: FontProvider>(
    canvas: &mut PixelBuffer,
    font: &mut F,
    x: i32,
    y: i32,
    c: char,
) -> Result<i32, FontError> {
    let baseline = font.ascender().div_euclid(64).saturating_add(y);
    let glyph = font.rasterize(c)?;
    let top = baseline.saturating_sub(glyph.top);
    let left = x.saturating_add(glyph.left);

    for r in 0..glyph.rows {
        let py = top.saturating_add(r as i32);
        for xa in 0..glyph.width {
            if glyph.bit(xa, r) {
                canvas.set_pixel(left.saturating_add(xa as i32), py, true);
            }
        }
    }

    Ok(glyph.advance_px())
}

/// Paints `text` on one line starting at `(x, y)`. Characters are dropped once
/// the pen reaches the right edge; nothing wraps. A glyph failure aborts the
/// rest of the string.
pub fn put_string<F: FontProvider>(
    canvas: &mut PixelBuffer,
    font: &mut F,
    x: i32,
    y: i32,
    text: &str,
) -> Result<(), FontError> {
    let mut pen = x;

    for c in text.chars() {
        pen = pen.saturating_add(put_char(canvas, font, pen, y, c)?);
        if pen >= WIDTH as i32 {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{put_char, put_string, FontError, FontProvider, Glyph};
    use crate::pixels::{PixelBuffer, HEIGHT, WIDTH};

    /// Block glyphs: every codepoint is a filled `size`x`size` square with a
    /// one pixel left bearing, sitting on the baseline.
    pub(crate) struct BlockFont {
        pub size: u8,
        pub advance_px: i32,
        pub ascender_px: i32,
        pub missing: Option<char>,
        pub rasterized: usize,
        buffer: [u8; 64],
    }

    impl BlockFont {
        pub(crate) fn new(size: u8) -> Self {
            Self {
                size,
                advance_px: size as i32 + 2,
                ascender_px: size as i32 + 1,
                missing: None,
                rasterized: 0,
                buffer: [0; 64],
            }
        }
    }

    impl FontProvider for BlockFont {
        fn set_pixel_height(&mut self, height: u8) -> Result<(), FontError> {
            if height == 0 || height > 16 {
                return Err(FontError::UnsupportedHeight { height });
            }
            self.size = height;
            Ok(())
        }

        fn rasterize(&mut self, c: char) -> Result<Glyph<'_>, FontError> {
            if Some(c) == self.missing {
                return Err(FontError::GlyphLoadFailed { codepoint: c });
            }
            self.rasterized += 1;

            let pitch = (self.size as usize + 7) / 8;
            let rows = self.size as usize;
            self.buffer.iter_mut().for_each(|b| *b = 0);
            for r in 0..rows {
                for x in 0..self.size as usize {
                    self.buffer[r * pitch + x / 8] |= 0x80 >> (x % 8);
                }
            }

            Ok(Glyph {
                width: self.size as u32,
                rows: rows as u32,
                pitch,
                buffer: &self.buffer[..rows * pitch],
                left: 1,
                top: self.size as i32,
                advance: self.advance_px * 64,
            })
        }

        fn ascender(&self) -> i32 {
            self.ascender_px * 64
        }
    }

    fn painted(buf: &PixelBuffer) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..HEIGHT as i32)
            .flat_map(|y| (0..WIDTH as i32).map(move |x| (x, y)))
            .filter(move |&(x, y)| buf.pixel(x, y))
    }

    #[test]
    fn glyph_sits_on_ascender_baseline() {
        let mut buf = PixelBuffer::new();
        let mut font = BlockFont::new(4);

        let adv = put_char(&mut buf, &mut font, 10, 20, 'x').unwrap();
        assert_eq!(adv, 6);

        // baseline = 5 + 20, top = 25 - 4 = 21, x offset = 1
        let px: std::vec::Vec<_> = painted(&buf).collect();
        assert_eq!(px.len(), 16);
        assert!(px.iter().all(|&(x, y)| (11..15).contains(&x) && (21..25).contains(&y)));
    }

    #[test]
    fn zero_bits_leave_background() {
        let mut buf = PixelBuffer::new();
        let mut font = BlockFont::new(3);
        buf.set_pixel(0, 0, true);
        buf.set_pixel(50, 50, true);

        put_char(&mut buf, &mut font, 0, 0, 'a').unwrap();
        assert!(buf.pixel(0, 0));
        assert!(buf.pixel(50, 50));
    }

    #[test]
    fn string_advances_pen() {
        let mut buf = PixelBuffer::new();
        let mut font = BlockFont::new(2);

        put_string(&mut buf, &mut font, 0, 0, "abc").unwrap();

        // advance 4, left bearing 1: columns 1-2, 5-6, 9-10
        let cols: std::vec::Vec<_> = painted(&buf)
            .filter(|&(_, y)| y == 1)
            .map(|(x, _)| x)
            .collect();
        assert_eq!(cols, [1, 2, 5, 6, 9, 10]);
    }

    #[test]
    fn advance_rounds_up() {
        let g = Glyph {
            width: 0,
            rows: 0,
            pitch: 0,
            buffer: &[],
            left: 0,
            top: 0,
            advance: 5 * 64 + 1,
        };
        assert_eq!(g.advance_px(), 6);
    }

    #[test]
    fn string_stops_at_right_edge() {
        let mut buf = PixelBuffer::new();
        let mut font = BlockFont::new(4);

        put_string(&mut buf, &mut font, 126, 0, "AB").unwrap();

        assert_eq!(font.rasterized, 1);
        assert!(painted(&buf).all(|(x, _)| x < WIDTH as i32));
        assert!(buf.pixel(127, 1));
    }

    #[test]
    fn far_off_canvas_text_is_dropped() {
        let mut buf = PixelBuffer::new();
        let mut font = BlockFont::new(4);

        put_char(&mut buf, &mut font, i32::MAX, i32::MAX, 'a').unwrap();
        put_char(&mut buf, &mut font, i32::MIN, i32::MIN, 'a').unwrap();
        put_string(&mut buf, &mut font, i32::MAX - 2, 0, "ab").unwrap();
        put_string(&mut buf, &mut font, 0, i32::MAX, "ab").unwrap();
        put_string(&mut buf, &mut font, i32::MIN, i32::MIN, "abc").unwrap();

        assert_eq!(painted(&buf).count(), 0);
        // The pen saturates past the edge after the first glyph.
        assert_eq!(font.rasterized, 1 + 1 + 1 + 2 + 3);
    }

    #[test]
    fn advance_saturates() {
        let g = Glyph {
            width: 0,
            rows: 0,
            pitch: 0,
            buffer: &[],
            left: 0,
            top: 0,
            advance: i32::MAX,
        };
        assert_eq!(g.advance_px(), i32::MAX / 64);
    }

    #[test]
    fn glyph_failure_aborts_string() {
        let mut buf = PixelBuffer::new();
        let mut font = BlockFont::new(2);
        font.missing = Some('?');

        let res = put_string(&mut buf, &mut font, 0, 0, "a?b");
        assert_eq!(res, Err(FontError::GlyphLoadFailed { codepoint: '?' }));
        assert_eq!(font.rasterized, 1);
        assert!(!buf.pixel(9, 1));
    }
}
