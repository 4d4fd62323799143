//! Monochrome canvas laid out the way the controller's GRAM expects it.
//!
//! The panel is two stacked 128x32 halves sharing one 32-row address space.
//! Each GRAM row holds 16 word-cells: columns 0-7 address the upper half,
//! columns 8-15 the lower half. Each word-cell covers 16 horizontal pixels,
//! bit 15 being the leftmost.

pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 64;

pub(crate) const GRAM_ROWS: usize = 32;
pub(crate) const GRAM_COLUMNS: usize = 16;
pub(crate) const WORD_BITS: usize = u16::BITS as usize;
/// Word-cells per logical row (one bank).
pub(crate) const BANK_COLUMNS: usize = WIDTH / WORD_BITS;

/// One word-cell in hardware GRAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayAddress {
    pub row: u8,
    pub column: u8,
}

impl DisplayAddress {
    /// Address of the word-cell holding logical row `y`, bank column `column`
    /// (`column` counts 16-pixel cells from the left edge).
    pub(crate) fn for_cell(y: usize, column: usize) -> Self {
        let bank = if y >= GRAM_ROWS { BANK_COLUMNS } else { 0 };
        Self {
            row: (y % GRAM_ROWS) as u8,
            column: (column + bank) as u8,
        }
    }
}

pub struct PixelBuffer {
    words: [[u16; GRAM_COLUMNS]; GRAM_ROWS],
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelBuffer {
    pub const fn new() -> Self {
        Self {
            words: [[0; GRAM_COLUMNS]; GRAM_ROWS],
        }
    }

    /// Maps a logical pixel to its word-cell and the bit index inside it
    /// (15 = leftmost). `None` outside the canvas.
    pub fn address_of(x: i32, y: i32) -> Option<(DisplayAddress, u8)> {
        if x < 0 || y < 0 || x as usize >= WIDTH || y as usize >= HEIGHT {
            return None;
        }

        let (x, y) = (x as usize, y as usize);
        let addr = DisplayAddress::for_cell(y, x / WORD_BITS);
        let bit = (WORD_BITS - 1 - x % WORD_BITS) as u8;

        Some((addr, bit))
    }

    /// Silently ignores coordinates outside the canvas.
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if let Some((addr, bit)) = Self::address_of(x, y) {
            let w = &mut self.words[addr.row as usize][addr.column as usize];
            if on {
                *w |= 1u16 << bit;
            } else {
                *w &= !(1u16 << bit);
            }
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> bool {
        Self::address_of(x, y)
            .map(|(addr, bit)| self.word(addr) & (1u16 << bit) != 0)
            .unwrap_or(false)
    }

    /// Sets every pixel of the inclusive rectangle `(x1, y1)..=(x2, y2)`.
    pub fn set_region(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, on: bool) {
        // Clip to the canvas; the dropped coordinates would be no-ops anyway.
        let (x1, x2) = (x1.max(0), x2.min(WIDTH as i32 - 1));
        let (y1, y2) = (y1.max(0), y2.min(HEIGHT as i32 - 1));

        for y in y1..=y2 {
            for x in x1..=x2 {
                self.set_pixel(x, y, on);
            }
        }
    }

    pub fn clear(&mut self) {
        self.fill(false);
    }

    pub fn fill(&mut self, on: bool) {
        let v = if on { 0xFFFF } else { 0x0000 };
        self.words.iter_mut().flatten().for_each(|w| *w = v);
    }

    pub fn word(&self, addr: DisplayAddress) -> u16 {
        self.words[addr.row as usize % GRAM_ROWS][addr.column as usize % GRAM_COLUMNS]
    }

    /// Big-endian bytes of the 8 word-cells making up logical row `y`, in
    /// the order the controller consumes them after one address set.
    pub(crate) fn row_bytes(&self, y: usize) -> [u8; BANK_COLUMNS * 2] {
        let start = DisplayAddress::for_cell(y, 0);
        let mut out = [0u8; BANK_COLUMNS * 2];

        for (i, pair) in out.chunks_exact_mut(2).enumerate() {
            let w = self.words[start.row as usize][start.column as usize + i];
            pair.copy_from_slice(&w.to_be_bytes());
        }

        out
    }

    /// Paints `len` bytes of MSB-first packed 1-bpp raster, `width` pixels per
    /// row, with its top-left corner at `(x, y)`. Unset bits are left alone.
    pub fn put_bitmap(&mut self, x: i32, y: i32, width: u8, data: &[u8], len: usize) {
        if width == 0 {
            return;
        }

        let (mut cx, mut cy) = (0i32, 0i32);

        for b in data.iter().take(len) {
            for i in 0..u8::BITS {
                if b & (0x80 >> i) != 0 {
                    self.set_pixel(x.saturating_add(cx), y.saturating_add(cy), true);
                }

                cx += 1;
                if cx >= width as i32 {
                    cx = 0;
                    cy += 1;
                }
            }
        }
    }
}

#[cfg(feature = "embedded_graphics")]
mod graphics {
    use super::{PixelBuffer, HEIGHT, WIDTH};
    use core::convert::Infallible;
    use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

    impl OriginDimensions for PixelBuffer {
        fn size(&self) -> Size {
            Size::new(WIDTH as u32, HEIGHT as u32)
        }
    }

    impl DrawTarget for PixelBuffer {
        type Color = BinaryColor;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(p, color) in pixels {
                self.set_pixel(p.x, p.y, color.is_on());
            }

            Ok(())
        }

        fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
            self.fill(color.is_on());
            Ok(())
        }
    }
}
