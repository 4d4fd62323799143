//! [`FontProvider`] backed by `embedded-graphics` mono fonts.
//!
//! A family is a set of fixed-size faces of one typeface. Setting the pixel
//! height picks the tallest face that fits.

use embedded_graphics::{
    mono_font::{iso_8859_1, MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};

use crate::font::{FontError, FontProvider, Glyph};

const GLYPH_BUFFER_LEN: usize = 64;

/// X11 fixed, ISO 8859-1 (covers the degree sign).
pub const DEFAULT_FAMILY: &[&MonoFont<'static>] = &[
    &iso_8859_1::FONT_4X6,
    &iso_8859_1::FONT_5X8,
    &iso_8859_1::FONT_6X10,
    &iso_8859_1::FONT_6X12,
    &iso_8859_1::FONT_7X14,
    &iso_8859_1::FONT_9X18,
    &iso_8859_1::FONT_10X20,
];

pub struct MonoFontProvider<'a> {
    faces: &'a [&'a MonoFont<'a>],
    current: usize,
    buffer: [u8; GLYPH_BUFFER_LEN],
}

fn pitch(face: &MonoFont<'_>) -> usize {
    (face.character_size.width as usize + 7) / 8
}

impl<'a> MonoFontProvider<'a> {
    pub fn new(faces: &'a [&'a MonoFont<'a>]) -> Result<Self, FontError> {
        if faces.is_empty() {
            return Err(FontError::LoadFailed);
        }

        let fits =
            |f: &&MonoFont<'_>| pitch(f) * f.character_size.height as usize <= GLYPH_BUFFER_LEN;
        if !faces.iter().all(fits) {
            return Err(FontError::LoadFailed);
        }

        Ok(Self {
            faces,
            current: 0,
            buffer: [0; GLYPH_BUFFER_LEN],
        })
    }

    pub fn face(&self) -> &'a MonoFont<'a> {
        self.faces[self.current]
    }
}

impl MonoFontProvider<'static> {
    pub fn default_family() -> Self {
        Self {
            faces: DEFAULT_FAMILY,
            current: 0,
            buffer: [0; GLYPH_BUFFER_LEN],
        }
    }
}

impl FontProvider for MonoFontProvider<'_> {
    fn set_pixel_height(&mut self, height: u8) -> Result<(), FontError> {
        let best = self
            .faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.character_size.height <= height as u32)
            .max_by_key(|(_, f)| f.character_size.height)
            .map(|(i, _)| i);

        match best {
            Some(i) => {
                self.current = i;
                log::debug!(
                    "font height {}px -> {}x{} face",
                    height,
                    self.faces[i].character_size.width,
                    self.faces[i].character_size.height
                );
                Ok(())
            }
            None => Err(FontError::UnsupportedHeight { height }),
        }
    }

    fn rasterize(&mut self, c: char) -> Result<Glyph<'_>, FontError> {
        let face = self.faces[self.current];
        let pitch = pitch(face);
        let size = face.character_size;
        let len = pitch * size.height as usize;

        self.buffer.iter_mut().for_each(|b| *b = 0);

        let mut scratch = Scratch {
            buffer: &mut self.buffer[..len],
            pitch,
            size,
        };
        let mut utf8 = [0u8; 4];
        Text::with_baseline(
            c.encode_utf8(&mut utf8),
            Point::zero(),
            MonoTextStyle::new(face, BinaryColor::On),
            Baseline::Top,
        )
        .draw(&mut scratch)
        .map_err(|_| FontError::GlyphLoadFailed { codepoint: c })?;

        Ok(Glyph {
            width: size.width,
            rows: size.height,
            pitch,
            buffer: &self.buffer[..len],
            left: 0,
            top: face.baseline as i32,
            advance: ((size.width + face.character_spacing) * 64) as i32,
        })
    }

    fn ascender(&self) -> i32 {
        self.face().baseline as i32 * 64
    }
}

/// Packs drawn pixels into a 1-bpp MSB-first raster.
struct Scratch<'b> {
    buffer: &'b mut [u8],
    pitch: usize,
    size: Size,
}

impl OriginDimensions for Scratch<'_> {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for Scratch<'_> {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            if color.is_off() || p.x < 0 || p.y < 0 {
                continue;
            }

            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.size.width as usize && y < self.size.height as usize {
                self.buffer[y * self.pitch + x / 8] |= 0x80 >> (x % 8);
            }
        }

        Ok(())
    }
}
