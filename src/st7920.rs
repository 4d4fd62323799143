use core::fmt;

use embedded_hal::{delay::DelayNs, spi::SpiBus};

use crate::command::{self, Frame, ReadWrite, RegisterSelect};
use crate::font::{self, FontError, FontProvider};
use crate::pixels::{DisplayAddress, PixelBuffer, BANK_COLUMNS, HEIGHT, WIDTH, WORD_BITS};

pub const DEFAULT_FONT_HEIGHT: u8 = 8;

/// Controller execution time for one instruction.
const INSTRUCTION_SETTLE_US: u32 = 75;

/// Command pacing. There is no busy flag in serial mode, so every instruction
/// is followed by a fixed wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub instruction_settle_us: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            instruction_settle_us: INSTRUCTION_SETTLE_US,
        }
    }
}

#[derive(Debug)]
pub enum LcdError<SE> {
    Spi(SE),
    Font(FontError),
    PayloadTooLong { len: usize },
}

impl<SE> From<FontError> for LcdError<SE> {
    fn from(e: FontError) -> Self {
        LcdError::Font(e)
    }
}

impl<SE: fmt::Debug> fmt::Display for LcdError<SE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LcdError::Spi(e) => write!(f, "spi write failed: {:?}", e),
            LcdError::Font(e) => write!(f, "{}", e),
            LcdError::PayloadTooLong { len } => write!(
                f,
                "payload of {} bytes exceeds the {} byte frame limit",
                len,
                command::MAX_PAYLOAD
            ),
        }
    }
}

impl<SE: fmt::Debug> core::error::Error for LcdError<SE> {}

/// ST7920 in serial mode, graphics display enabled.
///
/// The bus, delay and font are owned for the lifetime of the driver. Dropping
/// an initialized driver blanks the panel. The trait bounds sit on the struct
/// because the `Drop` impl needs them.
pub struct St7920<SPI, D, F>
where
    SPI: SpiBus,
    D: DelayNs,
    F: FontProvider,
{
    spi: SPI,
    delay: D,
    font: F,
    timing: Timing,
    pixels: PixelBuffer,
    font_height: u8,
    initialized: bool,
}

impl<SPI, D, F> St7920<SPI, D, F>
where
    SPI: SpiBus,
    D: DelayNs,
    F: FontProvider,
{
    /// Create an St7920 display and run the initialization sequence
    pub fn new(spi: SPI, delay: D, font: F) -> Result<Self, LcdError<SPI::Error>> {
        Self::with_timing(spi, delay, font, Timing::default())
    }

    pub fn with_timing(
        spi: SPI,
        delay: D,
        font: F,
        timing: Timing,
    ) -> Result<Self, LcdError<SPI::Error>> {
        let mut disp = Self {
            spi,
            delay,
            font,
            timing,
            pixels: PixelBuffer::new(),
            font_height: DEFAULT_FONT_HEIGHT,
            initialized: false,
        };

        disp.init(DEFAULT_FONT_HEIGHT)?;

        Ok(disp)
    }

    /// Basic function set, display on, then extended function set with
    /// graphics enabled. Must complete before anything is drawn.
    pub fn init(&mut self, font_height: u8) -> Result<(), LcdError<SPI::Error>> {
        log::debug!("st7920: init, font height {}px", font_height);

        self.set_function_set(false, false)?;
        self.set_display_control(true, false, false)?;
        self.set_function_set(true, true)?;
        self.set_font_height(font_height)?;

        self.initialized = true;
        Ok(())
    }

    /// Frames `data` and writes it to the bus in one transfer.
    pub fn send(
        &mut self,
        rs: RegisterSelect,
        rw: ReadWrite,
        data: &[u8],
    ) -> Result<(), LcdError<SPI::Error>> {
        let frame =
            Frame::encode(rs, rw, data).ok_or(LcdError::PayloadTooLong { len: data.len() })?;
        self.spi.write(frame.as_bytes()).map_err(LcdError::Spi)
    }

    fn instruction(&mut self, data: &[u8]) -> Result<(), LcdError<SPI::Error>> {
        log::trace!("st7920: instruction {:02x?}", data);
        self.send(RegisterSelect::Instruction, ReadWrite::Write, data)?;
        self.delay.delay_us(self.timing.instruction_settle_us);
        Ok(())
    }

    fn config(&mut self, name: &str, cmd: u8) -> Result<(), LcdError<SPI::Error>> {
        log::debug!("st7920: {} {:#04x}", name, cmd);
        self.instruction(&[cmd])
    }

    pub fn set_function_set(
        &mut self,
        extended: bool,
        graphics: bool,
    ) -> Result<(), LcdError<SPI::Error>> {
        self.config("function set", command::function_set(extended, graphics))
    }

    pub fn set_display_control(
        &mut self,
        display_on: bool,
        cursor_on: bool,
        blink_on: bool,
    ) -> Result<(), LcdError<SPI::Error>> {
        let cmd = command::display_control(display_on, cursor_on, blink_on);
        self.config("display control", cmd)
    }

    pub fn set_shift_control(
        &mut self,
        shift: bool,
        right: bool,
    ) -> Result<(), LcdError<SPI::Error>> {
        self.config("shift control", command::shift_control(shift, right))
    }

    pub fn set_entry_mode(
        &mut self,
        increase: bool,
        shift: bool,
    ) -> Result<(), LcdError<SPI::Error>> {
        self.config("entry mode", command::entry_mode(increase, shift))
    }

    pub fn set_gram_address(&mut self, row: u8, column: u8) -> Result<(), LcdError<SPI::Error>> {
        self.instruction(&command::gram_address(row, column))
    }

    pub fn set_font_height(&mut self, height: u8) -> Result<(), LcdError<SPI::Error>> {
        self.font.set_pixel_height(height)?;
        self.font_height = height;
        Ok(())
    }

    pub fn font_height(&self) -> u8 {
        self.font_height
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// Direct canvas access, e.g. as an `embedded-graphics` draw target.
    pub fn pixels_mut(&mut self) -> &mut PixelBuffer {
        &mut self.pixels
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        self.pixels.set_pixel(x, y, on);
    }

    pub fn set_region(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, on: bool) {
        self.pixels.set_region(x1, y1, x2, y2, on);
    }

    pub fn put_char(&mut self, x: i32, y: i32, c: char) -> Result<(), LcdError<SPI::Error>> {
        font::put_char(&mut self.pixels, &mut self.font, x, y, c)?;
        Ok(())
    }

    pub fn put_string(&mut self, x: i32, y: i32, text: &str) -> Result<(), LcdError<SPI::Error>> {
        font::put_string(&mut self.pixels, &mut self.font, x, y, text)?;
        Ok(())
    }

    pub fn put_bitmap(&mut self, x: i32, y: i32, width: u8, data: &[u8], len: usize) {
        self.pixels.put_bitmap(x, y, width, data, len);
    }

    /// Flushes one word-cell. `c` is the 16-pixel column within logical row
    /// `r` (0-7).
    pub fn draw_section(&mut self, r: u8, c: u8) -> Result<(), LcdError<SPI::Error>> {
        if r as usize >= HEIGHT || c as usize >= BANK_COLUMNS {
            return Ok(());
        }

        let addr = DisplayAddress::for_cell(r as usize, c as usize);
        let word = self.pixels.word(addr);

        self.set_gram_address(addr.row, addr.column)?;
        self.send(RegisterSelect::Data, ReadWrite::Write, &word.to_be_bytes())
    }

    /// Flushes every word-cell touched by the inclusive rectangle, one address
    /// set per cell.
    pub fn draw_sections_for_bb(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    ) -> Result<(), LcdError<SPI::Error>> {
        let (x1, x2) = (x1.max(0), x2.min(WIDTH as i32 - 1));
        let (y1, y2) = (y1.max(0), y2.min(HEIGHT as i32 - 1));
        if x1 > x2 || y1 > y2 {
            return Ok(());
        }

        let (c1, c2) = (x1 / WORD_BITS as i32, x2 / WORD_BITS as i32);
        log::trace!("st7920: sections rows {}..={} cells {}..={}", y1, y2, c1, c2);

        for r in y1..=y2 {
            for c in c1..=c2 {
                self.draw_section(r as u8, c as u8)?;
            }
        }

        Ok(())
    }

    /// Flushes logical row `r` as one burst; the controller auto-increments the
    /// column address across the row.
    pub fn draw_row(&mut self, r: u8) -> Result<(), LcdError<SPI::Error>> {
        if r as usize >= HEIGHT {
            return Ok(());
        }

        let addr = DisplayAddress::for_cell(r as usize, 0);
        let data = self.pixels.row_bytes(r as usize);

        self.set_gram_address(addr.row, addr.column)?;
        self.send(RegisterSelect::Data, ReadWrite::Write, &data)
    }

    pub fn draw_all(&mut self) -> Result<(), LcdError<SPI::Error>> {
        log::trace!("st7920: full redraw");
        for r in 0..HEIGHT as u8 {
            self.draw_row(r)?;
        }
        Ok(())
    }

    /// Switches every pixel off and flushes the whole panel.
    pub fn clear_panel(&mut self) -> Result<(), LcdError<SPI::Error>> {
        self.pixels.set_region(0, 0, WIDTH as i32 - 1, HEIGHT as i32 - 1, false);
        self.draw_all()
    }
}

impl<SPI, D, F> Drop for St7920<SPI, D, F>
where
    SPI: SpiBus,
    D: DelayNs,
    F: FontProvider,
{
    fn drop(&mut self) {
        if !self.initialized {
            return;
        }

        if let Err(e) = self.clear_panel() {
            log::warn!("st7920: couldn't blank panel on teardown: {}", e);
        }
    }
}
