//! ST7920 128x64 graphic LCD driver for [embedded-hal v1](https://github.com/rust-embedded/embedded-hal)
//!
//! The controller is driven through its 3-wire serial interface. Drawing calls
//! mutate an in-memory [`PixelBuffer`]; redraw calls flush it to the panel's
//! GRAM through an [`embedded_hal::spi::SpiBus`].
#![no_std]

pub use embedded_hal as hal;

pub mod bitmaps;
pub mod command;
pub mod font;
#[cfg(feature = "linux")]
pub mod linux;
#[cfg(feature = "embedded_graphics")]
pub mod mono;
pub mod pixels;
pub mod st7920;

pub use crate::command::{Frame, ReadWrite, RegisterSelect};
pub use crate::font::{FontError, FontProvider, Glyph};
pub use crate::pixels::{DisplayAddress, PixelBuffer, HEIGHT, WIDTH};
pub use crate::st7920::{LcdError, St7920, Timing, DEFAULT_FONT_HEIGHT};

// =======================
// For unit tests and the Linux transport only!
#[cfg(any(test, feature = "linux"))]
#[macro_use]
extern crate std;
// =======================
