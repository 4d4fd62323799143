//! Linux userspace transport: spidev for the bus, `thread::sleep` for pacing.

use core::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::string::String;
use std::time::Duration;

use embedded_hal::{
    delay::DelayNs,
    spi::{self, ErrorKind, ErrorType, SpiBus},
};
use nix::errno::Errno;

use crate::mono::MonoFontProvider;
use crate::st7920::{LcdError, St7920};

pub const SPI_MODE_0: u8 = 0;
pub const DEFAULT_SPEED_HZ: u32 = 1_500_000;

const SPI_IOC_MAGIC: u8 = b'k';
nix::ioctl_write_ptr!(spi_ioc_wr_mode, SPI_IOC_MAGIC, 1, u8);
nix::ioctl_write_ptr!(spi_ioc_wr_max_speed_hz, SPI_IOC_MAGIC, 4, u32);

#[derive(Debug)]
pub enum SpidevError {
    Open { path: String, source: io::Error },
    Mode(Errno),
    Speed(Errno),
    Write(io::Error),
    ShortWrite { written: usize, expected: usize },
    /// The device is opened write-only.
    ReadUnsupported,
}

impl fmt::Display for SpidevError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpidevError::Open { path, source } => write!(f, "couldn't open {}: {}", path, source),
            SpidevError::Mode(e) => write!(f, "couldn't set spi mode: {}", e),
            SpidevError::Speed(e) => write!(f, "couldn't set spi speed: {}", e),
            SpidevError::Write(e) => write!(f, "spi write failed: {}", e),
            SpidevError::ShortWrite { written, expected } => {
                write!(f, "short spi write: {} of {} bytes", written, expected)
            }
            SpidevError::ReadUnsupported => write!(f, "spi device is write-only"),
        }
    }
}

impl std::error::Error for SpidevError {}

impl spi::Error for SpidevError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// A write-only spidev node, closed on drop.
pub struct SpidevBus {
    file: File,
    path: String,
}

impl SpidevBus {
    /// Opens `/dev/spidev{bus}.{device}` and applies mode and clock speed.
    pub fn open(bus: u8, device: u8, mode: u8, speed_hz: u32) -> Result<Self, SpidevError> {
        Self::open_path(&format!("/dev/spidev{}.{}", bus, device), mode, speed_hz)
    }

    pub fn open_path(path: &str, mode: u8, speed_hz: u32) -> Result<Self, SpidevError> {
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|source| SpidevError::Open {
                path: String::from(path),
                source,
            })?;
        let fd = file.as_raw_fd();

        // SAFETY: `fd` is open for the duration of both calls and the pointers
        // reference live locals of the ioctl argument types.
        unsafe { spi_ioc_wr_mode(fd, &mode) }.map_err(SpidevError::Mode)?;
        unsafe { spi_ioc_wr_max_speed_hz(fd, &speed_hz) }.map_err(SpidevError::Speed)?;

        log::info!("opened {} (mode {}, {} Hz)", path, mode, speed_hz);

        Ok(Self {
            file,
            path: String::from(path),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Drop for SpidevBus {
    fn drop(&mut self) {
        log::info!("closing {}", self.path);
    }
}

impl ErrorType for SpidevBus {
    type Error = SpidevError;
}

impl SpiBus for SpidevBus {
    fn read(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
        Err(SpidevError::ReadUnsupported)
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        write_once(&mut self.file, words)
    }

    fn transfer(&mut self, _read: &mut [u8], _write: &[u8]) -> Result<(), Self::Error> {
        Err(SpidevError::ReadUnsupported)
    }

    fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
        Err(SpidevError::ReadUnsupported)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// One `write(2)`, i.e. one spidev transfer. A short write is not retried.
fn write_once<W: Write>(w: &mut W, buf: &[u8]) -> Result<(), SpidevError> {
    let written = w.write(buf).map_err(SpidevError::Write)?;
    if written != buf.len() {
        return Err(SpidevError::ShortWrite {
            written,
            expected: buf.len(),
        });
    }
    Ok(())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns as u64));
    }
}

pub type Display = St7920<SpidevBus, StdDelay, MonoFontProvider<'static>>;

/// Opens the panel on `/dev/spidev{bus}.{device}` with the default font
/// family and runs the initialization sequence.
pub fn open(bus: u8, device: u8) -> Result<Display, LcdError<SpidevError>> {
    let spi = SpidevBus::open(bus, device, SPI_MODE_0, DEFAULT_SPEED_HZ).map_err(LcdError::Spi)?;
    St7920::new(spi, StdDelay, MonoFontProvider::default_family())
}
