//! Status screen on an ST7920 attached to /dev/spidev0.0.
//!
//! Redraws once per 100ms until SIGINT/SIGTERM. The panel is blanked when
//! the display is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use log::{info, warn};
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

use st7920::bitmaps::{ARROW, BITMAP_WIDTH, LOGO};
use st7920::linux::{self, Display};

const SPI_BUS: u8 = 0;
const SPI_DEVICE: u8 = 0;
const FONT_HEIGHT: u8 = 10;
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

static RUNNING: AtomicBool = AtomicBool::new(true);

extern "C" fn handle_signal(_signal: nix::libc::c_int) {
    RUNNING.store(false, Ordering::SeqCst);
}

struct Panel {
    lcd: Display,
    started: Instant,
}

impl Panel {
    fn new(lcd: Display) -> Self {
        Self {
            lcd,
            started: Instant::now(),
        }
    }

    fn splash(&mut self) -> Result<()> {
        self.lcd.draw_all()?;
        self.lcd.put_string(2, 26, "Loading...")?;
        self.lcd.draw_all()?;
        Ok(())
    }

    fn update_time(&mut self) -> Result<()> {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock before epoch")?
            .as_secs();
        let line = format!(
            "{:02}:{:02}:{:02} UTC",
            secs / 3600 % 24,
            secs / 60 % 60,
            secs % 60
        );

        self.lcd.set_region(10, 0, 127, 11, false);
        self.lcd.put_string(10, 0, &line)?;
        self.lcd.draw_sections_for_bb(10, 0, 127, 11)?;
        Ok(())
    }

    fn update_uptime(&mut self) -> Result<()> {
        let up = self.started.elapsed().as_secs();
        let line = format!("Uptime:{:>6}s", up);

        self.lcd.set_region(10, 24, 127, 35, false);
        self.lcd.put_string(10, 24, &line)?;
        for r in 24..36 {
            self.lcd.draw_row(r)?;
        }
        Ok(())
    }
}

fn install_signal_handlers() -> Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(handle_signal),
        SaFlags::empty(),
        SigSet::empty(),
    );

    for sig in [Signal::SIGINT, Signal::SIGTERM] {
        // SAFETY: the handler only stores to an atomic.
        unsafe { sigaction(sig, &action) }.with_context(|| format!("sigaction({})", sig))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Setting up lcd...");
    let mut lcd = linux::open(SPI_BUS, SPI_DEVICE).context("couldn't open display")?;
    lcd.set_font_height(FONT_HEIGHT)?;

    let mut panel = Panel::new(lcd);
    panel.splash()?;

    install_signal_handlers()?;

    panel.lcd.clear_panel()?;
    panel.lcd.put_bitmap(0, 0, BITMAP_WIDTH, &LOGO, LOGO.len());
    panel.lcd.put_bitmap(0, 25, BITMAP_WIDTH, &ARROW, ARROW.len());
    panel.lcd.draw_all()?;

    while RUNNING.load(Ordering::SeqCst) {
        if let Err(e) = panel.update_time().and_then(|_| panel.update_uptime()) {
            warn!("redraw failed: {:#}", e);
            break;
        }
        thread::sleep(FRAME_INTERVAL);
    }

    info!("Shutting down");
    Ok(())
}
