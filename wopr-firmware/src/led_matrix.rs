//! MAX7219 chain driver for the 8x96 marquee
//!
//! Twelve 8x8 modules are daisy-chained on one SPI bus. Every 16-bit
//! register write is shifted through the whole chain, so a broadcast is
//! one 24-byte transfer and a full frame is eight of them (one digit
//! row across all modules). The driver keeps a framebuffer and exposes
//! the core's `Surface` so the animation never sees the bus.

use embassy_time::Timer;
use esp_hal::gpio::Output;
use esp_hal::spi::master::Spi;
use esp_hal::Blocking;
use log::debug;

use wopr_core::animation::{self, RandomSource, Surface};
use wopr_core::{MATRIX_HEIGHT, MATRIX_WIDTH};

/// Number of chained 8x8 modules.
pub const NUM_MODULES: usize = 12;

// MAX7219 register map. Digit registers are 1-based.
const REG_DIGIT0: u8 = 0x01;
const REG_DECODE_MODE: u8 = 0x09;
const REG_INTENSITY: u8 = 0x0A;
const REG_SCAN_LIMIT: u8 = 0x0B;
const REG_SHUTDOWN: u8 = 0x0C;
const REG_DISPLAY_TEST: u8 = 0x0F;

/// Settle delay after a blank, so the chain has latched before the next
/// bus access.
const CLEAR_SETTLE_MS: u64 = 100;

/// Errors from the display bus.
#[derive(Debug, Clone, Copy)]
pub enum MatrixError {
    /// SPI transfer failed.
    Bus,
}

/// Exclusive handle on the physical chain, held for the process
/// lifetime and injected wherever a frame is drawn.
pub struct LedMatrix<'d> {
    spi: Spi<'d, Blocking>,
    cs: Output<'d>,
    /// One byte per module per row; bit 7 is the module's leftmost column.
    frame: [[u8; NUM_MODULES]; MATRIX_HEIGHT],
}

impl<'d> LedMatrix<'d> {
    pub fn new(spi: Spi<'d, Blocking>, cs: Output<'d>) -> Self {
        Self {
            spi,
            cs,
            frame: [[0; NUM_MODULES]; MATRIX_HEIGHT],
        }
    }

    /// Wake the chain: raw pixel mode, all rows scanned, lowest
    /// intensity, test mode off, framebuffer blanked.
    pub fn init(&mut self) -> Result<(), MatrixError> {
        debug!("Initializing MAX7219 chain");
        self.broadcast(REG_DISPLAY_TEST, 0)?;
        self.broadcast(REG_SCAN_LIMIT, 7)?;
        self.broadcast(REG_DECODE_MODE, 0)?;
        self.broadcast(REG_SHUTDOWN, 1)?;
        self.broadcast(REG_INTENSITY, 0)?;
        animation::blank(self);
        self.flush()
    }

    /// Write one register with the same value on every module.
    fn broadcast(&mut self, register: u8, data: u8) -> Result<(), MatrixError> {
        let mut words = [0u8; NUM_MODULES * 2];
        for chunk in words.chunks_exact_mut(2) {
            chunk[0] = register;
            chunk[1] = data;
        }
        self.transfer(&words)
    }

    fn transfer(&mut self, words: &[u8]) -> Result<(), MatrixError> {
        self.cs.set_low();
        let result = self.spi.write(words);
        self.cs.set_high();
        result.map_err(|_| MatrixError::Bus)
    }

    /// Push the framebuffer out, one digit row across the chain at a
    /// time. The first word shifted in lands on the far module.
    pub fn flush(&mut self) -> Result<(), MatrixError> {
        for row in 0..MATRIX_HEIGHT {
            let mut words = [0u8; NUM_MODULES * 2];
            for (i, chunk) in words.chunks_exact_mut(2).enumerate() {
                let module = NUM_MODULES - 1 - i;
                chunk[0] = REG_DIGIT0 + row as u8;
                chunk[1] = self.frame[row][module];
            }
            self.transfer(&words)?;
        }
        Ok(())
    }

    /// Draw and flush one randomized typing frame.
    pub fn render_typing_frame<R: RandomSource>(&mut self, rng: &mut R) -> Result<(), MatrixError> {
        animation::render_typing_frame(self, rng);
        self.flush()
    }

    /// Blank the whole chain and give the bus time to latch.
    pub async fn clear(&mut self) -> Result<(), MatrixError> {
        animation::blank(self);
        self.flush()?;
        Timer::after_millis(CLEAR_SETTLE_MS).await;
        Ok(())
    }
}

impl Surface for LedMatrix<'_> {
    fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        if x >= MATRIX_WIDTH || y >= MATRIX_HEIGHT {
            return;
        }
        let module = x / 8;
        let bit = 7 - (x % 8) as u8;
        if on {
            self.frame[y][module] |= 1 << bit;
        } else {
            self.frame[y][module] &= !(1 << bit);
        }
    }
}
