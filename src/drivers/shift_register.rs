//! 16-bit output shift register (two cascaded 74HC595).
//!
//! Every visible output of the token (segments, digit selects, indicator
//! LEDs) sits behind this register.  The driver keeps a shadow word;
//! callers edit bits in the shadow and [`OutputRegister::update`] shifts the
//! whole word out MSB first and latches it.
//!
//! ```text
//!  bit 15 ........ 12  11  10   9   8   7   6 ........ 0
//!       unused     GRN YEL RED  D1  D0  DP  g f e d c b a
//! ```

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin, PinState};

use crate::drivers::hw_init;

/// A push-pull output configured by [`hw_init`], driven with raw sys calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioLine(pub i32);

impl ErrorType for GpioLine {
    type Error = Infallible;
}

impl OutputPin for GpioLine {
    fn set_low(&mut self) -> Result<(), Infallible> {
        hw_init::gpio_write(self.0, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        hw_init::gpio_write(self.0, true);
        Ok(())
    }
}

/// Bit-banged shift register with a shadow copy of the outputs.
pub struct OutputRegister<D, C, L> {
    data: D,
    clock: C,
    latch: L,
    word: u16,
    updates: u32,
}

impl<D, C, L> OutputRegister<D, C, L>
where
    D: OutputPin<Error = Infallible>,
    C: OutputPin<Error = Infallible>,
    L: OutputPin<Error = Infallible>,
{
    pub fn new(data: D, clock: C, latch: L, initial: u16) -> Self {
        Self {
            data,
            clock,
            latch,
            word: initial,
            updates: 0,
        }
    }

    pub fn word(&self) -> u16 {
        self.word
    }

    /// Replace the bits selected by `mask` with those of `value`.
    pub fn write_field(&mut self, mask: u16, value: u16) {
        self.word = (self.word & !mask) | (value & mask);
    }

    pub fn set_bits(&mut self, bits: u16, on: bool) {
        self.write_field(bits, if on { bits } else { 0 });
    }

    /// Shift the shadow word out and latch it.
    pub fn update(&mut self) {
        for bit in (0..16).rev() {
            let level = PinState::from(self.word & (1 << bit) != 0);
            let Ok(()) = self.data.set_state(level);
            let Ok(()) = self.clock.set_high();
            let Ok(()) = self.clock.set_low();
        }
        let Ok(()) = self.latch.set_high();
        let Ok(()) = self.latch.set_low();
        self.updates = self.updates.wrapping_add(1);
    }

    /// Latches since construction.
    pub fn updates(&self) -> u32 {
        self.updates
    }
}
