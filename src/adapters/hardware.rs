//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the output shift register and the buzzer driver, exposing them
//! through [`DisplayPort`], [`IndicatorPort`], [`TonePort`] and
//! [`BatteryPort`].  This is the only module in the system that touches
//! actual hardware.  On non-espidf targets, the underlying drivers use
//! cfg-gated simulation stubs.

use crate::app::ports::{BatteryPort, DisplayPort, IndicatorPort, TonePort};
use crate::blink::Indicator;
use crate::config::Tone;
use crate::drivers::display::{self, DISPLAY_FIELD, INDICATOR_FIELD};
use crate::drivers::hw_init;
use crate::drivers::shift_register::{GpioLine, OutputRegister};
use crate::drivers::tone::ToneDriver;
use crate::pins;
use embedded_hal::delay::DelayNs;

/// The board's shift register on its three GPIO lines.
pub type BoardRegister = OutputRegister<GpioLine, GpioLine, GpioLine>;

/// Register contents at power-on: all segments dark, no digit, no LED.
pub const REGISTER_IDLE: u16 = display::encode_digit(0, 2);

pub fn board_register() -> BoardRegister {
    OutputRegister::new(
        GpioLine(pins::SR_DATA_GPIO),
        GpioLine(pins::SR_CLOCK_GPIO),
        GpioLine(pins::SR_LATCH_GPIO),
        REGISTER_IDLE,
    )
}

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    register: BoardRegister,
    tone: ToneDriver,
}

impl HardwareAdapter {
    pub fn new(register: BoardRegister, tone: ToneDriver) -> Self {
        Self { register, tone }
    }

    /// Current shadow word of the output register.
    pub fn register_word(&self) -> u16 {
        self.register.word()
    }
}

// ── DisplayPort implementation ────────────────────────────────

impl DisplayPort for HardwareAdapter {
    fn show_digit(&mut self, nibble: u8, position: u8) {
        self.register
            .write_field(DISPLAY_FIELD, display::encode_digit(nibble, position));
    }

    fn set_decimal_point(&mut self, on: bool) {
        // Active low.
        self.register.set_bits(pins::SR_DOT, !on);
    }

    fn commit_display(&mut self) {
        self.register.update();
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl IndicatorPort for HardwareAdapter {
    fn set_indicator(&mut self, indicator: Indicator, on: bool) {
        self.register.set_bits(display::indicator_bit(indicator), on);
    }

    fn commit_indicators(&mut self) {
        debug_assert_eq!(self.register.word() & !(DISPLAY_FIELD | INDICATOR_FIELD), 0);
        self.register.update();
    }
}

// ── TonePort / BatteryPort ────────────────────────────────────

impl TonePort for HardwareAdapter {
    fn beep(&mut self, tone: Tone) {
        self.tone.beep(tone);
    }
}

// ── Digit hold ────────────────────────────────────────────────

impl DelayNs for HardwareAdapter {
    #[cfg(target_os = "espidf")]
    fn delay_ns(&mut self, ns: u32) {
        // Busy-wait: a digit hold is far below one FreeRTOS tick.
        DelayNs::delay_ns(&mut esp_idf_hal::delay::Ets, ns);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ns(&mut self, _ns: u32) {}
}

impl BatteryPort for HardwareAdapter {
    fn read_level(&mut self) -> u8 {
        // 12-bit conversion scaled to 8 bits.
        (hw_init::adc1_read(pins::BATTERY_ADC_CHANNEL) >> 4) as u8
    }
}
