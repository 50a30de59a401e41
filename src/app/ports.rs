//! Port traits: the boundary between the scheduler core and the hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Dispatcher (core)
//! ```
//!
//! Drivers for the display electronics, the buzzer, the radio and the
//! battery ADC implement these traits.  The [`Dispatcher`](crate::scheduler::Dispatcher)
//! consumes them via generics, so the core never touches hardware directly
//! and every pass can be replayed against a recording mock.

use crate::blink::Indicator;
use crate::config::Tone;
use crate::modes::DeviceIdentity;

// ───────────────────────────────────────────────────────────────
// Output ports (core → hardware)
// ───────────────────────────────────────────────────────────────

/// Two-digit 7-segment display behind the output shift register.
pub trait DisplayPort {
    /// Load `nibble` (0x0–0xF) for digit `position` (0 or 1); position 2
    /// with value 0 selects no digit (blank cycle).
    fn show_digit(&mut self, nibble: u8, position: u8);

    /// Light the decimal point of the digit currently loaded.
    fn set_decimal_point(&mut self, on: bool);

    /// Latch the loaded digit (and the indicator state) to the outputs.
    fn commit_display(&mut self);
}

/// The three indicator LEDs.
pub trait IndicatorPort {
    fn set_indicator(&mut self, indicator: Indicator, on: bool);

    /// Push the current indicator/register state without touching digits.
    fn commit_indicators(&mut self);
}

/// Piezo buzzer.  Fire-and-forget: returns immediately.
pub trait TonePort {
    fn beep(&mut self, tone: Tone);
}

// ───────────────────────────────────────────────────────────────
// Boot-time ports
// ───────────────────────────────────────────────────────────────

/// Battery sense, sampled once at boot.
pub trait BatteryPort {
    /// 8-bit battery estimate.  Always succeeds; a failed read returns
    /// whatever the converter produced.
    fn read_level(&mut self) -> u8;
}

/// Declared role of the radio link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioRole {
    Transmit,
    Receive,
}

/// Packet radio.  The core only initialises it and, optionally, hands it
/// the identity beacon from a poll hook.
pub trait RadioPort {
    fn init(&mut self, role: RadioRole);

    fn transmit(&mut self, payload: &[u8]);

    fn power_down(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Scheduling ports
// ───────────────────────────────────────────────────────────────

/// The single suspension point of the main loop.
pub trait WakePort {
    /// Enter the low-power wait until an interrupt signals wake.  A wake
    /// signalled between the idle check and this call must not be lost.
    fn wait_for_interrupt(&mut self);
}

/// Reserved extension points run once per qualifying tick window.
pub trait PollHooks {
    fn on_short_poll(&mut self, _identity: &DeviceIdentity) {}

    fn on_long_poll(&mut self, _identity: &DeviceIdentity) {}
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl PollHooks for NoHooks {}

// ───────────────────────────────────────────────────────────────
// Event sink port (core → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
