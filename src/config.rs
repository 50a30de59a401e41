//! System configuration parameters
//!
//! All tunable parameters for the token.  Configuration is compiled in;
//! the device id and the default mode can be overridden at build time with
//! the `MAGIQUE_ID` and `MAGIQUE_MODE` environment variables.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::modes::ModeTag;

/// A tone request handed to the buzzer driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tone {
    /// Buzzer frequency in Hz.
    pub frequency_hz: u16,
    /// Duration in 10 ms units.
    pub duration_10ms: u8,
    /// Higher priority tones are not cut short by lower priority ones.
    pub priority: u8,
}

impl Tone {
    pub const fn new(frequency_hz: u16, duration_10ms: u8, priority: u8) -> Self {
        Self {
            frequency_hz,
            duration_10ms,
            priority,
        }
    }
}

/// Core token configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    // --- Identity ---
    /// Device id shown on mode change; `None` derives it from the factory MAC.
    pub device_id: Option<u8>,
    /// Mode advertised at boot.
    pub default_mode: ModeTag,

    // --- Timing ---
    /// Period of the hardware tick in microseconds (~187 Hz).
    pub tick_period_us: u32,
    /// SHORT_POLL fires when `jiffies & short_poll_mask == 0`.
    pub short_poll_mask: u8,
    /// LONG_POLL fires when `jiffies == long_poll_tick`.
    pub long_poll_tick: u8,

    // --- UI ---
    /// Countdown value armed by a mode change or a button press.
    pub display_hold_ticks: u16,
    /// Ticks an indicator stays lit after a blink request.
    pub blink_ticks: u8,
    /// Time each digit stays latched during a multiplex cycle, in microseconds.
    pub digit_hold_us: u32,
    /// Clear DISPLAY_ACTIVE once the display-hold countdown has run out.
    pub clear_display_on_hold_expiry: bool,
    /// Light each indicator in turn during the boot self-test.
    pub self_test_sweep: bool,
    /// Played once the control loop is about to start.
    pub boot_tone: Tone,
    /// Played on every mode transition.
    pub ack_tone: Tone,

    // --- Power ---
    /// Battery level below which the token shuts down; `None` disables the policy.
    pub low_battery_threshold: Option<u8>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            // Identity
            device_id: build_time_id(),
            default_mode: build_time_mode().unwrap_or(ModeTag::Source),

            // Timing
            tick_period_us: 5_348, // 12 kHz VLO / 64 ≈ 187 Hz
            short_poll_mask: 0x0f, // every 16 ticks
            long_poll_tick: 132,   // once per 256-tick lap

            // UI
            display_hold_ticks: 1000,
            blink_ticks: 8,
            digit_hold_us: 1000,
            clear_display_on_hold_expiry: true,
            self_test_sweep: false,
            boot_tone: Tone::new(1000, 10, 0),
            ack_tone: Tone::new(1000, 5, 0),

            // Power
            low_battery_threshold: None,
        }
    }
}

impl TokenConfig {
    /// Reject values that would break the timing invariants of the loop.
    pub fn validate(&self) -> Result<()> {
        if self.tick_period_us == 0 {
            return Err(Error::Config("tick_period_us must be non-zero"));
        }
        if self.blink_ticks == 0 {
            return Err(Error::Config("blink_ticks must be non-zero"));
        }
        // Beyond half the 8-bit ring a distance is ambiguous.
        if self.blink_ticks >= 128 {
            return Err(Error::Config("blink_ticks must be below 128"));
        }
        // A hold that is already expired would clear the identity display
        // in the pass that sets it.
        if self.clear_display_on_hold_expiry && self.display_hold_ticks <= 1 {
            return Err(Error::Config("display_hold_ticks must exceed 1"));
        }
        if self.short_poll_mask == 0 {
            return Err(Error::Config("short poll would fire on every tick"));
        }
        if self.default_mode == ModeTag::None {
            return Err(Error::Config("default_mode must name a game mode"));
        }
        Ok(())
    }

    /// Tick rate in Hz, rounded down.
    pub fn tick_hz(&self) -> u32 {
        1_000_000 / self.tick_period_us.max(1)
    }
}

// `build.rs` refuses to build with a malformed `MAGIQUE_ID` / `MAGIQUE_MODE`,
// so the parsers below only see well-formed values.

fn build_time_id() -> Option<u8> {
    option_env!("MAGIQUE_ID").and_then(parse_id)
}

fn build_time_mode() -> Option<ModeTag> {
    option_env!("MAGIQUE_MODE").and_then(parse_mode)
}

/// Parse a device id override (`0`..=`255`).
pub fn parse_id(raw: &str) -> Option<u8> {
    raw.trim().parse::<u8>().ok()
}

/// Parse a mode override: the numeric tag of a game mode (`1`..=`4`).
pub fn parse_mode(raw: &str) -> Option<ModeTag> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .and_then(ModeTag::from_u8)
        .filter(|m| *m != ModeTag::None)
}
