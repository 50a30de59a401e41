//! Device identity and the blackboard handed to mode payloads.
//!
//! `ModeContext` is the single struct a mode's `on_enter` / `process_tick`
//! reads from and writes to.  It exposes exactly the requests a payload is
//! allowed to make: advertise a mode, ask for the display, ask for blinks,
//! consume the button, beep and draw random numbers.

use serde::{Deserialize, Serialize};

use super::ModeTag;
use crate::blink::Indicator;
use crate::config::Tone;
use crate::error::{Error, Result};
use crate::events::{EventMask, FlagMask, SharedSchedulerState};
use crate::rng::RandomSource;
use crate::app::ports::TonePort;

// ---------------------------------------------------------------------------
// Device identity
// ---------------------------------------------------------------------------

/// Who this token is and what it is running.
///
/// `mode` is only ever written by the mode state machine; payloads request a
/// change by advertising through `mode_adv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    id: u8,
    mode: ModeTag,
    /// `ModeTag::None` means no transition requested.
    mode_adv: ModeTag,
    battery_level: u8,
    #[serde(skip)]
    reenter: bool,
}

impl DeviceIdentity {
    /// Fresh identity: no mode running, `default_mode` advertised.
    pub fn new(id: u8, default_mode: ModeTag) -> Self {
        Self {
            id,
            mode: ModeTag::None,
            mode_adv: default_mode,
            battery_level: 0,
            reenter: false,
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn mode(&self) -> ModeTag {
        self.mode
    }

    pub fn mode_adv(&self) -> ModeTag {
        self.mode_adv
    }

    pub fn battery_level(&self) -> u8 {
        self.battery_level
    }

    pub fn set_battery_level(&mut self, level: u8) {
        self.battery_level = level;
    }

    /// Request a transition into `mode` at the start of the next pass.
    /// Advertising the running mode is a no-op; see [`force_reenter`](Self::force_reenter).
    pub fn advertise(&mut self, mode: ModeTag) {
        self.mode_adv = mode;
    }

    /// Request that the running mode be left and re-entered, re-running
    /// its initializer.
    pub fn force_reenter(&mut self) {
        self.reenter = true;
    }

    pub fn reenter_requested(&self) -> bool {
        self.reenter
    }

    pub(super) fn commit_mode(&mut self, mode: ModeTag) {
        self.mode = mode;
    }

    pub(super) fn clear_advertisement(&mut self) {
        self.mode_adv = ModeTag::None;
    }

    pub(super) fn clear_reenter(&mut self) {
        self.reenter = false;
    }

    /// Encode the identity beacon into `buf`, returning the used prefix.
    pub fn encode_beacon<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8]> {
        postcard::to_slice(self, buf).map_err(|_| Error::Encode)
    }

    /// Short human-readable label, e.g. `MQ-2A`.
    pub fn label(&self) -> heapless::String<8> {
        use core::fmt::Write;
        let mut s = heapless::String::new();
        let _ = write!(s, "MQ-{:02X}", self.id);
        s
    }
}

// ---------------------------------------------------------------------------
// Two-digit display content
// ---------------------------------------------------------------------------

/// What the two 7-segment digits show.
///
/// Bits 0..3 digit 0, bits 4..7 digit 1, bit 8 / bit 9 the decimal point of
/// digit 0 / digit 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayContent(u16);

impl DisplayContent {
    const DOT0: u16 = 0x100;
    const DOT1: u16 = 0x200;

    pub const fn blank() -> Self {
        Self(0)
    }

    pub const fn from_raw(raw: u16) -> Self {
        Self(raw & 0x3ff)
    }

    /// Show a byte as two hex digits.
    pub const fn from_byte(value: u8) -> Self {
        Self(value as u16)
    }

    /// Show `value` (0..=99) as two decimal digits.
    pub const fn decimal(value: u8) -> Self {
        let v = if value > 99 { 99 } else { value };
        Self(((v / 10) << 4 | (v % 10)) as u16)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }

    pub const fn digit(self, position: u8) -> u8 {
        ((self.0 >> (4 * (position as u16 & 1))) & 0x0f) as u8
    }

    pub const fn dot(self, position: u8) -> bool {
        let mask = if position == 0 { Self::DOT0 } else { Self::DOT1 };
        self.0 & mask != 0
    }

    pub const fn with_dot(self, position: u8, on: bool) -> Self {
        let mask = if position == 0 { Self::DOT0 } else { Self::DOT1 };
        if on { Self(self.0 | mask) } else { Self(self.0 & !mask) }
    }
}

// ---------------------------------------------------------------------------
// ModeContext
// ---------------------------------------------------------------------------

/// The context passed to every mode payload entry point.
pub struct ModeContext<'a> {
    /// Identity of this token; write `mode_adv` through [`DeviceIdentity::advertise`].
    pub identity: &'a mut DeviceIdentity,
    /// `jiffies` as drained at the start of this pass.
    pub now: u8,
    events: &'a mut EventMask,
    shared: &'a SharedSchedulerState,
    display: &'a mut DisplayContent,
    tones: &'a mut dyn TonePort,
    rng: &'a mut dyn RandomSource,
    hold_ticks: u16,
    press_taken: bool,
}

impl<'a> ModeContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        identity: &'a mut DeviceIdentity,
        now: u8,
        events: &'a mut EventMask,
        shared: &'a SharedSchedulerState,
        display: &'a mut DisplayContent,
        tones: &'a mut dyn TonePort,
        rng: &'a mut dyn RandomSource,
        hold_ticks: u16,
    ) -> Self {
        Self {
            identity,
            now,
            events,
            shared,
            display,
            tones,
            rng,
            hold_ticks,
            press_taken: false,
        }
    }

    /// Events being processed in this pass.
    pub fn events(&self) -> EventMask {
        *self.events
    }

    /// Blink `indicator`; picked up by the blink stage of this same pass.
    pub fn request_blink(&mut self, indicator: Indicator) {
        self.events.insert(indicator.blink_event());
    }

    /// Keep the digits lit for another display hold.
    pub fn request_display(&mut self) {
        self.shared.set_flags(FlagMask::DISPLAY_ACTIVE);
        self.shared.rearm_countdown(self.hold_ticks);
    }

    pub fn show(&mut self, content: DisplayContent) {
        *self.display = content;
    }

    pub fn display(&self) -> DisplayContent {
        *self.display
    }

    /// Consume a pending button press.
    pub fn take_button_press(&mut self) -> bool {
        let taken = self.shared.take_flag(FlagMask::BUTTON_PRESSED);
        self.press_taken |= taken;
        taken
    }

    /// Whether this context consumed a press.
    pub fn press_taken(&self) -> bool {
        self.press_taken
    }

    pub fn button_pending(&self) -> bool {
        self.shared.snapshot().flags.contains(FlagMask::BUTTON_PRESSED)
    }

    /// Remaining display-hold ticks.
    pub fn countdown(&self) -> u16 {
        self.shared.snapshot().countdown
    }

    pub fn advertise_mode(&mut self, mode: ModeTag) {
        self.identity.advertise(mode);
    }

    pub fn beep(&mut self, tone: Tone) {
        self.tones.beep(tone);
    }

    pub fn rng(&mut self) -> &mut dyn RandomSource {
        self.rng
    }
}
