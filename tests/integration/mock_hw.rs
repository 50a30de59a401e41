//! Mock hardware adapter for integration tests.
//!
//! Records every port call so tests can assert on the full output
//! history without touching real GPIO/LEDC registers.

use magique::app::events::AppEvent;
use magique::app::ports::{
    BatteryPort, DisplayPort, EventSink, IndicatorPort, PollHooks, RadioPort, RadioRole, TonePort,
};
use magique::blink::Indicator;
use magique::config::Tone;
use magique::modes::DeviceIdentity;
use embedded_hal::delay::DelayNs;

// ── Hardware call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HwCall {
    ShowDigit { nibble: u8, position: u8 },
    DecimalPoint(bool),
    CommitDisplay,
    SetIndicator { indicator: Indicator, on: bool },
    CommitIndicators,
    Beep(Tone),
    /// Digit latched for this many microseconds.
    Hold(u32),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<HwCall>,
    pub battery_level: u8,
    leds: [bool; 3],
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            battery_level: 0xc0,
            leds: [false; 3],
        }
    }

    pub fn with_battery(level: u8) -> Self {
        Self {
            battery_level: level,
            ..Self::new()
        }
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn is_lit(&self, indicator: Indicator) -> bool {
        self.leds[indicator.index()]
    }

    pub fn beeps(&self) -> Vec<Tone> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::Beep(t) => Some(*t),
                _ => None,
            })
            .collect()
    }

    /// `(position, nibble)` of every `show_digit` call, in order.
    pub fn digits(&self) -> Vec<(u8, u8)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::ShowDigit { nibble, position } => Some((*position, *nibble)),
                _ => None,
            })
            .collect()
    }

    /// Indicator writes per colour.
    pub fn indicator_writes(&self, indicator: Indicator) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HwCall::SetIndicator { indicator: i, .. } if *i == indicator))
            .count()
    }

    /// Microseconds of every digit hold, in order.
    pub fn holds(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::Hold(us) => Some(*us),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &HwCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayPort for MockHardware {
    fn show_digit(&mut self, nibble: u8, position: u8) {
        self.calls.push(HwCall::ShowDigit { nibble, position });
    }

    fn set_decimal_point(&mut self, on: bool) {
        self.calls.push(HwCall::DecimalPoint(on));
    }

    fn commit_display(&mut self) {
        self.calls.push(HwCall::CommitDisplay);
    }
}

impl DelayNs for MockHardware {
    fn delay_ns(&mut self, ns: u32) {
        self.calls.push(HwCall::Hold(ns / 1_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.calls.push(HwCall::Hold(us));
    }
}

impl IndicatorPort for MockHardware {
    fn set_indicator(&mut self, indicator: Indicator, on: bool) {
        self.leds[indicator.index()] = on;
        self.calls.push(HwCall::SetIndicator { indicator, on });
    }

    fn commit_indicators(&mut self) {
        self.calls.push(HwCall::CommitIndicators);
    }
}

impl TonePort for MockHardware {
    fn beep(&mut self, tone: Tone) {
        self.calls.push(HwCall::Beep(tone));
    }
}

impl BatteryPort for MockHardware {
    fn read_level(&mut self) -> u8 {
        self.battery_level
    }
}

// ── MockRadio ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioCall {
    Init(RadioRole),
    Transmit(Vec<u8>),
    PowerDown,
}

#[derive(Default)]
pub struct MockRadio {
    pub calls: Vec<RadioCall>,
}

impl RadioPort for MockRadio {
    fn init(&mut self, role: RadioRole) {
        self.calls.push(RadioCall::Init(role));
    }

    fn transmit(&mut self, payload: &[u8]) {
        self.calls.push(RadioCall::Transmit(payload.to_vec()));
    }

    fn power_down(&mut self) {
        self.calls.push(RadioCall::PowerDown);
    }
}

// ── MockDelay ─────────────────────────────────────────────────

/// Records requested waits instead of sleeping.
#[derive(Default)]
pub struct MockDelay {
    pub waits_ms: Vec<u32>,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waits_ms.push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.push(ms);
    }
}

// ── Event sink / poll hooks ───────────────────────────────────

/// Event sink that records everything.
#[derive(Default)]
pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

/// Poll hooks that count their invocations.
#[derive(Default)]
pub struct CountingHooks {
    pub short_polls: usize,
    pub long_polls: usize,
    pub last_id: Option<u8>,
}

impl PollHooks for CountingHooks {
    fn on_short_poll(&mut self, identity: &DeviceIdentity) {
        self.short_polls += 1;
        self.last_id = Some(identity.id());
    }

    fn on_long_poll(&mut self, identity: &DeviceIdentity) {
        self.long_polls += 1;
        self.last_id = Some(identity.id());
    }
}
