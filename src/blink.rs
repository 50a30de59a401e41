//! Indicator blink timer.
//!
//! Each indicator remembers the `jiffies` value at which it was last
//! activated.  Because `jiffies` is an 8-bit ring, "how long ago" is the
//! modular distance `min(forward, 256 - forward)`: a stamp taken just before
//! the counter wrapped must not look like it lies in the future.

use crate::app::ports::IndicatorPort;
use crate::events::EventMask;

/// One of the three indicator LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Indicator {
    Red = 0,
    Yellow = 1,
    Green = 2,
}

impl Indicator {
    pub const ALL: [Indicator; 3] = [Self::Red, Self::Yellow, Self::Green];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// The event bit that requests a blink of this indicator.
    pub const fn blink_event(self) -> EventMask {
        match self {
            Self::Red => EventMask::RED_BLINK,
            Self::Yellow => EventMask::YELLOW_BLINK,
            Self::Green => EventMask::GREEN_BLINK,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
        }
    }
}

/// Wraparound-tolerant distance between two 8-bit tick snapshots.
pub const fn elapsed(now: u8, stamp: u8) -> u8 {
    let forward = now.wrapping_sub(stamp);
    let backward = stamp.wrapping_sub(now);
    if forward < backward { forward } else { backward }
}

/// Per-indicator expiry decision for the given stamps.
pub fn expired(stamps: &[u8; 3], now: u8, duration: u8) -> [bool; 3] {
    stamps.map(|stamp| elapsed(now, stamp) > duration)
}

/// Blink bookkeeping owned by the dispatch loop.
#[derive(Debug, Clone)]
pub struct BlinkTimer {
    stamps: [u8; 3],
    lit: [bool; 3],
    duration: u8,
}

impl BlinkTimer {
    pub fn new(duration: u8) -> Self {
        Self {
            stamps: [0; 3],
            lit: [false; 3],
            duration,
        }
    }

    /// Turn `indicator` on and stamp it with `now`.
    pub fn arm(&mut self, indicator: Indicator, now: u8) {
        self.stamps[indicator.index()] = now;
        self.lit[indicator.index()] = true;
    }

    pub fn is_lit(&self, indicator: Indicator) -> bool {
        self.lit[indicator.index()]
    }

    pub fn stamp(&self, indicator: Indicator) -> u8 {
        self.stamps[indicator.index()]
    }

    /// Arm every indicator whose blink bit is in `events`, extinguish the
    /// ones whose blink has run out, and push exactly one on/off decision
    /// per indicator to `port`.
    pub fn apply(&mut self, events: EventMask, now: u8, port: &mut impl IndicatorPort) {
        for indicator in Indicator::ALL {
            if events.contains(indicator.blink_event()) {
                self.arm(indicator, now);
            }
        }

        let expired = expired(&self.stamps, now, self.duration);
        for indicator in Indicator::ALL {
            let i = indicator.index();
            if expired[i] {
                self.lit[i] = false;
            }
            port.set_indicator(indicator, self.lit[i]);
        }
    }
}
