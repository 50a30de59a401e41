//! Interrupt-shared scheduler registers.
//!
//! Two interrupt sources feed the main loop:
//! - the periodic tick (advances `jiffies`, counts the display hold down,
//!   raises TICK / SHORT_POLL / LONG_POLL)
//! - the button edge (raises DISPLAY_ACTIVE | BUTTON_PRESSED, re-arms the
//!   display hold)
//!
//! ```text
//! ┌─────────────┐     ┌────────────────────────┐     ┌──────────────┐
//! │ Tick ISR    │────▶│ SharedSchedulerState   │────▶│  Main Loop   │
//! │ Button ISR  │────▶│ events·flags·jiffies·  │     │  (drain once │
//! │ Mode handler│────▶│ countdown (crit. sect.)│     │   per pass)  │
//! └─────────────┘     └────────────────────────┘     └──────────────┘
//! ```
//!
//! Events are level-triggered-once: producers only ever set bits and the
//! main loop clears them in exactly one place, [`SharedSchedulerState::drain`].
//! Flags persist across passes until someone clears them explicitly.
//!
//! Every producer publishes its whole multi-field update inside one
//! critical section, and the consumer takes its snapshot and clears the
//! event bits inside one critical section, so no pass ever observes a
//! half-applied interrupt.

use core::cell::Cell;
use core::ops::{BitOr, BitOrAssign};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

macro_rules! register_mask {
    ($(#[$meta:meta])* $name:ident { $($(#[$bit_meta:meta])* $bit:ident = $value:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
        pub struct $name(u8);

        impl $name {
            $($(#[$bit_meta])* pub const $bit: Self = Self($value);)+

            /// Every defined bit.
            pub const ALL: Self = Self(0 $(| $value)+);

            pub const fn empty() -> Self {
                Self(0)
            }

            /// Build from raw bits, dropping undefined ones.
            pub const fn from_bits_truncate(bits: u8) -> Self {
                Self(bits & Self::ALL.0)
            }

            pub const fn bits(self) -> u8 {
                self.0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// True if **all** bits of `other` are set.
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// True if **any** bit of `other` is set.
            pub const fn intersects(self, other: Self) -> bool {
                self.0 & other.0 != 0
            }

            pub fn insert(&mut self, other: Self) {
                self.0 |= other.0;
            }

            pub fn remove(&mut self, other: Self) {
                self.0 &= !other.0;
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }
    };
}

register_mask! {
    /// Transient scheduler events, consumed by exactly one pass.
    EventMask {
        /// Every tick.
        TICK = 1 << 0,
        /// Every 16 ticks (`jiffies & 0x0f == 0`).
        SHORT_POLL = 1 << 1,
        /// Once per 256-tick lap.
        LONG_POLL = 1 << 2,
        RED_BLINK = 1 << 3,
        YELLOW_BLINK = 1 << 4,
        GREEN_BLINK = 1 << 5,
    }
}

register_mask! {
    /// Persistent UI flags, surviving across passes until cleared.
    FlagMask {
        /// Digits are multiplexed on every pass.
        DISPLAY_ACTIVE = 1 << 0,
        /// The buzzer is sounding.
        BEEP_ACTIVE = 1 << 1,
        /// A button edge has not been consumed by a mode yet.
        BUTTON_PRESSED = 1 << 2,
    }
}

/// Point-in-time copy of the shared registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Registers {
    pub events: EventMask,
    pub flags: FlagMask,
    /// 8-bit tick counter, wraps modulo 256.
    pub jiffies: u8,
    /// Display-hold down-counter, stops at 1.
    pub countdown: u16,
}

impl Registers {
    pub const fn zeroed() -> Self {
        Self {
            events: EventMask::empty(),
            flags: FlagMask::empty(),
            jiffies: 0,
            countdown: 0,
        }
    }

    /// The display hold has run out (countdown parked at 1 or never armed).
    pub const fn hold_expired(&self) -> bool {
        self.countdown <= 1
    }
}

/// When the tick source raises its poll events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPolicy {
    pub short_poll_mask: u8,
    pub long_poll_tick: u8,
}

impl TickPolicy {
    pub fn from_config(config: &crate::config::TokenConfig) -> Self {
        Self {
            short_poll_mask: config.short_poll_mask,
            long_poll_tick: config.long_poll_tick,
        }
    }

    /// Events raised by the tick that advanced the counter to `jiffies`.
    pub const fn events_for(&self, jiffies: u8) -> EventMask {
        let mut bits = EventMask::TICK.bits();
        if jiffies & self.short_poll_mask == 0 {
            bits |= EventMask::SHORT_POLL.bits();
        }
        if jiffies == self.long_poll_tick {
            bits |= EventMask::LONG_POLL.bits();
        }
        EventMask(bits)
    }
}

impl Default for TickPolicy {
    fn default() -> Self {
        Self {
            short_poll_mask: 0x0f,
            long_poll_tick: 132,
        }
    }
}

/// The registers shared between interrupt context and the main loop.
///
/// The firmware keeps one instance in a `static`; tests build their own.
pub struct SharedSchedulerState {
    regs: Mutex<CriticalSectionRawMutex, Cell<Registers>>,
}

impl Default for SharedSchedulerState {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedSchedulerState {
    pub const fn new() -> Self {
        Self {
            regs: Mutex::new(Cell::new(Registers::zeroed())),
        }
    }

    fn update<U>(&self, f: impl FnOnce(&mut Registers) -> U) -> U {
        self.regs.lock(|cell| {
            let mut regs = cell.get();
            let out = f(&mut regs);
            cell.set(regs);
            out
        })
    }

    // ── Interrupt-context producers ─────────────────────────────

    /// Periodic tick.  Safe to call from ISR context: bounded work, no
    /// allocation, one critical section.  Returns the events it raised.
    pub fn on_tick(&self, policy: &TickPolicy) -> EventMask {
        self.update(|r| {
            r.jiffies = r.jiffies.wrapping_add(1);
            if r.countdown > 1 {
                r.countdown -= 1;
            }
            let raised = policy.events_for(r.jiffies);
            r.events |= raised;
            raised
        })
    }

    /// Button high-to-low edge.  Repeated edges before the next pass only
    /// re-arm the hold; the flags are already set.
    pub fn on_button_edge(&self, hold_ticks: u16) {
        self.update(|r| {
            r.flags |= FlagMask::DISPLAY_ACTIVE | FlagMask::BUTTON_PRESSED;
            r.countdown = hold_ticks;
        });
    }

    /// Raise events from software (simulation ticks, tests).
    pub fn raise(&self, events: EventMask) {
        self.update(|r| r.events |= events);
    }

    // ── Main-loop consumers ─────────────────────────────────────

    /// Nothing pending and no flag raised: the loop may sleep.
    pub fn is_idle(&self) -> bool {
        self.regs.lock(|cell| {
            let r = cell.get();
            r.events.is_empty() && r.flags.is_empty()
        })
    }

    /// Take a snapshot and clear the event bits in the same critical
    /// section.  Events raised after this call stay pending for the next pass.
    pub fn drain(&self) -> Registers {
        self.update(|r| {
            let snapshot = *r;
            r.events = EventMask::empty();
            snapshot
        })
    }

    /// Read the registers without consuming anything.
    pub fn snapshot(&self) -> Registers {
        self.regs.lock(Cell::get)
    }

    pub fn set_flags(&self, flags: FlagMask) {
        self.update(|r| r.flags.insert(flags));
    }

    pub fn clear_flags(&self, flags: FlagMask) {
        self.update(|r| r.flags.remove(flags));
    }

    /// Test-and-clear a flag.  Returns whether any of its bits was set.
    pub fn take_flag(&self, flag: FlagMask) -> bool {
        self.update(|r| {
            let was_set = r.flags.intersects(flag);
            r.flags.remove(flag);
            was_set
        })
    }

    pub fn rearm_countdown(&self, ticks: u16) {
        self.update(|r| r.countdown = ticks);
    }

    /// Clear DISPLAY_ACTIVE if the hold countdown has run out.
    /// Returns `true` if the flag was cleared by this call.
    pub fn expire_display_hold(&self) -> bool {
        self.update(|r| {
            if r.flags.contains(FlagMask::DISPLAY_ACTIVE) && r.hold_expired() {
                r.flags.remove(FlagMask::DISPLAY_ACTIVE);
                true
            } else {
                false
            }
        })
    }
}
