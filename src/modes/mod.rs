//! Mode state machine.
//!
//! Function-pointer table, one row per game mode:
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │  ModeTable<S>                                    │
//! │  ┌─────────────┬──────────────────┬────────────┐ │
//! │  │ ModeTag     │ on_enter         │ process_tick│ │
//! │  ├─────────────┼──────────────────┼────────────┤ │
//! │  │ Capture     │ fn(&mut S, ctx)  │ fn(..)     │ │
//! │  │ CaptureFlag │ fn(&mut S, ctx)  │ fn(..)     │ │
//! │  │ Source      │ -                │ fn(..)     │ │
//! │  │ Stone       │ -                │ fn(..)     │ │
//! │  └─────────────┴──────────────────┴────────────┘ │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Unlike a guarded FSM, transitions are requested from the outside: a
//! payload (or the boot sequence) writes `mode_adv` on the
//! [`DeviceIdentity`], and at the start of the next active pass the
//! dispatcher asks [`ModeMachine::check_transition`] whether to commit it.
//! No guard can veto an advertised transition.

pub mod context;
pub mod payloads;

pub use context::{DeviceIdentity, DisplayContent, ModeContext};

use log::info;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Mode identity
// ---------------------------------------------------------------------------

/// The game behaviours a token can run.  `None` doubles as "no request"
/// in `mode_adv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ModeTag {
    #[default]
    None = 0,
    /// Flag-capture game.
    Capture = 1,
    /// Flag-capture game, flag-carrier variant.
    CaptureFlag = 2,
    /// Magique source: beacons presence.
    Source = 3,
    /// Magique stone: reacts to presses.
    Stone = 4,
}

impl ModeTag {
    /// Number of runnable (non-`None`) modes; sizes the mode table.
    pub const COUNT: usize = 4;

    pub const RUNNABLE: [ModeTag; Self::COUNT] =
        [Self::Capture, Self::CaptureFlag, Self::Source, Self::Stone];

    pub const fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::None),
            1 => Some(Self::Capture),
            2 => Some(Self::CaptureFlag),
            3 => Some(Self::Source),
            4 => Some(Self::Stone),
            _ => None,
        }
    }

    /// Row in the mode table, `None` for [`ModeTag::None`].
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::None => None,
            other => Some(other as usize - 1),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Capture => "capture",
            Self::CaptureFlag => "capture-flag",
            Self::Source => "source",
            Self::Stone => "stone",
        }
    }
}

// ---------------------------------------------------------------------------
// Descriptor table
// ---------------------------------------------------------------------------

/// One-time initializer run when a mode is entered.
pub type EnterFn<S> = fn(&mut S, &mut ModeContext<'_>);

/// Per-tick handler, called once per pass carrying a TICK event.
pub type TickFn<S> = fn(&mut S, &mut ModeContext<'_>);

/// Static descriptor for one mode.  `S` is the payload state the
/// application threads through every handler.
pub struct ModeDescriptor<S> {
    pub tag: ModeTag,
    pub name: &'static str,
    pub on_enter: Option<EnterFn<S>>,
    pub process_tick: TickFn<S>,
}

/// The mode table plus transition bookkeeping.
pub struct ModeMachine<S> {
    /// Indexed by [`ModeTag::index`].
    table: [ModeDescriptor<S>; ModeTag::COUNT],
    transitions: u32,
}

impl<S> ModeMachine<S> {
    pub fn new(table: [ModeDescriptor<S>; ModeTag::COUNT]) -> Self {
        for (i, row) in table.iter().enumerate() {
            debug_assert_eq!(row.tag.index(), Some(i), "mode table out of order at {i}");
        }
        Self {
            table,
            transitions: 0,
        }
    }

    /// Commit a pending transition, if any.
    ///
    /// Fires when `mode_adv` names a mode other than the running one, or
    /// when a re-entry was forced.  On commit `mode` takes the new value and
    /// `mode_adv` is cleared.  Advertising the running mode leaves the
    /// identity untouched.  Returns the entered mode.
    pub fn check_transition(&mut self, identity: &mut DeviceIdentity) -> Option<ModeTag> {
        let from = identity.mode();
        let adv = identity.mode_adv();

        let target = if adv != ModeTag::None && adv != from {
            adv
        } else if identity.reenter_requested() {
            identity.clear_reenter();
            if from == ModeTag::None {
                return None;
            }
            from
        } else {
            return None;
        };

        identity.commit_mode(target);
        identity.clear_advertisement();
        identity.clear_reenter();
        self.transitions = self.transitions.wrapping_add(1);
        info!("Mode transition: {} -> {}", from.name(), target.name());
        Some(target)
    }

    /// Run the initializer of `mode`, if it declares one.
    pub fn enter(&self, mode: ModeTag, state: &mut S, ctx: &mut ModeContext<'_>) {
        if let Some(enter) = self.descriptor(mode).and_then(|d| d.on_enter) {
            enter(state, ctx);
        }
    }

    /// Run the per-tick handler of `mode`.  `ModeTag::None` has none.
    pub fn dispatch_tick(&self, mode: ModeTag, state: &mut S, ctx: &mut ModeContext<'_>) {
        if let Some(d) = self.descriptor(mode) {
            (d.process_tick)(state, ctx);
        }
    }

    pub fn descriptor(&self, mode: ModeTag) -> Option<&ModeDescriptor<S>> {
        mode.index().map(|i| &self.table[i])
    }

    /// Committed transitions since construction.
    pub fn transitions(&self) -> u32 {
        self.transitions
    }
}
