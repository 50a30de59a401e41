//! Outbound application events.
//!
//! The dispatcher and the boot sequence emit these through the
//! [`EventSink`](super::ports::EventSink) port.

use crate::modes::ModeTag;

/// Structured events emitted by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Boot finished; the dispatch loop is about to start.
    Started { id: u8, mode_adv: ModeTag, battery_level: u8 },

    /// The boot self-test has pushed its indicator pattern.
    SelfTestDone,

    /// The mode state machine committed a transition.
    ModeChanged { from: ModeTag, to: ModeTag },

    /// The battery is below the configured threshold; the token is
    /// about to enter terminal sleep.
    LowBattery { level: u8, threshold: u8 },
}
