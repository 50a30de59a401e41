//! Stock mode payloads and table builder.
//!
//! Each payload is a pair of plain `fn` pointers over a shared
//! [`GameState`].  The bodies are deliberately small: enough for a token
//! to run end-to-end and show that it is alive in every mode.
//!
//! ```text
//!  Capture      press ──▶ count++ ──▶ digits, yellow blink
//!  CaptureFlag  press ──▶ count++ ──▶ digits + dot, red blink
//!  Source       every 64 ticks ──▶ green blink;  press ──▶ show id
//!  Stone        press ──▶ random indicator blink
//! ```

use super::context::{DisplayContent, ModeContext};
use super::{ModeDescriptor, ModeTag};
use crate::blink::Indicator;
use log::debug;

/// Payload state shared by the stock modes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    /// Presses counted since the capture game was (re-)entered.
    pub captures: u8,
    /// The token carries the flag (capture-flag variant).
    pub carrying_flag: bool,
    /// Presses seen by the stone.
    pub stone_hits: u16,
}

/// Source mode beacons when `jiffies` is a multiple of this.
pub const SOURCE_BEACON_MASK: u8 = 0x3f;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the stock mode table.  Called once at startup.
pub fn build_mode_table() -> [ModeDescriptor<GameState>; ModeTag::COUNT] {
    [
        // Index 0: Capture
        ModeDescriptor {
            tag: ModeTag::Capture,
            name: "Capture",
            on_enter: Some(capture_enter),
            process_tick: capture_tick,
        },
        // Index 1: CaptureFlag
        ModeDescriptor {
            tag: ModeTag::CaptureFlag,
            name: "CaptureFlag",
            on_enter: Some(capture_flag_enter),
            process_tick: capture_flag_tick,
        },
        // Index 2: Source
        ModeDescriptor {
            tag: ModeTag::Source,
            name: "Source",
            on_enter: None,
            process_tick: source_tick,
        },
        // Index 3: Stone
        ModeDescriptor {
            tag: ModeTag::Stone,
            name: "Stone",
            on_enter: None,
            process_tick: stone_tick,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Capture game
// ═══════════════════════════════════════════════════════════════════════════

fn capture_enter(state: &mut GameState, _ctx: &mut ModeContext<'_>) {
    state.captures = 0;
    state.carrying_flag = false;
}

fn capture_tick(state: &mut GameState, ctx: &mut ModeContext<'_>) {
    if !ctx.take_button_press() {
        return;
    }
    state.captures = state.captures.saturating_add(1);
    debug!("Capture: {} presses", state.captures);
    ctx.show(DisplayContent::decimal(state.captures));
    ctx.request_display();
    ctx.request_blink(Indicator::Yellow);
}

fn capture_flag_enter(state: &mut GameState, ctx: &mut ModeContext<'_>) {
    capture_enter(state, ctx);
    state.carrying_flag = true;
}

fn capture_flag_tick(state: &mut GameState, ctx: &mut ModeContext<'_>) {
    if !ctx.take_button_press() {
        return;
    }
    state.captures = state.captures.saturating_add(1);
    ctx.show(DisplayContent::decimal(state.captures).with_dot(1, state.carrying_flag));
    ctx.request_display();
    ctx.request_blink(Indicator::Red);
}

// ═══════════════════════════════════════════════════════════════════════════
//  Source
// ═══════════════════════════════════════════════════════════════════════════

fn source_tick(_state: &mut GameState, ctx: &mut ModeContext<'_>) {
    if ctx.now & SOURCE_BEACON_MASK == 0 {
        ctx.request_blink(Indicator::Green);
    }
    if ctx.take_button_press() {
        let id = ctx.identity.id();
        ctx.show(DisplayContent::from_byte(id));
        ctx.request_display();
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Stone
// ═══════════════════════════════════════════════════════════════════════════

fn stone_tick(state: &mut GameState, ctx: &mut ModeContext<'_>) {
    if !ctx.take_button_press() {
        return;
    }
    state.stone_hits = state.stone_hits.wrapping_add(1);
    let pick = ctx.rng().below(Indicator::ALL.len() as u16) as usize;
    ctx.request_blink(Indicator::ALL[pick]);
}
