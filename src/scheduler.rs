//! Cooperative dispatch loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Interrupt producers                       │
//! │        ┌───────────┐                 ┌───────────┐           │
//! │        │ Tick ISR  │                 │ Button ISR│           │
//! │        └─────┬─────┘                 └─────┬─────┘           │
//! │              ▼                             ▼                 │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              SharedSchedulerState                      │  │
//! │  └───────────────────────┬────────────────────────────────┘  │
//! │                          │ drain (once per pass)             │
//! │                          ▼                                   │
//! │   1 mode transition ─▶ 2 tick dispatch ─▶ 3 blink timer      │
//! │   ─▶ 4 poll hooks ─▶ 5 hold expiry ─▶ 6 render               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A pass is either **Idle** (nothing pending, no side effects; the caller
//! sleeps) or **Active**.  Event bits are cleared in exactly one place: the
//! drain at the top of an active pass.  Anything an interrupt raises after
//! that drain is seen by the next pass.

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::{DisplayPort, EventSink, IndicatorPort, PollHooks, TonePort, WakePort};
use crate::blink::BlinkTimer;
use crate::config::TokenConfig;
use crate::events::{EventMask, FlagMask, SharedSchedulerState};
use crate::modes::{DeviceIdentity, DisplayContent, ModeContext, ModeDescriptor, ModeMachine, ModeTag};
use crate::render;
use crate::rng::RandomSource;

// ═══════════════════════════════════════════════════════════════
//  Pass outcome / statistics
// ═══════════════════════════════════════════════════════════════

/// What a single call to [`Dispatcher::run_pass`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Nothing pending.  No port was touched.
    Idle,
    /// Work was drained and processed.
    Active {
        /// Events drained at the top of the pass, plus blink requests made
        /// by the mode handler during it.
        events: EventMask,
        /// Mode entered by this pass, if any.
        entered: Option<ModeTag>,
    },
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub active_passes: u32,
    pub idle_passes: u32,
    pub transitions: u32,
    /// Button presses no mode consumed in the pass that saw them.
    pub dropped_presses: u32,
}

// ═══════════════════════════════════════════════════════════════
//  Dispatcher
// ═══════════════════════════════════════════════════════════════

/// The foreground loop.  Owns everything the interrupts do not touch:
/// the identity, the mode table and payload state, the blink timestamps,
/// the display content and the random source.
pub struct Dispatcher<'s, S, R> {
    shared: &'s SharedSchedulerState,
    config: TokenConfig,
    identity: DeviceIdentity,
    modes: ModeMachine<S>,
    payload: S,
    blink: BlinkTimer,
    display: DisplayContent,
    rng: R,
    stats: DispatchStats,
}

impl<'s, S, R: RandomSource> Dispatcher<'s, S, R> {
    pub fn new(
        shared: &'s SharedSchedulerState,
        config: TokenConfig,
        identity: DeviceIdentity,
        table: [ModeDescriptor<S>; ModeTag::COUNT],
        payload: S,
        rng: R,
    ) -> Self {
        let blink = BlinkTimer::new(config.blink_ticks);
        Self {
            shared,
            config,
            identity,
            modes: ModeMachine::new(table),
            payload,
            blink,
            display: DisplayContent::blank(),
            rng,
            stats: DispatchStats::default(),
        }
    }

    /// Run one pass of the loop.
    pub fn run_pass<H, P, E>(&mut self, hw: &mut H, hooks: &mut P, sink: &mut E) -> PassOutcome
    where
        H: DisplayPort + IndicatorPort + TonePort + DelayNs,
        P: PollHooks + ?Sized,
        E: EventSink + ?Sized,
    {
        if self.shared.is_idle() {
            self.stats.idle_passes = self.stats.idle_passes.wrapping_add(1);
            return PassOutcome::Idle;
        }
        self.stats.active_passes = self.stats.active_passes.wrapping_add(1);

        let regs = self.shared.drain();
        let mut events = regs.events;
        let now = regs.jiffies;
        let hold = self.config.display_hold_ticks;

        // ── 1. Mode transition ──────────────────────────────────
        let from = self.identity.mode();
        let entered = self.modes.check_transition(&mut self.identity);
        if let Some(to) = entered {
            self.stats.transitions = self.stats.transitions.wrapping_add(1);
            self.display = DisplayContent::from_byte(self.identity.id());
            self.shared.set_flags(FlagMask::DISPLAY_ACTIVE);
            self.shared.rearm_countdown(hold);
            hw.beep(self.config.ack_tone);
            sink.emit(&AppEvent::ModeChanged { from, to });

            let mut ctx = ModeContext::new(
                &mut self.identity,
                now,
                &mut events,
                self.shared,
                &mut self.display,
                hw,
                &mut self.rng,
                hold,
            );
            self.modes.enter(to, &mut self.payload, &mut ctx);
        }

        // ── 2. Tick dispatch ────────────────────────────────────
        if events.contains(EventMask::TICK) {
            let mode = self.identity.mode();
            let mut ctx = ModeContext::new(
                &mut self.identity,
                now,
                &mut events,
                self.shared,
                &mut self.display,
                hw,
                &mut self.rng,
                hold,
            );
            self.modes.dispatch_tick(mode, &mut self.payload, &mut ctx);
            let press_taken = ctx.press_taken();

            // A press nobody consumed would keep the loop awake forever.  An
            // edge that lands after the handler took the drained press is
            // left for the next pass.
            if regs.flags.contains(FlagMask::BUTTON_PRESSED)
                && !press_taken
                && self.shared.take_flag(FlagMask::BUTTON_PRESSED)
            {
                debug!("Button press not consumed by {}", mode.name());
                self.stats.dropped_presses = self.stats.dropped_presses.wrapping_add(1);
            }
        }

        // ── 3. Blink timer ──────────────────────────────────────
        self.blink.apply(events, now, hw);

        // ── 4. Poll hooks ───────────────────────────────────────
        if events.contains(EventMask::SHORT_POLL) {
            hooks.on_short_poll(&self.identity);
        }
        if events.contains(EventMask::LONG_POLL) {
            hooks.on_long_poll(&self.identity);
        }

        // ── 5. Display hold expiry ──────────────────────────────
        if self.config.clear_display_on_hold_expiry && self.shared.expire_display_hold() {
            debug!("Display hold expired");
        }

        // ── 6. Render ───────────────────────────────────────────
        if self.shared.snapshot().flags.contains(FlagMask::DISPLAY_ACTIVE) {
            let steps = render::plan(self.display);
            render::play(&steps, hw, self.config.digit_hold_us);
        } else {
            hw.commit_indicators();
        }

        PassOutcome::Active { events, entered }
    }

    /// Run passes forever, sleeping on `wake` whenever a pass finds
    /// nothing to do.
    pub fn run<H, W, P, E>(&mut self, hw: &mut H, wake: &mut W, hooks: &mut P, sink: &mut E) -> !
    where
        H: DisplayPort + IndicatorPort + TonePort + DelayNs,
        W: WakePort + ?Sized,
        P: PollHooks + ?Sized,
        E: EventSink + ?Sized,
    {
        info!(
            "Dispatcher running: {} mode_adv={}",
            self.identity.label(),
            self.identity.mode_adv().name()
        );
        loop {
            if self.run_pass(hw, hooks, sink) == PassOutcome::Idle {
                wake.wait_for_interrupt();
            }
        }
    }

    // ── Accessors ───────────────────────────────────────────────

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Foreground access to the identity, e.g. to advertise a mode from
    /// outside a payload.
    pub fn identity_mut(&mut self) -> &mut DeviceIdentity {
        &mut self.identity
    }

    pub fn display(&self) -> DisplayContent {
        self.display
    }

    pub fn blink(&self) -> &BlinkTimer {
        &self.blink
    }

    pub fn payload(&self) -> &S {
        &self.payload
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }
}
