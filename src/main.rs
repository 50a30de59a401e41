//! Magique firmware entry point
//!
//! Tick-driven cooperative scheduler with a mode state machine.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter           LogEventSink      BeaconHooks       │
//! │  (Display+Indicator+       (EventSink)       (PollHooks over   │
//! │   Tone+Battery)                               LogRadio)        │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            Dispatcher (pure logic)                     │    │
//! │  │  ModeMachine · BlinkTimer · render                     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Tick timer · Button ISR ──▶ SharedSchedulerState ──▶ wake     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{error, info, warn};

use magique::adapters::device_id;
use magique::adapters::hardware::{HardwareAdapter, board_register};
use magique::adapters::log_sink::LogEventSink;
use magique::adapters::radio::{BeaconHooks, LogRadio};
use magique::app::boot::boot;
use magique::config::TokenConfig;
use magique::drivers::tone::ToneDriver;
use magique::drivers::wake::TaskWake;
use magique::drivers::{button, hw_init, hw_timer};
use magique::events::{SharedSchedulerState, TickPolicy};
use magique::modes::payloads::{GameState, build_mode_table};
use magique::power::{self, PowerOutcome};
use magique::rng::Lcg;
use magique::scheduler::Dispatcher;

/// Registers shared between the tick timer, the button ISR and the loop.
static SHARED: SharedSchedulerState = SharedSchedulerState::new();

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Magique v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = TokenConfig::default();
    config.validate()?;

    // ── 2. Hardware: outputs, ADC, buzzer, tick, button ───────
    if let Err(e) = hw_init::init_peripherals() {
        // Peripheral init failure is critical: log and halt.
        error!("HAL init failed: {}, halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // The wake notification must exist before any producer can fire.
    let mut wake = TaskWake::install()?;
    button::install(&SHARED, config.display_hold_ticks)?;
    hw_timer::start_tick_timer(&SHARED, TickPolicy::from_config(&config), config.tick_period_us)?;
    if let Err(e) = hw_init::init_isr_service() {
        warn!("ISR service init failed: {}, continuing without the button", e);
    }

    let mut hw = HardwareAdapter::new(board_register(), ToneDriver::new(&SHARED));
    let mut radio = LogRadio::new();
    let mut sink = LogEventSink::new();
    let mut delay = esp_idf_hal::delay::FreeRtos;

    // ── 3. Boot sequence ──────────────────────────────────────
    let id = device_id::resolve_id(config.device_id);
    let outcome = boot(&config, id, &mut hw, &mut radio, &mut delay, &mut sink)?;
    if outcome.power == PowerOutcome::Shutdown {
        hw_timer::stop_tick_timer();
        power::enter_terminal_sleep();
    }

    // ── 4. Dispatch loop ──────────────────────────────────────
    let seed = u16::from(id) << 8 | u16::from(outcome.identity.battery_level());
    let mut dispatcher = Dispatcher::new(
        &SHARED,
        config,
        outcome.identity,
        build_mode_table(),
        GameState::default(),
        Lcg::with_seed(seed),
    );
    let mut hooks = BeaconHooks::new(radio);

    dispatcher.run(&mut hw, &mut wake, &mut hooks, &mut sink)
}
