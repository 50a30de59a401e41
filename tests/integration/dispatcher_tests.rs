//! Integration tests for the dispatch loop.
//!
//! Drives [`Dispatcher::run_pass`] against the recording mocks, with the
//! interrupt producers played by direct calls on a local
//! [`SharedSchedulerState`].

use magique::adapters::radio::BeaconHooks;
use magique::app::events::AppEvent;
use magique::app::ports::NoHooks;
use magique::blink::Indicator;
use magique::config::TokenConfig;
use magique::events::{EventMask, FlagMask, SharedSchedulerState, TickPolicy};
use magique::modes::payloads::{GameState, build_mode_table};
use magique::modes::{DeviceIdentity, DisplayContent, ModeContext, ModeDescriptor, ModeTag};
use magique::rng::Lcg;
use magique::scheduler::{Dispatcher, PassOutcome};

use crate::mock_hw::{CountingHooks, HwCall, LogSink, MockHardware, MockRadio, RadioCall};

const ID: u8 = 0x42;

fn dispatcher_with(
    shared: &SharedSchedulerState,
    config: TokenConfig,
    mode: ModeTag,
) -> Dispatcher<'_, GameState, Lcg> {
    Dispatcher::new(
        shared,
        config,
        DeviceIdentity::new(ID, mode),
        build_mode_table(),
        GameState::default(),
        Lcg::with_seed(0x1234),
    )
}

fn dispatcher(shared: &SharedSchedulerState, mode: ModeTag) -> Dispatcher<'_, GameState, Lcg> {
    dispatcher_with(shared, TokenConfig::default(), mode)
}

/// One tick interrupt followed by one pass.
fn tick_pass(
    shared: &SharedSchedulerState,
    d: &mut Dispatcher<'_, GameState, Lcg>,
    hw: &mut MockHardware,
    sink: &mut LogSink,
) -> PassOutcome {
    shared.on_tick(&TickPolicy::default());
    d.run_pass(hw, &mut NoHooks, sink)
}

// ── Boot transition ───────────────────────────────────────────

#[test]
fn first_pass_commits_boot_mode() {
    let shared = SharedSchedulerState::new();
    let mut d = dispatcher(&shared, ModeTag::Capture);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();

    let out = tick_pass(&shared, &mut d, &mut hw, &mut sink);

    assert!(matches!(
        out,
        PassOutcome::Active {
            entered: Some(ModeTag::Capture),
            ..
        }
    ));
    assert_eq!(d.identity().mode(), ModeTag::Capture);
    assert_eq!(d.identity().mode_adv(), ModeTag::None);
    assert_eq!(hw.beeps(), vec![TokenConfig::default().ack_tone]);
    assert_eq!(hw.digits(), vec![(0, 2), (1, 4), (2, 0)]);
    assert_eq!(
        sink.events,
        vec![AppEvent::ModeChanged {
            from: ModeTag::None,
            to: ModeTag::Capture
        }]
    );
    assert!(shared.snapshot().flags.contains(FlagMask::DISPLAY_ACTIVE));
    assert_eq!(d.stats().transitions, 1);
}

#[test]
fn steady_mode_does_not_retrigger_entry() {
    let shared = SharedSchedulerState::new();
    let mut d = dispatcher(&shared, ModeTag::Source);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();

    for _ in 0..20 {
        tick_pass(&shared, &mut d, &mut hw, &mut sink);
    }
    assert_eq!(hw.beeps().len(), 1);
    assert_eq!(sink.events.len(), 1);
    assert_eq!(d.stats().transitions, 1);
}

// ── Idle ──────────────────────────────────────────────────────

#[test]
fn idle_pass_has_no_side_effects() {
    let shared = SharedSchedulerState::new();
    let mut d = dispatcher(&shared, ModeTag::Capture);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    let mut hooks = CountingHooks::default();

    assert_eq!(d.run_pass(&mut hw, &mut hooks, &mut sink), PassOutcome::Idle);
    assert!(hw.calls.is_empty());
    assert!(sink.events.is_empty());
    assert_eq!(hooks.short_polls + hooks.long_polls, 0);
    // The advertised mode waits for the first active pass.
    assert_eq!(d.identity().mode(), ModeTag::None);
    assert_eq!(d.identity().mode_adv(), ModeTag::Capture);
}

#[test]
fn loop_goes_idle_after_events_drain_and_hold_expires() {
    let shared = SharedSchedulerState::new();
    let config = TokenConfig {
        display_hold_ticks: 4,
        ..TokenConfig::default()
    };
    let mut d = dispatcher_with(&shared, config, ModeTag::Source);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();

    for _ in 0..4 {
        tick_pass(&shared, &mut d, &mut hw, &mut sink);
    }
    assert!(!shared.snapshot().flags.contains(FlagMask::DISPLAY_ACTIVE));
    assert_eq!(d.run_pass(&mut hw, &mut NoHooks, &mut sink), PassOutcome::Idle);
}

// ── Button ────────────────────────────────────────────────────

#[test]
fn bounced_press_counts_once() {
    let shared = SharedSchedulerState::new();
    let mut d = dispatcher(&shared, ModeTag::Capture);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    tick_pass(&shared, &mut d, &mut hw, &mut sink);

    shared.rearm_countdown(3);
    shared.on_button_edge(1000);
    shared.on_button_edge(1000);
    let regs = shared.snapshot();
    assert!(regs.flags.contains(FlagMask::DISPLAY_ACTIVE | FlagMask::BUTTON_PRESSED));
    assert_eq!(regs.countdown, 1000);

    tick_pass(&shared, &mut d, &mut hw, &mut sink);
    assert_eq!(d.payload().captures, 1);
    assert_eq!(d.display(), DisplayContent::decimal(1));
    assert!(!shared.snapshot().flags.contains(FlagMask::BUTTON_PRESSED));
}

#[test]
fn press_without_tick_waits_for_tick_dispatch() {
    let shared = SharedSchedulerState::new();
    let mut d = dispatcher(&shared, ModeTag::Source);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    tick_pass(&shared, &mut d, &mut hw, &mut sink);

    // A press with no tick wakes the loop but no handler runs; the
    // flag must survive until the next tick dispatch consumes it.
    shared.on_button_edge(1000);
    assert!(matches!(
        d.run_pass(&mut hw, &mut NoHooks, &mut sink),
        PassOutcome::Active { .. }
    ));
    assert!(shared.snapshot().flags.contains(FlagMask::BUTTON_PRESSED));

    tick_pass(&shared, &mut d, &mut hw, &mut sink);
    assert!(!shared.snapshot().flags.contains(FlagMask::BUTTON_PRESSED));
    assert_eq!(d.stats().dropped_presses, 0);
    assert_eq!(d.display(), DisplayContent::from_byte(ID));
}

/// Edge source for [`press_landing_mid_pass_survives_to_next_tick`]; the
/// tick handler reaches it the way the button interrupt would.
static MID_PASS: SharedSchedulerState = SharedSchedulerState::new();

/// Takes the press, then a second edge lands before the pass ends.
fn take_then_edge(presses: &mut u32, ctx: &mut ModeContext<'_>) {
    if ctx.take_button_press() {
        *presses += 1;
        MID_PASS.on_button_edge(1000);
    }
}

fn counting_row(tag: ModeTag) -> ModeDescriptor<u32> {
    ModeDescriptor {
        tag,
        name: tag.name(),
        on_enter: None,
        process_tick: take_then_edge,
    }
}

#[test]
fn press_landing_mid_pass_survives_to_next_tick() {
    let mut d = Dispatcher::new(
        &MID_PASS,
        TokenConfig::default(),
        DeviceIdentity::new(ID, ModeTag::Capture),
        [
            counting_row(ModeTag::Capture),
            counting_row(ModeTag::CaptureFlag),
            counting_row(ModeTag::Source),
            counting_row(ModeTag::Stone),
        ],
        0u32,
        Lcg::with_seed(0x1234),
    );
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    let policy = TickPolicy::default();

    MID_PASS.on_tick(&policy);
    d.run_pass(&mut hw, &mut NoHooks, &mut sink);

    MID_PASS.on_button_edge(1000);
    MID_PASS.on_tick(&policy);
    d.run_pass(&mut hw, &mut NoHooks, &mut sink);
    assert_eq!(*d.payload(), 1);
    assert!(MID_PASS.snapshot().flags.contains(FlagMask::BUTTON_PRESSED));
    assert_eq!(d.stats().dropped_presses, 0);

    // The late edge is the next tick's press.
    MID_PASS.on_tick(&policy);
    d.run_pass(&mut hw, &mut NoHooks, &mut sink);
    assert_eq!(*d.payload(), 2);
    assert_eq!(d.stats().dropped_presses, 0);
}

// ── Blink timer ───────────────────────────────────────────────

#[test]
fn blink_lasts_blink_ticks_then_goes_out() {
    let shared = SharedSchedulerState::new();
    let mut d = dispatcher(&shared, ModeTag::Capture);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    tick_pass(&shared, &mut d, &mut hw, &mut sink);

    shared.on_button_edge(1000);
    tick_pass(&shared, &mut d, &mut hw, &mut sink);
    assert!(hw.is_lit(Indicator::Yellow));

    for _ in 0..8 {
        tick_pass(&shared, &mut d, &mut hw, &mut sink);
        assert!(hw.is_lit(Indicator::Yellow));
    }
    tick_pass(&shared, &mut d, &mut hw, &mut sink);
    assert!(!hw.is_lit(Indicator::Yellow));
    assert!(!d.blink().is_lit(Indicator::Yellow));
}

#[test]
fn blink_stamped_before_counter_wrap_stays_lit() {
    let shared = SharedSchedulerState::new();
    let policy = TickPolicy::default();
    let mut d = dispatcher(&shared, ModeTag::Capture);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    tick_pass(&shared, &mut d, &mut hw, &mut sink);

    // Bring jiffies to 250 without intermediate passes.
    for _ in 0..249 {
        shared.on_tick(&policy);
    }
    shared.on_button_edge(1000);
    d.run_pass(&mut hw, &mut NoHooks, &mut sink);
    assert_eq!(d.blink().stamp(Indicator::Yellow), 250);

    // 250 -> 2 is eight ticks across the wrap.
    for _ in 0..8 {
        shared.on_tick(&policy);
    }
    d.run_pass(&mut hw, &mut NoHooks, &mut sink);
    assert_eq!(shared.snapshot().jiffies, 2);
    assert!(hw.is_lit(Indicator::Yellow));

    tick_pass(&shared, &mut d, &mut hw, &mut sink);
    assert!(!hw.is_lit(Indicator::Yellow));
}

#[test]
fn every_active_pass_writes_each_indicator_once() {
    let shared = SharedSchedulerState::new();
    let mut d = dispatcher(&shared, ModeTag::Stone);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();

    for _ in 0..10 {
        hw.clear();
        shared.on_button_edge(1000);
        tick_pass(&shared, &mut d, &mut hw, &mut sink);
        for indicator in Indicator::ALL {
            assert_eq!(hw.indicator_writes(indicator), 1, "{}", indicator.name());
        }
    }
}

// ── Mode transitions ──────────────────────────────────────────

#[test]
fn advertised_mode_switch_runs_entry_and_acks() {
    let shared = SharedSchedulerState::new();
    let mut d = dispatcher(&shared, ModeTag::Capture);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    tick_pass(&shared, &mut d, &mut hw, &mut sink);

    d.identity_mut().advertise(ModeTag::CaptureFlag);
    let out = tick_pass(&shared, &mut d, &mut hw, &mut sink);

    assert!(matches!(
        out,
        PassOutcome::Active {
            entered: Some(ModeTag::CaptureFlag),
            ..
        }
    ));
    assert!(d.payload().carrying_flag);
    assert_eq!(hw.beeps().len(), 2);
    assert_eq!(
        sink.events.last(),
        Some(&AppEvent::ModeChanged {
            from: ModeTag::Capture,
            to: ModeTag::CaptureFlag
        })
    );
    assert_eq!(d.stats().transitions, 2);
}

#[test]
fn forced_reenter_restarts_current_mode() {
    let shared = SharedSchedulerState::new();
    let mut d = dispatcher(&shared, ModeTag::Capture);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    tick_pass(&shared, &mut d, &mut hw, &mut sink);

    shared.on_button_edge(1000);
    tick_pass(&shared, &mut d, &mut hw, &mut sink);
    assert_eq!(d.payload().captures, 1);

    d.identity_mut().force_reenter();
    let out = tick_pass(&shared, &mut d, &mut hw, &mut sink);
    assert!(matches!(
        out,
        PassOutcome::Active {
            entered: Some(ModeTag::Capture),
            ..
        }
    ));
    assert_eq!(d.payload().captures, 0);
    assert!(!d.identity().reenter_requested());
    assert_eq!(hw.beeps().len(), 2);
}

// ── Poll hooks ────────────────────────────────────────────────

#[test]
fn poll_hooks_fire_once_per_window() {
    let shared = SharedSchedulerState::new();
    let policy = TickPolicy::default();
    let mut d = dispatcher(&shared, ModeTag::Source);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    let mut hooks = CountingHooks::default();

    for _ in 0..256 {
        shared.on_tick(&policy);
        d.run_pass(&mut hw, &mut hooks, &mut sink);
    }
    assert_eq!(hooks.short_polls, 16);
    assert_eq!(hooks.long_polls, 1);
    assert_eq!(hooks.last_id, Some(ID));
}

#[test]
fn ticks_between_passes_collapse_into_one_event() {
    let shared = SharedSchedulerState::new();
    let policy = TickPolicy::default();
    let mut d = dispatcher(&shared, ModeTag::Source);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    let mut hooks = CountingHooks::default();

    // 32 ticks cover two short-poll windows.
    for _ in 0..32 {
        shared.on_tick(&policy);
    }
    let out = d.run_pass(&mut hw, &mut hooks, &mut sink);
    match out {
        PassOutcome::Active { events, .. } => {
            assert!(events.contains(EventMask::TICK | EventMask::SHORT_POLL))
        }
        PassOutcome::Idle => panic!("expected an active pass"),
    }
    assert_eq!(hooks.short_polls, 1);
    assert!(shared.snapshot().events.is_empty());
}

#[test]
fn beacon_hook_transmits_identity_on_long_poll() {
    let shared = SharedSchedulerState::new();
    let policy = TickPolicy::default();
    let mut d = dispatcher(&shared, ModeTag::Stone);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    let mut hooks = BeaconHooks::new(MockRadio::default());

    for _ in 0..256 {
        shared.on_tick(&policy);
        d.run_pass(&mut hw, &mut hooks, &mut sink);
    }

    let mut buf = [0u8; 16];
    let expected = d.identity().encode_beacon(&mut buf).expect("beacon fits").to_vec();
    assert_eq!(hooks.radio().calls, vec![RadioCall::Transmit(expected)]);
}

// ── Display ───────────────────────────────────────────────────

#[test]
fn render_holds_each_digit_before_blanking() {
    let shared = SharedSchedulerState::new();
    let config = TokenConfig {
        digit_hold_us: 750,
        ..TokenConfig::default()
    };
    let mut d = dispatcher_with(&shared, config, ModeTag::Source);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();

    tick_pass(&shared, &mut d, &mut hw, &mut sink);
    assert_eq!(hw.holds(), vec![750, 750]);

    // Each hold follows its digit's commit, the blank is not held.
    let cycle: Vec<&HwCall> = hw
        .calls
        .iter()
        .filter(|c| matches!(c, HwCall::CommitDisplay | HwCall::Hold(_)))
        .collect();
    assert_eq!(
        cycle,
        vec![
            &HwCall::CommitDisplay,
            &HwCall::Hold(750),
            &HwCall::CommitDisplay,
            &HwCall::Hold(750),
            &HwCall::CommitDisplay,
        ]
    );
}

#[test]
fn expired_hold_switches_to_indicator_only_commits() {
    let shared = SharedSchedulerState::new();
    let config = TokenConfig {
        display_hold_ticks: 3,
        ..TokenConfig::default()
    };
    let mut d = dispatcher_with(&shared, config, ModeTag::Source);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();

    tick_pass(&shared, &mut d, &mut hw, &mut sink);
    assert!(hw.count(&HwCall::CommitDisplay) > 0);

    for _ in 0..3 {
        tick_pass(&shared, &mut d, &mut hw, &mut sink);
    }
    hw.clear();
    tick_pass(&shared, &mut d, &mut hw, &mut sink);
    assert_eq!(hw.count(&HwCall::CommitDisplay), 0);
    assert!(hw.digits().is_empty());
    assert_eq!(hw.count(&HwCall::CommitIndicators), 1);
}

#[test]
fn hold_expiry_can_be_disabled() {
    let shared = SharedSchedulerState::new();
    let config = TokenConfig {
        display_hold_ticks: 3,
        clear_display_on_hold_expiry: false,
        ..TokenConfig::default()
    };
    let mut d = dispatcher_with(&shared, config, ModeTag::Source);
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();

    for _ in 0..10 {
        tick_pass(&shared, &mut d, &mut hw, &mut sink);
    }
    assert!(shared.snapshot().flags.contains(FlagMask::DISPLAY_ACTIVE));
    hw.clear();
    tick_pass(&shared, &mut d, &mut hw, &mut sink);
    assert_eq!(hw.digits().len(), 3);
}
