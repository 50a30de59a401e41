//! Power-on sequence.
//!
//! ```text
//!  validate config ─▶ radio init (TX) ─▶ self-test ─▶ battery sample
//!        ─▶ low-battery policy ──[below threshold]──▶ shutdown sequence
//!                 │
//!                 └─[ok]──▶ ready tone ─▶ digits cleared ─▶ identity
//! ```
//!
//! Hardware init, the tick timer and the button ISR are brought up by
//! `main` before this runs; the dispatch loop starts after it returns
//! [`PowerOutcome::Run`].

use embedded_hal::delay::DelayNs;
use log::info;

use super::events::AppEvent;
use super::ports::{BatteryPort, DisplayPort, EventSink, IndicatorPort, RadioPort, RadioRole, TonePort};
use crate::blink::Indicator;
use crate::config::TokenConfig;
use crate::error::Result;
use crate::modes::DeviceIdentity;
use crate::power::{self, BatteryPolicy, PowerOutcome};
use crate::render::BLANK_POSITION;

/// Per-indicator dwell of the optional self-test sweep.
pub const SELF_TEST_STEP_MS: u32 = 200;

/// Result of [`boot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootOutcome {
    pub identity: DeviceIdentity,
    pub power: PowerOutcome,
}

/// Indicator self-test: optionally light each indicator in turn, then
/// leave all of them off.
pub fn self_test<H, D>(hw: &mut H, sweep: bool, delay: &mut D)
where
    H: IndicatorPort + ?Sized,
    D: DelayNs + ?Sized,
{
    if sweep {
        for indicator in Indicator::ALL {
            power::all_indicators_off(hw);
            hw.set_indicator(indicator, true);
            hw.commit_indicators();
            delay.delay_ms(SELF_TEST_STEP_MS);
        }
    }
    power::all_indicators_off(hw);
}

/// Run the boot sequence.  `device_id` is the already resolved token id.
pub fn boot<H, Rd, D, E>(
    config: &TokenConfig,
    device_id: u8,
    hw: &mut H,
    radio: &mut Rd,
    delay: &mut D,
    sink: &mut E,
) -> Result<BootOutcome>
where
    H: DisplayPort + IndicatorPort + TonePort + BatteryPort,
    Rd: RadioPort + ?Sized,
    D: DelayNs + ?Sized,
    E: EventSink + ?Sized,
{
    config.validate()?;

    radio.init(RadioRole::Transmit);

    self_test(hw, config.self_test_sweep, delay);
    sink.emit(&AppEvent::SelfTestDone);

    let level = hw.read_level();
    let mut identity = DeviceIdentity::new(device_id, config.default_mode);
    identity.set_battery_level(level);
    info!("boot: battery level {}", level);

    let policy = BatteryPolicy::new(config.low_battery_threshold);
    if policy.evaluate(level) == PowerOutcome::Shutdown {
        sink.emit(&AppEvent::LowBattery {
            level,
            threshold: policy.threshold.unwrap_or_default(),
        });
        power::run_shutdown_sequence(hw, radio, delay);
        return Ok(BootOutcome {
            identity,
            power: PowerOutcome::Shutdown,
        });
    }

    hw.beep(config.boot_tone);

    hw.show_digit(0, BLANK_POSITION);
    hw.set_decimal_point(false);
    hw.commit_display();

    sink.emit(&AppEvent::Started {
        id: identity.id(),
        mode_adv: identity.mode_adv(),
        battery_level: level,
    });
    Ok(BootOutcome {
        identity,
        power: PowerOutcome::Run,
    })
}
