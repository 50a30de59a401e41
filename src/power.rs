//! Low-battery policy and terminal sleep.
//!
//! The battery is sampled once at boot.  If a threshold is configured and
//! the reading falls below it, the token flashes red once, turns every
//! indicator off, powers the radio down and enters a sleep it only leaves
//! through a hardware reset.

use embedded_hal::delay::DelayNs;
use log::warn;

use crate::app::ports::{IndicatorPort, RadioPort};
use crate::blink::Indicator;

/// How long the red warning flash stays lit.
pub const LOW_BATTERY_FLASH_MS: u32 = 500;

/// What boot should do after sampling the battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerOutcome {
    Run,
    Shutdown,
}

/// Battery threshold check.  `threshold: None` disables the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatteryPolicy {
    pub threshold: Option<u8>,
}

impl BatteryPolicy {
    pub const fn new(threshold: Option<u8>) -> Self {
        Self { threshold }
    }

    pub fn evaluate(&self, level: u8) -> PowerOutcome {
        match self.threshold {
            Some(t) if level < t => PowerOutcome::Shutdown,
            _ => PowerOutcome::Run,
        }
    }
}

/// Turn every indicator off and push the state.
pub fn all_indicators_off(hw: &mut (impl IndicatorPort + ?Sized)) {
    for indicator in Indicator::ALL {
        hw.set_indicator(indicator, false);
    }
    hw.commit_indicators();
}

/// Visible part of the shutdown: red flash, indicators off, radio off.
/// Does not sleep; the caller follows up with [`enter_terminal_sleep`].
pub fn run_shutdown_sequence<H, Rd, D>(hw: &mut H, radio: &mut Rd, delay: &mut D)
where
    H: IndicatorPort + ?Sized,
    Rd: RadioPort + ?Sized,
    D: DelayNs + ?Sized,
{
    warn!("Battery low, shutting down");
    all_indicators_off(hw);
    hw.set_indicator(Indicator::Red, true);
    hw.commit_indicators();
    delay.delay_ms(LOW_BATTERY_FLASH_MS);
    all_indicators_off(hw);
    radio.power_down();
}

/// Deep sleep with every wake source disabled.  Only a reset ends it.
#[cfg(target_os = "espidf")]
pub fn enter_terminal_sleep() -> ! {
    use esp_idf_svc::sys::*;

    // SAFETY: plain ESP-IDF calls with no pointers; deep sleep does not return.
    unsafe {
        esp_sleep_disable_wakeup_source(esp_sleep_source_t_ESP_SLEEP_WAKEUP_ALL);
        esp_deep_sleep_start();
    }
}

/// Host stand-in: park the calling thread for good.
#[cfg(not(target_os = "espidf"))]
pub fn enter_terminal_sleep() -> ! {
    log::info!("[SIM] Terminal sleep");
    loop {
        std::thread::park();
    }
}
