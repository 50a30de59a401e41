//! Periodic tick source using ESP-IDF's esp_timer API.
//!
//! The callback advances the shared registers and wakes the dispatch loop.
//! It runs in the ESP timer task (not ISR); the register update is still
//! one critical section so it composes with the button ISR.
//!
//! On simulation targets no timer runs; tests tick the registers directly.

use crate::events::{SharedSchedulerState, TickPolicy};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use std::sync::OnceLock;

#[cfg(target_os = "espidf")]
static TICK_SOURCE: OnceLock<(&'static SharedSchedulerState, TickPolicy)> = OnceLock::new();

#[cfg(target_os = "espidf")]
static mut TICK_TIMER: esp_timer_handle_t = core::ptr::null_mut();

/// SAFETY: TICK_TIMER is written once in `start_tick_timer()` before any
/// timer callback fires.  Only called from the single main task.
#[cfg(target_os = "espidf")]
unsafe fn tick_timer() -> esp_timer_handle_t { unsafe { TICK_TIMER } }

#[cfg(target_os = "espidf")]
unsafe extern "C" fn tick_cb(_arg: *mut core::ffi::c_void) {
    if let Some((shared, policy)) = TICK_SOURCE.get() {
        shared.on_tick(policy);
        super::wake::signal_wake();
    }
}

/// Start the periodic tick.
#[cfg(target_os = "espidf")]
pub fn start_tick_timer(
    shared: &'static SharedSchedulerState,
    policy: TickPolicy,
    period_us: u32,
) -> Result<(), crate::error::Error> {
    TICK_SOURCE
        .set((shared, policy))
        .map_err(|_| crate::error::Error::Init("tick timer already started"))?;

    // SAFETY: TICK_TIMER is written here once at boot from the single
    // main-task context before any callback fires.
    unsafe {
        let args = esp_timer_create_args_t {
            callback: Some(tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"tick\0".as_ptr() as *const _,
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&args, &raw mut TICK_TIMER);
        if ret != ESP_OK {
            log::error!("hw_timer: tick timer create failed (rc={})", ret);
            return Err(crate::error::Error::Init("tick timer"));
        }
        let ret = esp_timer_start_periodic(TICK_TIMER, u64::from(period_us));
        if ret != ESP_OK {
            log::error!("hw_timer: tick timer start failed (rc={})", ret);
            return Err(crate::error::Error::Init("tick timer"));
        }
    }

    info!("hw_timer: tick every {}us started", period_us);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn start_tick_timer(
    _shared: &'static SharedSchedulerState,
    _policy: TickPolicy,
    period_us: u32,
) -> Result<(), crate::error::Error> {
    log::info!("hw_timer(sim): {}us tick not started", period_us);
    Ok(())
}

/// Stop the periodic tick (before terminal sleep).
#[cfg(target_os = "espidf")]
pub fn stop_tick_timer() {
    // SAFETY: tick_timer() contract; null-check covers a failed start.
    unsafe {
        let t = tick_timer();
        if !t.is_null() { esp_timer_stop(t); }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn stop_tick_timer() {}
