//! Piezo buzzer driver.
//!
//! `beep` starts the LEDC square wave, raises BEEP_ACTIVE and arms a
//! one-shot esp_timer that silences the buzzer and clears the flag when the
//! duration runs out.  The call returns immediately.
//!
//! A tone that is still sounding is only replaced by one of equal or higher
//! priority.

use std::sync::OnceLock;

use log::debug;

use crate::app::ports::TonePort;
use crate::config::Tone;
use crate::drivers::hw_init;
use crate::events::{FlagMask, SharedSchedulerState};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

static TONE_FLAGS: OnceLock<&'static SharedSchedulerState> = OnceLock::new();

/// End of a tone: silence, drop BEEP_ACTIVE, wake the loop so it can idle.
fn finish_tone(shared: &SharedSchedulerState) {
    hw_init::buzzer_set(0);
    shared.clear_flags(FlagMask::BEEP_ACTIVE);
    super::wake::signal_wake();
}

#[cfg(target_os = "espidf")]
static mut STOP_TIMER: esp_timer_handle_t = core::ptr::null_mut();

#[cfg(target_os = "espidf")]
unsafe extern "C" fn stop_cb(_arg: *mut core::ffi::c_void) {
    if let Some(shared) = TONE_FLAGS.get() {
        finish_tone(shared);
    }
}

#[cfg(target_os = "espidf")]
fn schedule_stop(shared: &SharedSchedulerState, duration_us: u64) {
    // SAFETY: STOP_TIMER is created lazily here from the main task only;
    // the callback never touches it.
    unsafe {
        if STOP_TIMER.is_null() {
            let args = esp_timer_create_args_t {
                callback: Some(stop_cb),
                arg: core::ptr::null_mut(),
                dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
                name: b"tone\0".as_ptr() as *const _,
                skip_unhandled_events: false,
            };
            let ret = esp_timer_create(&args, &raw mut STOP_TIMER);
            if ret != ESP_OK {
                log::error!("tone: stop timer create failed (rc={})", ret);
                finish_tone(shared);
                return;
            }
        }
        // Restarting a running one-shot is an error; stop first.
        esp_timer_stop(STOP_TIMER);
        if esp_timer_start_once(STOP_TIMER, duration_us) != ESP_OK {
            finish_tone(shared);
        }
    }
}

/// Simulation: tones end immediately.
#[cfg(not(target_os = "espidf"))]
fn schedule_stop(shared: &SharedSchedulerState, _duration_us: u64) {
    finish_tone(shared);
}

pub struct ToneDriver {
    shared: &'static SharedSchedulerState,
    active_priority: u8,
    played: u32,
}

impl ToneDriver {
    pub fn new(shared: &'static SharedSchedulerState) -> Self {
        let _ = TONE_FLAGS.set(shared);
        Self {
            shared,
            active_priority: 0,
            played: 0,
        }
    }
}

impl TonePort for ToneDriver {
    fn beep(&mut self, tone: Tone) {
        let sounding = self.shared.snapshot().flags.contains(FlagMask::BEEP_ACTIVE);
        if sounding && tone.priority < self.active_priority {
            debug!("tone: {}Hz dropped, priority {} playing", tone.frequency_hz, self.active_priority);
            return;
        }
        self.active_priority = tone.priority;
        self.played = self.played.wrapping_add(1);
        debug!("tone #{}: {}Hz for {}0ms", self.played, tone.frequency_hz, tone.duration_10ms);

        self.shared.set_flags(FlagMask::BEEP_ACTIVE);
        hw_init::buzzer_set(tone.frequency_hz);
        schedule_stop(self.shared, u64::from(tone.duration_10ms) * 10_000);
    }
}
