//! Button edge source.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up.  The GPIO fires on the
//! falling edge; the ISR raises DISPLAY_ACTIVE | BUTTON_PRESSED, re-arms the
//! display hold and wakes the dispatch loop.  The GPIO ISR service
//! acknowledges the pin's pending status before calling the handler.
//!
//! ## Bounce
//!
//! No debounce: repeated edges before the next pass only re-arm the hold,
//! and the flags are sticky rather than queued, so a bouncing contact
//! reads as one press.

use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::events::SharedSchedulerState;

static BUTTON_SINK: OnceLock<(&'static SharedSchedulerState, u16)> = OnceLock::new();

/// Route button edges into `shared`, re-arming the hold to `hold_ticks`.
/// Call once at boot, before the ISR is registered.
pub fn install(shared: &'static SharedSchedulerState, hold_ticks: u16) -> Result<()> {
    BUTTON_SINK
        .set((shared, hold_ticks))
        .map_err(|_| Error::Init("button already installed"))
}

/// Edge handler body.  Bounded work, no allocation, no logging; a no-op
/// until [`install`] has run.
pub fn handle_edge() {
    if let Some((shared, hold)) = BUTTON_SINK.get() {
        shared.on_button_edge(*hold);
        super::wake::signal_wake();
    }
}

/// GPIO ISR trampoline, registered by
/// [`init_isr_service`](super::hw_init::init_isr_service).
#[cfg(target_os = "espidf")]
pub unsafe extern "C" fn button_gpio_isr(_arg: *mut core::ffi::c_void) {
    handle_edge();
}
