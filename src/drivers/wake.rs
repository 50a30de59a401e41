//! Wake signalling between the interrupt producers and the dispatch loop.
//!
//! On ESP-IDF the loop blocks on a FreeRTOS task notification.  A
//! notification sent while the loop is still busy stays pending, so a wake
//! raised between the idle check and the wait is never lost.
//!
//! The host build has no interrupts to wait for, so only the no-op
//! [`signal_wake`] exists there.

#[cfg(target_os = "espidf")]
use std::sync::{Arc, OnceLock};

#[cfg(target_os = "espidf")]
use esp_idf_hal::task::notification::{Notification, Notifier};

#[cfg(target_os = "espidf")]
use crate::app::ports::WakePort;

#[cfg(target_os = "espidf")]
static WAKE_NOTIFIER: OnceLock<Arc<Notifier>> = OnceLock::new();

/// Wake the dispatch loop.  Safe from ISR and timer-task context.
#[cfg(target_os = "espidf")]
pub fn signal_wake() {
    if let Some(notifier) = WAKE_NOTIFIER.get() {
        // SAFETY: the notifier targets the main task, which lives for the
        // whole program; notify_and_yield picks the ISR-safe variant itself.
        unsafe {
            notifier.notify_and_yield(core::num::NonZeroU32::MIN);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn signal_wake() {}

/// Blocks the calling task until [`signal_wake`] is called.
#[cfg(target_os = "espidf")]
pub struct TaskWake {
    notification: Notification,
}

#[cfg(target_os = "espidf")]
impl TaskWake {
    /// Must be called from the task that will wait.
    pub fn install() -> crate::error::Result<Self> {
        let notification = Notification::new();
        WAKE_NOTIFIER
            .set(notification.notifier())
            .map_err(|_| crate::error::Error::Init("wake notifier already installed"))?;
        log::info!("wake: task notification installed");
        Ok(Self { notification })
    }
}

#[cfg(target_os = "espidf")]
impl WakePort for TaskWake {
    fn wait_for_interrupt(&mut self) {
        self.notification.wait(esp_idf_hal::delay::BLOCK);
    }
}
