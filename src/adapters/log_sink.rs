//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).  A radio telemetry
//! adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { id, mode_adv, battery_level } => {
                info!(
                    "START | id={:#04x} | mode_adv={} | vbat={}",
                    id,
                    mode_adv.name(),
                    battery_level
                );
            }
            AppEvent::SelfTestDone => {
                info!("SELFTEST | indicators cleared");
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE | {} -> {}", from.name(), to.name());
            }
            AppEvent::LowBattery { level, threshold } => {
                warn!("POWER | battery {} below {}, shutting down", level, threshold);
            }
        }
    }
}
