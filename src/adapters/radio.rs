//! Radio adapter and the identity beacon hook.
//!
//! The packet radio driver itself lives outside this crate.  [`LogRadio`]
//! stands in for it: it accepts the boot-time role, logs every payload
//! and counts what it was handed.  [`BeaconHooks`] plugs into the
//! long-poll extension point and transmits the identity beacon once per
//! 256-tick lap.

use log::{debug, info, warn};

use crate::app::ports::{PollHooks, RadioPort, RadioRole};
use crate::modes::DeviceIdentity;

/// Largest encoded identity beacon.
pub const BEACON_CAPACITY: usize = 16;

/// Radio stand-in that logs instead of transmitting.
#[derive(Debug, Default)]
pub struct LogRadio {
    role: Option<RadioRole>,
    sent: u32,
    powered_down: bool,
}

impl LogRadio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(&self) -> Option<RadioRole> {
        self.role
    }

    pub fn sent(&self) -> u32 {
        self.sent
    }

    pub fn is_powered_down(&self) -> bool {
        self.powered_down
    }
}

impl RadioPort for LogRadio {
    fn init(&mut self, role: RadioRole) {
        info!("radio: init as {:?}", role);
        self.role = Some(role);
        self.powered_down = false;
    }

    fn transmit(&mut self, payload: &[u8]) {
        if self.powered_down {
            warn!("radio: transmit while powered down, dropped");
            return;
        }
        debug!("radio: tx {:02x?}", payload);
        self.sent = self.sent.wrapping_add(1);
    }

    fn power_down(&mut self) {
        info!("radio: power down");
        self.powered_down = true;
    }
}

/// Poll hooks that beacon the identity on every long poll.
pub struct BeaconHooks<Rd> {
    radio: Rd,
}

impl<Rd: RadioPort> BeaconHooks<Rd> {
    pub fn new(radio: Rd) -> Self {
        Self { radio }
    }

    pub fn radio(&self) -> &Rd {
        &self.radio
    }
}

impl<Rd: RadioPort> PollHooks for BeaconHooks<Rd> {
    fn on_long_poll(&mut self, identity: &DeviceIdentity) {
        let mut buf = [0u8; BEACON_CAPACITY];
        match identity.encode_beacon(&mut buf) {
            Ok(frame) => self.radio.transmit(frame),
            Err(e) => warn!("beacon: {}", e),
        }
    }
}
