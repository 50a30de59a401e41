//! Device identity derived from the ESP32 factory MAC address.
//!
//! Tokens built without a `MAGIQUE_ID` take their one-byte id from the
//! last MAC byte, so a batch flashed with one image still gets distinct
//! ids (up to collisions in that byte).

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: the buffer is 6 bytes, as esp_efuse_mac_get_default requires.
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// One-byte token id from the MAC.
pub fn token_id(mac: &MacAddress) -> u8 {
    mac[5]
}

/// Configured id, or the MAC-derived one.
pub fn resolve_id(configured: Option<u8>) -> u8 {
    configured.unwrap_or_else(|| token_id(&read_mac()))
}
