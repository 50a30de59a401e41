//! Magique game token firmware library.
//!
//! Exposes the scheduler core, the mode state machine and the port
//! traits for integration testing.  All ESP-IDF-specific code is guarded
//! by `#[cfg(target_os = "espidf")]` within each module, with a host
//! simulation twin alongside.

#![deny(unused_must_use)]

pub mod app;
pub mod blink;
pub mod config;
pub mod error;
pub mod events;
pub mod modes;
pub mod power;
pub mod render;
pub mod rng;
pub mod scheduler;

pub mod adapters;
pub mod drivers;

mod pins;
