//! Application core boundary.
//!
//! Port traits in [`ports`] keep the scheduler free of hardware access;
//! [`events`] carries the structured log/telemetry records; [`boot`] runs
//! the one-shot power-on sequence before the dispatch loop takes over.

pub mod boot;
pub mod events;
pub mod ports;
