//! Peripheral drivers, hardware initialisation, and interrupt sources.

pub mod button;
pub mod display;
pub mod hw_init;
pub mod hw_timer;
pub mod shift_register;
pub mod tone;
pub mod wake;
