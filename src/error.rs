//! Unified error type for the Magique firmware.
//!
//! The scheduler core itself has no recoverable errors: a peripheral read
//! yields whatever the peripheral returns.  The fallible edges are boot-time
//! configuration, peripheral initialisation and beacon encoding, and they
//! all funnel into [`Error`].

use core::fmt;

/// Every fallible operation outside the dispatch loop funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
    /// A value could not be encoded into the supplied buffer.
    Encode,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Encode => write!(f, "encode: buffer too small"),
        }
    }
}

impl core::error::Error for Error {}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
