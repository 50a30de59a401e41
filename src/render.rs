//! Display multiplexing.
//!
//! The two digits share one set of segment lines, so a render pass lights
//! them one after the other and finishes with a blank cycle (no digit
//! selected) so the last digit is not brighter than the first.  Each digit
//! is held for a fixed time after it is latched so brightness does not
//! depend on how long the rest of the pass takes.

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::app::ports::DisplayPort;
use crate::modes::DisplayContent;

/// Digit-select value that selects no digit.
pub const BLANK_POSITION: u8 = 2;

/// One step of a multiplex cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MplexStep {
    Digit { position: u8, nibble: u8, dot: bool },
    Blank,
}

/// Steps per render pass.
pub const MPLEX_STEPS: usize = 3;

/// Plan the `[digit 0, digit 1, blank]` cycle for `content`.
pub fn plan(content: DisplayContent) -> Vec<MplexStep, MPLEX_STEPS> {
    let mut steps = Vec::new();
    for position in 0..2u8 {
        let _ = steps.push(MplexStep::Digit {
            position,
            nibble: content.digit(position),
            dot: content.dot(position),
        });
    }
    let _ = steps.push(MplexStep::Blank);
    steps
}

/// Play a planned cycle onto the display, committing after every step and
/// holding each digit for `hold_us` microseconds.  The display driver is
/// also the clock that times the hold.
pub fn play<P>(steps: &[MplexStep], port: &mut P, hold_us: u32)
where
    P: DisplayPort + DelayNs,
{
    for step in steps {
        match *step {
            MplexStep::Digit { position, nibble, dot } => {
                port.show_digit(nibble, position);
                port.set_decimal_point(dot);
                port.commit_display();
                if hold_us > 0 {
                    port.delay_us(hold_us);
                }
            }
            MplexStep::Blank => {
                port.show_digit(0, BLANK_POSITION);
                port.set_decimal_point(false);
                port.commit_display();
            }
        }
    }
}
