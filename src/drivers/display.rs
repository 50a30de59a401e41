//! 7-segment font and register encoding for the digits and indicators.

use crate::blink::Indicator;
use crate::pins;

/// Segment patterns for 0-F, bit 0 = segment a .. bit 6 = segment g.
pub const FONT: [u8; 16] = [
    0x3f, 0x06, 0x5b, 0x4f, 0x66, 0x6d, 0x7d, 0x07, // 0-7
    0x7f, 0x6f, 0x77, 0x7c, 0x39, 0x5e, 0x79, 0x71, // 8-F
];

/// Bits of the register owned by the display.
pub const DISPLAY_FIELD: u16 =
    pins::SR_SEGMENT_MASK | pins::SR_DOT | pins::SR_DIGIT0 | pins::SR_DIGIT1;

/// Register bits for showing `nibble` on digit `position` (0 or 1).  Any
/// other position selects no digit and darkens every segment.
pub const fn encode_digit(nibble: u8, position: u8) -> u16 {
    let select = match position {
        0 => pins::SR_DIGIT0,
        1 => pins::SR_DIGIT1,
        _ => return pins::SR_SEGMENT_MASK | pins::SR_DOT,
    };
    // Segments are active low; DP stays dark until set explicitly.
    let lit = FONT[(nibble & 0x0f) as usize] as u16;
    (!lit & pins::SR_SEGMENT_MASK) | pins::SR_DOT | select
}

/// Register bit driving `indicator`.
pub const fn indicator_bit(indicator: Indicator) -> u16 {
    match indicator {
        Indicator::Red => pins::SR_LED_RED,
        Indicator::Yellow => pins::SR_LED_YELLOW,
        Indicator::Green => pins::SR_LED_GREEN,
    }
}

/// All three indicators.
pub const INDICATOR_FIELD: u16 = pins::SR_LED_RED | pins::SR_LED_YELLOW | pins::SR_LED_GREEN;
