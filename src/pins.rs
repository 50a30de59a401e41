//! GPIO / peripheral pin assignments for the Magique token board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Output shift register (2 × 74HC595, 16 bits)
// ---------------------------------------------------------------------------

/// Serial data into the first register.
pub const SR_DATA_GPIO: i32 = 4;
/// Shift clock, rising edge.
pub const SR_CLOCK_GPIO: i32 = 5;
/// Storage latch, rising edge copies the shifted word to the outputs.
pub const SR_LATCH_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Register bit layout
// ---------------------------------------------------------------------------

/// Segment lines a..g, active low.
pub const SR_SEGMENT_MASK: u16 = 0x007f;
/// Decimal point, active low.
pub const SR_DOT: u16 = 1 << 7;
/// Digit select lines (active high).  Neither set = blank cycle.
pub const SR_DIGIT0: u16 = 1 << 8;
pub const SR_DIGIT1: u16 = 1 << 9;
/// Indicator LEDs, active high.
pub const SR_LED_RED: u16 = 1 << 10;
pub const SR_LED_YELLOW: u16 = 1 << 11;
pub const SR_LED_GREEN: u16 = 1 << 12;

// ---------------------------------------------------------------------------
// Button (active-low, internal pull-up)
// ---------------------------------------------------------------------------

pub const BUTTON_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// Piezo buzzer (LEDC square wave)
// ---------------------------------------------------------------------------

pub const BUZZER_GPIO: i32 = 7;
/// LEDC timer resolution for the buzzer (50 % duty = half of full scale).
pub const BUZZER_RESOLUTION_BITS: u32 = 10;
pub const BUZZER_DUTY_ON: u32 = 1 << (BUZZER_RESOLUTION_BITS - 1);

// ---------------------------------------------------------------------------
// Battery sense (resistive divider into ADC1)
// ---------------------------------------------------------------------------

/// ADC1 channel 2 (GPIO 2 on ESP32-C3).
pub const BATTERY_ADC_CHANNEL: u32 = 2;
