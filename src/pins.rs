//! GPIO pin assignments for the door controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  `main.rs` must take the matching
//! `peripherals.pins.gpioN` for each constant.

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Door-side push-button (active-low with internal pull-up).
/// Interrupt on any edge; the level is confirmed by the debouncer.
pub const BUTTON_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Strike / solenoid driver (active HIGH through a MOSFET).
pub const STRIKE_GPIO: i32 = 14;

/// Indicator LED: lit while the unlock window is open.
pub const INDICATOR_GPIO: i32 = 12;
