//! Single-colour indicator LED.
//!
//! Mirrors the "unlocked for entry" flag so someone at the door can see
//! that a button press will open it.

use embedded_hal::digital::{OutputPin, PinState};

use crate::error::ActuatorError;

pub struct IndicatorLed<P> {
    pin: P,
    lit: bool,
}

impl<P: OutputPin> IndicatorLed<P> {
    pub fn new(mut pin: P) -> Result<Self, ActuatorError> {
        pin.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
        Ok(Self { pin, lit: false })
    }

    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.pin
            .set_state(PinState::from(on))
            .map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.lit = on;
        Ok(())
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}
