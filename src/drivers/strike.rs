//! Door strike / solenoid driver.
//!
//! A single digital output through a MOSFET: HIGH energises the strike and
//! lets the door be pushed open.
//!
//! ## Safety contract
//!
//! The strike must only be energised for the bounded open pulse.  Timing is
//! enforced by the FSM; this driver is a dumb actuator that remembers the
//! last level it successfully wrote.

use embedded_hal::digital::OutputPin;
use log::error;

use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeState {
    Released,
    Energised,
}

pub struct StrikeDriver<P> {
    pin: P,
    state: StrikeState,
}

impl<P: OutputPin> StrikeDriver<P> {
    /// Wrap the pin and drive it low so the door boots secured.
    pub fn new(mut pin: P) -> Result<Self, ActuatorError> {
        pin.set_low().map_err(|e| {
            error!("strike: initial release failed: {e:?}");
            ActuatorError::GpioWriteFailed
        })?;
        Ok(Self {
            pin,
            state: StrikeState::Released,
        })
    }

    pub fn energise(&mut self) -> Result<(), ActuatorError> {
        self.pin.set_high().map_err(|e| {
            error!("strike: energise failed: {e:?}");
            ActuatorError::GpioWriteFailed
        })?;
        self.state = StrikeState::Energised;
        Ok(())
    }

    pub fn release(&mut self) -> Result<(), ActuatorError> {
        self.pin.set_low().map_err(|e| {
            error!("strike: release failed: {e:?}");
            ActuatorError::GpioWriteFailed
        })?;
        self.state = StrikeState::Released;
        Ok(())
    }

    pub fn state(&self) -> StrikeState {
        self.state
    }

    pub fn is_energised(&self) -> bool {
        self.state == StrikeState::Energised
    }
}
