//! Hardware adapter: bridges the output drivers to [`ActuatorPort`].
//!
//! Owns the strike and indicator drivers.  Generic over
//! `embedded_hal` output pins, so the same adapter drives ESP-IDF
//! `PinDriver`s on target and plain fakes in host tests.

use embedded_hal::digital::OutputPin;
use log::error;

use crate::app::ports::ActuatorPort;
use crate::drivers::indicator::IndicatorLed;
use crate::drivers::strike::StrikeDriver;
use crate::error::ActuatorError;

/// Concrete adapter that combines the door outputs behind the port trait.
pub struct HardwareAdapter<S, L> {
    strike: StrikeDriver<S>,
    indicator: IndicatorLed<L>,
}

impl<S: OutputPin, L: OutputPin> HardwareAdapter<S, L> {
    pub fn new(strike: StrikeDriver<S>, indicator: IndicatorLed<L>) -> Self {
        Self { strike, indicator }
    }

    pub fn strike(&self) -> &StrikeDriver<S> {
        &self.strike
    }

    pub fn indicator(&self) -> &IndicatorLed<L> {
        &self.indicator
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<S: OutputPin, L: OutputPin> ActuatorPort for HardwareAdapter<S, L> {
    fn set_strike(&mut self, energised: bool) -> Result<(), ActuatorError> {
        if energised {
            self.strike.energise()
        } else {
            self.strike.release()
        }
    }

    fn set_indicator(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.indicator.set(on)
    }

    fn all_off(&mut self) {
        if self.strike.release().is_err() {
            error!("all_off: strike release failed");
        }
        if self.indicator.set(false).is_err() {
            error!("all_off: indicator clear failed");
        }
    }
}
