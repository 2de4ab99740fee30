//! Input debouncing and actuator output drivers.

pub mod debounce;
pub mod indicator;
pub mod strike;
