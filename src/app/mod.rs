//! Application core: pure domain logic, zero I/O.
//!
//! Business rules for the door controller: debounced button handling,
//! the door FSM, the authenticated command gate, and link supervision.
//! All interaction with hardware and the network happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod link;
pub mod ports;
pub mod service;
