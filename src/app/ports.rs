//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LockController (domain)
//! ```
//!
//! Driven adapters (strike, indicator, MQTT, WiFi, clock, event sinks)
//! implement these traits.  The [`LockController`](super::service::LockController)
//! consumes them via generics, so the domain core never touches hardware
//! or the network directly.
//!
//! ## Security notes
//!
//! - **TransportPort** delivers untrusted bytes.  Only the controller's
//!   command gate may turn them into a [`Command`](super::commands::Command).
//! - Publish failures are reported, never retried by the domain: the door
//!   must behave the same with or without a broker.

use crate::error::{ActuatorError, CommsError};

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to drive the door outputs.
pub trait ActuatorPort {
    /// Energise (`true`) or release (`false`) the strike.
    fn set_strike(&mut self, energised: bool) -> Result<(), ActuatorError>;

    /// Light or clear the unlock indicator.
    fn set_indicator(&mut self, on: bool) -> Result<(), ActuatorError>;

    /// Release the strike and clear the indicator: safe shutdown.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain ↔ MQTT broker)
// ───────────────────────────────────────────────────────────────

/// One message received on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Publish/subscribe session with the broker.
///
/// Inbound messages are queued by the adapter (possibly from another
/// task) and drained by the poll loop through [`poll_inbound`](Self::poll_inbound).
pub trait TransportPort {
    /// Open a session under `client_id`.  May block for a bounded time.
    fn connect(&mut self, client_id: &str) -> Result<(), CommsError>;

    fn is_connected(&self) -> bool;

    /// Best-effort publish.
    fn publish(&mut self, topic: &str, payload: &[u8], retained: bool) -> Result<(), CommsError>;

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError>;

    /// Next queued inbound message, if any.
    fn poll_inbound(&mut self) -> Option<InboundMessage>;
}

// ───────────────────────────────────────────────────────────────
// Connectivity port (driven adapter: domain ↔ WiFi station)
// ───────────────────────────────────────────────────────────────

pub trait ConnectivityPort {
    /// Attempt to join the configured network.  May block for a bounded time.
    fn connect(&mut self) -> Result<(), CommsError>;

    fn is_connected(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic, non-decreasing millisecond clock.
pub trait ClockPort {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from loading or validating [`LockConfig`](crate::config::LockConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// The override document could not be parsed.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
