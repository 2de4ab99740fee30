//! Outbound application events.
//!
//! The [`LockController`](super::service::LockController) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Status
//! notices are additionally published on the MQTT status topic.

use crate::error::{ActuatorError, AuthError, CommsError};
use crate::fsm::StateId;

/// Human-readable door status, published once per state-changing event.
///
/// Consumers must treat the text as informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusNotice {
    Unlocked,
    Secured,
    Opening,
}

impl StatusNotice {
    pub const fn text(self) -> &'static str {
        match self {
            Self::Unlocked => "Door unlocked",
            Self::Secured => "Door secured",
            Self::Opening => "Door opening",
        }
    }
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The controller has started (carries initial state).
    Started(StateId),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// A status notice was produced (and handed to the transport).
    Status(StatusNotice),

    /// Publishing a status notice failed; the door state is unaffected.
    PublishFailed { notice: StatusNotice, error: CommsError },

    /// An inbound command passed authentication.
    CommandAccepted { sender_timestamp: u64 },

    /// An inbound message was discarded.
    CommandRejected(AuthError),

    /// Driving an output failed.
    ActuatorFault(ActuatorError),

    /// The broker session came up (after announce + subscribe).
    LinkUp,

    /// The broker session was lost.
    LinkDown,
}
