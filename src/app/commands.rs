//! Inbound commands to the lock controller.
//!
//! A [`Command`] only exists after the payload carrying it has passed
//! authentication; nothing else in the crate constructs one from
//! untrusted input.

/// Actions a remote holder of the shared secret may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Open the unlock window so the door button will open the door.
    Unlock,
}

impl Command {
    /// Wire name used in the signed command text.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unlock => "unlock",
        }
    }

    /// Resolve a wire name.  Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "unlock" => Some(Self::Unlock),
            _ => None,
        }
    }
}

/// An authenticated command plus the sender's timestamp.
///
/// The timestamp is a freshness hint supplied by the sender; it is only
/// enforced when the replay guard is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedCommand {
    pub command: Command,
    pub sender_timestamp: u64,
}
