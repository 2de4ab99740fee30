//! Error types for the DoorLock firmware.
//!
//! One enum per failure domain: authentication, communications and
//! actuators.  All variants are `Copy` so they can be passed through the
//! controller and event sink without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Authentication errors
// ---------------------------------------------------------------------------

/// Why an inbound command payload was refused.
///
/// Terminal for the single message that produced it: the controller logs
/// it and discards the message.  Nothing is ever sent back to the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// The payload is structurally invalid.
    Malformed(Malformation),
    /// Well-formed, but the digest does not match the shared secret.
    InvalidSignature,
    /// Authentic, but the sender timestamp is not newer than the last one.
    Replayed,
    /// Too many inbound messages; dropped before digest computation.
    Throttled,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(m) => write!(f, "malformed payload ({m})"),
            Self::InvalidSignature => write!(f, "invalid signature"),
            Self::Replayed => write!(f, "replayed command"),
            Self::Throttled => write!(f, "inbound rate exceeded"),
        }
    }
}

impl From<Malformation> for AuthError {
    fn from(m: Malformation) -> Self {
        Self::Malformed(m)
    }
}

/// Structural defect found while splitting or parsing a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformation {
    /// Payload exceeds the maximum accepted length.
    TooLong,
    /// No separator byte between command text and digest.
    MissingSeparator,
    /// Digest field is not exactly the encoded digest length.
    DigestLength,
    /// Command text is not valid UTF-8.
    NotUtf8,
    /// Command text has no `:` before the timestamp.
    MissingTimestamp,
    /// Command name is not recognised.
    UnknownCommand,
    /// Timestamp is not a positive decimal integer.
    BadTimestamp,
}

impl fmt::Display for Malformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong => write!(f, "too long"),
            Self::MissingSeparator => write!(f, "missing separator"),
            Self::DigestLength => write!(f, "wrong digest length"),
            Self::NotUtf8 => write!(f, "command not UTF-8"),
            Self::MissingTimestamp => write!(f, "missing timestamp"),
            Self::UnknownCommand => write!(f, "unknown command"),
            Self::BadTimestamp => write!(f, "bad timestamp"),
        }
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// The transport is not connected (or refused the connection).
    TransportUnavailable,
    WifiConnectFailed,
    PublishFailed,
    SubscribeFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransportUnavailable => write!(f, "transport unavailable"),
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
            Self::PublishFailed => write!(f, "MQTT publish failed"),
            Self::SubscribeFailed => write!(f, "MQTT subscribe failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO set failed.
    GpioWriteFailed,
    /// Hardware reported a fault on the strike (no detection fitted yet).
    ActuatorFault,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::ActuatorFault => write!(f, "actuator fault"),
        }
    }
}
