//! System configuration parameters
//!
//! All tunable parameters for the door controller.  Defaults match the
//! deployed hardware; a JSON override can be embedded at build time.
//! The shared secret is never part of this struct.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Longest accepted unlock window (24 h).  The open pulse is bounded by
/// the window, so this caps every door deadline.
pub const MAX_UNLOCK_WINDOW_MS: u64 = 24 * 60 * 60 * 1_000;

/// Longest accepted debounce window.
pub const MAX_DEBOUNCE_MS: u64 = 10_000;

/// How the debouncer treats edges that arrive while a read is already due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebouncePolicy {
    /// The first edge fixes the read time; later bounces do not move it.
    Fixed,
    /// Every edge restarts the debounce window.
    Extend,
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    // --- Input ---
    /// Delay after an edge before the button level is trusted (ms)
    pub debounce_ms: u64,
    /// Debounce behaviour on repeated edges
    pub debounce_policy: DebouncePolicy,
    /// Button reads LOW when pressed (pull-up wiring)
    pub button_active_low: bool,

    // --- Door timing ---
    /// How long a remote unlock lets the button open the door (ms)
    pub unlock_window_ms: u64,
    /// How long the strike stays energised per opening (ms)
    pub open_pulse_ms: u64,

    // --- Messaging ---
    /// MQTT broker URL
    pub broker_url: String,
    /// Topic carrying signed commands to this node
    pub command_topic: String,
    /// Topic for plain-text status messages from this node
    pub status_topic: String,
    /// Retained message published on every (re)connect
    pub announce_message: String,

    // --- Link supervision ---
    /// Minimum interval between WiFi connect attempts (ms)
    pub wifi_retry_ms: u64,
    /// Minimum interval between MQTT connect attempts (ms)
    pub mqtt_retry_ms: u64,

    // --- Command gate ---
    /// Reject commands whose sender timestamp does not increase
    pub replay_guard: bool,
    /// Inbound messages per second admitted to digest checking
    pub inbound_rate_per_sec: u32,

    // --- Timing ---
    /// Poll loop yield between iterations (ms)
    pub poll_interval_ms: u32,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            // Input
            debounce_ms: 50,
            debounce_policy: DebouncePolicy::Fixed,
            button_active_low: true,

            // Door timing
            unlock_window_ms: 60_000, // 1 min
            open_pulse_ms: 1_000,

            // Messaging
            broker_url: String::from("mqtt://192.168.1.75:1883"),
            command_topic: String::from("testarhs/porta"),
            status_topic: String::from("testarhs/server"),
            announce_message: String::from("online"),

            // Link supervision
            wifi_retry_ms: 1_000,
            mqtt_retry_ms: 3_000,

            // Command gate
            replay_guard: true,
            inbound_rate_per_sec: 10,

            // Timing
            poll_interval_ms: 10,
        }
    }
}

impl LockConfig {
    /// Parse a JSON override document.  Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would leave the door unsafe or the node mute.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unlock_window_ms == 0 {
            return Err(ConfigError::ValidationFailed("unlock_window_ms must be > 0"));
        }
        if self.unlock_window_ms > MAX_UNLOCK_WINDOW_MS {
            return Err(ConfigError::ValidationFailed("unlock_window_ms exceeds 24 h"));
        }
        if self.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::ValidationFailed("debounce_ms exceeds 10 s"));
        }
        if self.open_pulse_ms == 0 {
            return Err(ConfigError::ValidationFailed("open_pulse_ms must be > 0"));
        }
        if self.open_pulse_ms > self.unlock_window_ms {
            return Err(ConfigError::ValidationFailed(
                "open_pulse_ms must not exceed unlock_window_ms",
            ));
        }
        if self.command_topic.is_empty() || self.status_topic.is_empty() {
            return Err(ConfigError::ValidationFailed("topics must not be empty"));
        }
        if self.command_topic == self.status_topic {
            return Err(ConfigError::ValidationFailed(
                "command and status topics must differ",
            ));
        }
        if self.inbound_rate_per_sec == 0 {
            return Err(ConfigError::ValidationFailed("inbound_rate_per_sec must be > 0"));
        }
        Ok(())
    }
}
