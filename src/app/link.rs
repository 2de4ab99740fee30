//! Link supervision: WiFi and broker session upkeep.
//!
//! Called once per poll-loop iteration.  Connect attempts may block for a
//! bounded time inside the adapters, so each layer is retried at most
//! once per its configured interval; between attempts `poll` returns
//! immediately and the door keeps working offline.
//!
//! ```text
//!  WiFi down ──[wifi_retry_ms]──▶ connect WiFi
//!  WiFi up, broker down ──[mqtt_retry_ms]──▶ connect broker
//!                                              │ ok
//!                                              ▼
//!                         announce (retained) → subscribe command topic
//! ```

use log::{info, warn};

use crate::config::LockConfig;

use super::events::AppEvent;
use super::ports::{ConnectivityPort, EventSink, TransportPort};

/// Coarse link health, returned by every [`LinkSupervisor::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    WifiDown,
    BrokerDown,
    Up,
}

pub struct LinkSupervisor {
    client_id: String,
    last_wifi_attempt: Option<u64>,
    last_mqtt_attempt: Option<u64>,
    /// Announce + subscribe completed on the current broker session.
    session_up: bool,
}

impl LinkSupervisor {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            last_wifi_attempt: None,
            last_mqtt_attempt: None,
            session_up: false,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn is_up(&self) -> bool {
        self.session_up
    }

    pub fn poll(
        &mut self,
        now_ms: u64,
        wifi: &mut impl ConnectivityPort,
        transport: &mut impl TransportPort,
        config: &LockConfig,
        sink: &mut impl EventSink,
    ) -> LinkStatus {
        if !wifi.is_connected() {
            self.mark_down(sink);
            if due(self.last_wifi_attempt, now_ms, config.wifi_retry_ms) {
                self.last_wifi_attempt = Some(now_ms);
                info!("link: connecting WiFi");
                if let Err(e) = wifi.connect() {
                    warn!("link: {e}, retrying in {} ms", config.wifi_retry_ms);
                    return LinkStatus::WifiDown;
                }
            } else {
                return LinkStatus::WifiDown;
            }
        }

        if !transport.is_connected() {
            self.mark_down(sink);
            if !due(self.last_mqtt_attempt, now_ms, config.mqtt_retry_ms) {
                return LinkStatus::BrokerDown;
            }
            self.last_mqtt_attempt = Some(now_ms);
            info!("link: connecting to {} as '{}'", config.broker_url, self.client_id);
            if let Err(e) = transport.connect(&self.client_id) {
                warn!("link: broker connect failed ({e}), retrying in {} ms", config.mqtt_retry_ms);
                return LinkStatus::BrokerDown;
            }
        } else if !self.session_up {
            // Connected, but the last subscribe failed.
            if !due(self.last_mqtt_attempt, now_ms, config.mqtt_retry_ms) {
                return LinkStatus::BrokerDown;
            }
            self.last_mqtt_attempt = Some(now_ms);
        }

        if !self.session_up {
            if !establish(transport, config) {
                return LinkStatus::BrokerDown;
            }
            self.session_up = true;
            sink.emit(&AppEvent::LinkUp);
        }
        LinkStatus::Up
    }

    fn mark_down(&mut self, sink: &mut impl EventSink) {
        if self.session_up {
            self.session_up = false;
            warn!("link: session lost");
            sink.emit(&AppEvent::LinkDown);
        }
    }
}

/// First attempt is always due.
fn due(last: Option<u64>, now_ms: u64, interval_ms: u64) -> bool {
    last.is_none_or(|t| now_ms.saturating_sub(t) >= interval_ms)
}

/// Announce, then subscribe.  `false` when the subscription failed.
fn establish(transport: &mut impl TransportPort, config: &LockConfig) -> bool {
    if let Err(e) = transport.publish(&config.status_topic, config.announce_message.as_bytes(), true) {
        warn!("link: announce failed: {e}");
    }
    match transport.subscribe(&config.command_topic) {
        Ok(()) => {
            info!("link: subscribed to '{}'", config.command_topic);
            true
        }
        Err(e) => {
            warn!("link: {e}");
            false
        }
    }
}
