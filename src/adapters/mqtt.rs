//! MQTT transport adapter.
//!
//! Implements [`TransportPort`].  Inbound messages arrive on the MQTT
//! client's own task and are queued through a channel; the poll loop
//! drains them with `poll_inbound()`, so the controller only ever runs on
//! one thread.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::mqtt::client::EspMqttClient`
//!   with a callback that forwards `Received` events and tracks the
//!   connected flag.
//! - **all other targets**: an in-memory loopback broker that records
//!   publishes and subscriptions and lets tests inject inbound messages.

use log::{info, warn};

use crate::app::ports::{InboundMessage, TransportPort};
use crate::error::CommsError;

#[cfg(target_os = "espidf")]
use std::sync::Arc;
#[cfg(target_os = "espidf")]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(target_os = "espidf")]
use std::sync::mpsc::{self, Receiver};

#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};

/// Inbound messages buffered between poll-loop iterations.
pub const INBOUND_QUEUE_DEPTH: usize = 8;

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct MqttTransport {
    broker_url: String,
    client: Option<EspMqttClient<'static>>,
    connected: Arc<AtomicBool>,
    inbound: Option<Receiver<InboundMessage>>,
}

#[cfg(target_os = "espidf")]
impl MqttTransport {
    pub fn new(broker_url: &str) -> Self {
        Self {
            broker_url: broker_url.to_string(),
            client: None,
            connected: Arc::new(AtomicBool::new(false)),
            inbound: None,
        }
    }
}

#[cfg(target_os = "espidf")]
impl TransportPort for MqttTransport {
    fn connect(&mut self, client_id: &str) -> Result<(), CommsError> {
        // Drop any previous session before opening a new one.
        self.client = None;
        self.connected.store(false, Ordering::Release);

        let (tx, rx) = mpsc::sync_channel::<InboundMessage>(INBOUND_QUEUE_DEPTH);
        let connected = self.connected.clone();

        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            disable_clean_session: false,
            ..Default::default()
        };

        let client = EspMqttClient::new_cb(&self.broker_url, &conf, move |event| {
            match event.payload() {
                EventPayload::Connected(_) => connected.store(true, Ordering::Release),
                EventPayload::Disconnected => connected.store(false, Ordering::Release),
                EventPayload::Received { topic, data, .. } => {
                    let msg = InboundMessage {
                        topic: topic.unwrap_or_default().to_string(),
                        payload: data.to_vec(),
                    };
                    if tx.try_send(msg).is_err() {
                        warn!("MQTT: inbound queue full, message dropped");
                    }
                }
                _ => {}
            }
        })
        .map_err(|e| {
            warn!("MQTT: client start failed: {e:?}");
            CommsError::TransportUnavailable
        })?;

        // Bounded wait for CONNACK so the caller can announce immediately.
        for _ in 0..50 {
            if self.connected.load(Ordering::Acquire) {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(20));
        }

        self.client = Some(client);
        self.inbound = Some(rx);
        if !self.connected.load(Ordering::Acquire) {
            return Err(CommsError::TransportUnavailable);
        }
        info!("MQTT: connected to {} as '{}'", self.broker_url, client_id);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.client.is_some() && self.connected.load(Ordering::Acquire)
    }

    fn publish(&mut self, topic: &str, payload: &[u8], retained: bool) -> Result<(), CommsError> {
        let client = self.client.as_mut().ok_or(CommsError::TransportUnavailable)?;
        client
            .publish(topic, QoS::AtMostOnce, retained, payload)
            .map(|_| ())
            .map_err(|e| {
                warn!("MQTT: publish to '{topic}' failed: {e:?}");
                CommsError::PublishFailed
            })
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        let client = self.client.as_mut().ok_or(CommsError::TransportUnavailable)?;
        client.subscribe(topic, QoS::AtLeastOnce).map(|_| ()).map_err(|e| {
            warn!("MQTT: subscribe to '{topic}' failed: {e:?}");
            CommsError::SubscribeFailed
        })
    }

    fn poll_inbound(&mut self) -> Option<InboundMessage> {
        self.inbound.as_ref()?.try_recv().ok()
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

/// One message handed to the simulated broker.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub payload: Vec<u8>,
    pub retained: bool,
}

#[cfg(not(target_os = "espidf"))]
pub struct MqttTransport {
    broker_url: String,
    client_id: Option<String>,
    connected: bool,
    reachable: bool,
    subscriptions: Vec<String>,
    published: Vec<Published>,
    inbound: std::collections::VecDeque<InboundMessage>,
}

#[cfg(not(target_os = "espidf"))]
impl MqttTransport {
    pub fn new(broker_url: &str) -> Self {
        Self {
            broker_url: broker_url.to_string(),
            client_id: None,
            connected: false,
            reachable: true,
            subscriptions: Vec::new(),
            published: Vec::new(),
            inbound: std::collections::VecDeque::new(),
        }
    }

    /// Simulation: make the broker (un)reachable.  Going unreachable
    /// drops the session and its subscriptions.
    pub fn sim_set_reachable(&mut self, reachable: bool) {
        self.reachable = reachable;
        if !reachable {
            self.connected = false;
            self.subscriptions.clear();
        }
    }

    /// Simulation: deliver a message as if the broker routed it here.
    /// Dropped unless the session is subscribed to `topic`.
    pub fn sim_deliver(&mut self, topic: &str, payload: &[u8]) {
        if !self.connected || !self.subscriptions.iter().any(|t| t == topic) {
            return;
        }
        if self.inbound.len() >= INBOUND_QUEUE_DEPTH {
            warn!("MQTT(sim): inbound queue full, message dropped");
            return;
        }
        self.inbound.push_back(InboundMessage {
            topic: topic.to_string(),
            payload: payload.to_vec(),
        });
    }

    pub fn published(&self) -> &[Published] {
        &self.published
    }

    pub fn subscriptions(&self) -> &[String] {
        &self.subscriptions
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }
}

#[cfg(not(target_os = "espidf"))]
impl TransportPort for MqttTransport {
    fn connect(&mut self, client_id: &str) -> Result<(), CommsError> {
        if !self.reachable {
            return Err(CommsError::TransportUnavailable);
        }
        self.client_id = Some(client_id.to_string());
        self.connected = true;
        self.subscriptions.clear();
        info!("MQTT(sim): connected to {} as '{}'", self.broker_url, client_id);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn publish(&mut self, topic: &str, payload: &[u8], retained: bool) -> Result<(), CommsError> {
        if !self.connected {
            return Err(CommsError::PublishFailed);
        }
        self.published.push(Published {
            topic: topic.to_string(),
            payload: payload.to_vec(),
            retained,
        });
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        if !self.connected {
            return Err(CommsError::SubscribeFailed);
        }
        if !self.subscriptions.iter().any(|t| t == topic) {
            self.subscriptions.push(topic.to_string());
        }
        Ok(())
    }

    fn poll_inbound(&mut self) -> Option<InboundMessage> {
        self.inbound.pop_front()
    }
}
