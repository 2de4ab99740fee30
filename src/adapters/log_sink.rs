//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::Status(notice) => {
                info!("DOOR | status=\"{}\"", notice.text());
            }
            AppEvent::PublishFailed { notice, error } => {
                warn!("DOOR | status=\"{}\" undelivered | err={}", notice.text(), error);
            }
            AppEvent::CommandAccepted { sender_timestamp } => {
                info!("CMD | accepted | sender_ts={}", sender_timestamp);
            }
            AppEvent::CommandRejected(reason) => {
                warn!("CMD | rejected | reason={}", reason);
            }
            AppEvent::ActuatorFault(e) => {
                warn!("FAULT | actuator | err={}", e);
            }
            AppEvent::LinkUp => {
                info!("LINK | up");
            }
            AppEvent::LinkDown => {
                warn!("LINK | down");
            }
        }
    }
}
