//! Application service: the hexagonal core.
//!
//! [`LockController`] owns the debounced button, the door FSM, and the
//! command gate.  It is constructed once at startup and driven by the
//! poll loop.  All I/O flows through port traits injected at call sites,
//! making the entire controller testable with mock adapters.
//!
//! ```text
//!  TransportPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!   (inbound)        │        LockController        │
//!  InputPin ───────▶ │ Debounce · Gate · Door FSM   │ ──▶ TransportPort
//!                    └──────────────────────────────┘      (status)
//!                                   │
//!                                   ▼
//!                              ActuatorPort
//! ```
//!
//! Gate order for inbound payloads: topic filter → throttle →
//! authenticate → replay guard.  An accepted unlock is latched and
//! applied by the next [`tick`](LockController::tick).  The throttle
//! refills on the time of the most recent tick.

use embedded_hal::digital::InputPin;
use log::{debug, info, warn};

use crate::config::LockConfig;
use crate::drivers::debounce::DebouncedInput;
use crate::error::{AuthError, CommsError};
use crate::fsm::context::{DoorState, FsmContext};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::protocol::{CommandAuthenticator, InboundThrottle, ReplayGuard, SharedSecret};

use super::commands::{AuthenticatedCommand, Command};
use super::events::{AppEvent, StatusNotice};
use super::ports::{ActuatorPort, EventSink, InboundMessage, TransportPort};

/// Output levels last written successfully to the hardware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct AppliedOutputs {
    strike: Option<bool>,
    indicator: Option<bool>,
}

// ───────────────────────────────────────────────────────────────
// LockController
// ───────────────────────────────────────────────────────────────

/// Top-level controller: one instance, threaded through the poll loop.
pub struct LockController<P: InputPin> {
    fsm: Fsm,
    ctx: FsmContext,
    button: DebouncedInput<P>,
    authenticator: CommandAuthenticator,
    replay: ReplayGuard,
    throttle: InboundThrottle,
    /// Accepted command waiting for the next tick.
    pending_unlock: Option<AuthenticatedCommand>,
    applied: AppliedOutputs,
}

impl<P: InputPin> LockController<P> {
    /// Construct the controller.  Does **not** start the FSM: call
    /// [`start`](Self::start) next.
    pub fn new(config: LockConfig, secret: SharedSecret, button: DebouncedInput<P>) -> Self {
        let replay = ReplayGuard::new(config.replay_guard);
        let throttle = InboundThrottle::new(config.inbound_rate_per_sec);
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::Secured);

        Self {
            fsm,
            ctx,
            button,
            authenticator: CommandAuthenticator::new(secret),
            replay,
            throttle,
            pending_unlock: None,
            applied: AppliedOutputs::default(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter `Secured` and force every output off.
    pub fn start(&mut self, now_ms: u64, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        self.ctx.now_ms = now_ms;
        self.throttle.set_now(now_ms);
        self.fsm.start(&mut self.ctx);
        hw.all_off();
        self.applied = AppliedOutputs {
            strike: Some(false),
            indicator: Some(false),
        };
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("LockController started in {:?}", self.fsm.current_state());
    }

    // ── Inbound commands ──────────────────────────────────────

    /// Route one transport message.  Messages on any topic other than the
    /// command topic are ignored.
    pub fn handle_message(&mut self, msg: &InboundMessage, sink: &mut impl EventSink) {
        if msg.topic != self.ctx.config.command_topic {
            debug!("inbound: ignoring message on '{}'", msg.topic);
            return;
        }
        // Rejections are already logged and emitted.
        let _ = self.submit_payload(&msg.payload, sink);
    }

    /// Run a command-topic payload through the gate.  On success the
    /// command is latched for the next tick.
    pub fn submit_payload(
        &mut self,
        payload: &[u8],
        sink: &mut impl EventSink,
    ) -> Result<Command, AuthError> {
        match self.admit(payload) {
            Ok(cmd) => {
                info!("inbound: {} accepted (sender ts={})", cmd.command.name(), cmd.sender_timestamp);
                self.pending_unlock = Some(cmd);
                sink.emit(&AppEvent::CommandAccepted {
                    sender_timestamp: cmd.sender_timestamp,
                });
                Ok(cmd.command)
            }
            Err(e) => {
                warn!("inbound: payload rejected: {e}");
                sink.emit(&AppEvent::CommandRejected(e));
                Err(e)
            }
        }
    }

    fn admit(&mut self, payload: &[u8]) -> Result<AuthenticatedCommand, AuthError> {
        self.throttle.admit()?;
        let cmd = self.authenticator.authenticate(payload)?;
        self.replay.check(cmd.sender_timestamp)?;
        Ok(cmd)
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one cycle: debounce → FSM → outputs → status publication.
    ///
    /// Status publication is best-effort: a failed publish is reported
    /// through the sink and never rolls back the transition.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        transport: &mut impl TransportPort,
        sink: &mut impl EventSink,
    ) {
        self.ctx.now_ms = now_ms;
        self.throttle.set_now(now_ms);

        // 1. Debounced button
        if let Some(change) = self.button.evaluate(now_ms) {
            let pressed = change.is_high() != self.ctx.config.button_active_low;
            debug!("button: confirmed {:?} (pressed={})", change, pressed);
            self.ctx.inputs.button_pressed = pressed;
        }

        // 2. Latched remote command
        self.ctx.inputs.unlock = self.pending_unlock.take();

        // 3. FSM tick (pure state logic)
        let changed = self.fsm.tick(&mut self.ctx);

        // 4. Mirror the door record onto the outputs
        self.apply_outputs(hw, sink);

        // 5. Publish notices in emission order
        self.publish_notices(transport, sink);

        // 6. Emit state change if the FSM moved
        if let Some((from, to)) = changed {
            sink.emit(&AppEvent::StateChanged { from, to });
        }
    }

    fn apply_outputs(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        let strike = self.ctx.door.actuator_engaged;
        if self.applied.strike != Some(strike) {
            match hw.set_strike(strike) {
                Ok(()) => self.applied.strike = Some(strike),
                Err(e) => {
                    warn!("outputs: strike write failed: {e}");
                    self.applied.strike = None;
                    sink.emit(&AppEvent::ActuatorFault(e));
                }
            }
        }

        let indicator = self.ctx.door.unlocked_for_entry;
        if self.applied.indicator != Some(indicator) {
            match hw.set_indicator(indicator) {
                Ok(()) => self.applied.indicator = Some(indicator),
                Err(e) => {
                    warn!("outputs: indicator write failed: {e}");
                    self.applied.indicator = None;
                    sink.emit(&AppEvent::ActuatorFault(e));
                }
            }
        }
    }

    fn publish_notices(&mut self, transport: &mut impl TransportPort, sink: &mut impl EventSink) {
        let notices = core::mem::take(&mut self.ctx.notices);
        for notice in notices {
            sink.emit(&AppEvent::Status(notice));
            if let Err(error) = self.publish_status(notice, transport) {
                warn!("status '{}' not delivered: {error}", notice.text());
                sink.emit(&AppEvent::PublishFailed { notice, error });
            }
        }
    }

    fn publish_status(
        &self,
        notice: StatusNotice,
        transport: &mut impl TransportPort,
    ) -> Result<(), CommsError> {
        if !transport.is_connected() {
            return Err(CommsError::TransportUnavailable);
        }
        transport.publish(&self.ctx.config.status_topic, notice.text().as_bytes(), false)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn door(&self) -> &DoorState {
        &self.ctx.door
    }

    pub fn config(&self) -> &LockConfig {
        &self.ctx.config
    }

    pub fn has_pending_unlock(&self) -> bool {
        self.pending_unlock.is_some()
    }

    pub fn replay_guard(&self) -> &ReplayGuard {
        &self.replay
    }

    /// The debounced button (e.g. to re-arm its GPIO interrupt).
    pub fn button_mut(&mut self) -> &mut DebouncedInput<P> {
        &mut self.button
    }
}
