//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to: the current time, the inputs latched for this tick, the door
//! record, configuration, and the status notices produced by transitions.

use log::warn;

use crate::app::commands::AuthenticatedCommand;
use crate::app::events::StatusNotice;
use crate::config::LockConfig;

/// Upper bound on notices one tick can produce (exit + enter + refresh).
pub const MAX_NOTICES: usize = 4;

// ---------------------------------------------------------------------------
// Inputs (written by the controller; consumed by exactly one tick)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoorInputs {
    /// The debouncer confirmed a transition to "pressed" this tick.
    pub button_pressed: bool,
    /// An authenticated command is waiting to be applied.
    pub unlock: Option<AuthenticatedCommand>,
}

// ---------------------------------------------------------------------------
// Door record (owned by the FSM; mirrored onto the outputs)
// ---------------------------------------------------------------------------

/// Logical door state.
///
/// * `unlocked_for_entry`: the unlock window is open: a button press
///   will open the door.  The indicator LED mirrors this flag.
/// * `actuator_engaged`: the strike is energised (open pulse running).
///
/// `unlock_deadline` is `Some` exactly while `unlocked_for_entry` is set;
/// `open_deadline` is `Some` exactly while `actuator_engaged` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoorState {
    pub unlocked_for_entry: bool,
    pub actuator_engaged: bool,
    pub unlock_deadline: Option<u64>,
    pub open_deadline: Option<u64>,
}

impl DoorState {
    /// Fully secured: window closed, strike released.
    pub fn secured() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Monotonic time of the current tick (ms).  Set before each tick.
    pub now_ms: u64,
    /// Time at which the current state was entered (ms).
    pub entered_at_ms: u64,

    // -- Inputs --
    pub inputs: DoorInputs,
    /// Unlock accepted during the open pulse, applied once `Secured`.
    /// Survives the per-tick input clear.
    pub deferred_unlock: Option<AuthenticatedCommand>,

    // -- Door --
    pub door: DoorState,

    // -- Configuration --
    pub config: LockConfig,

    // -- Outbound --
    /// Status notices produced this tick, in emission order.
    /// Drained by the controller after every tick.
    pub notices: heapless::Vec<StatusNotice, MAX_NOTICES>,
}

impl FsmContext {
    pub fn new(config: LockConfig) -> Self {
        Self {
            now_ms: 0,
            entered_at_ms: 0,
            inputs: DoorInputs::default(),
            deferred_unlock: None,
            door: DoorState::secured(),
            config,
            notices: heapless::Vec::new(),
        }
    }

    /// Queue a status notice for publication.
    pub fn notify(&mut self, notice: StatusNotice) {
        if self.notices.push(notice).is_err() {
            warn!("status notice dropped (queue full): {:?}", notice);
        }
    }

    /// `now + duration`, pinned at `u64::MAX` instead of overflowing.
    pub fn deadline_after(&self, duration_ms: u64) -> u64 {
        self.now_ms.saturating_add(duration_ms)
    }

    /// `true` once `now` is strictly past `deadline`.
    pub fn is_past(&self, deadline: Option<u64>) -> bool {
        deadline.is_some_and(|d| self.now_ms > d)
    }

    /// Milliseconds elapsed since the current state was entered.
    pub fn ms_in_state(&self) -> u64 {
        self.now_ms.saturating_sub(self.entered_at_ms)
    }
}
