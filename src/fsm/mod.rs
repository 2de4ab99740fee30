//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern ported to Rust:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                     │
//! │  ┌────────────────┬───────────┬──────────┬───────────────────┐  │
//! │  │ StateId        │ on_enter  │ on_exit  │ on_update         │  │
//! │  ├────────────────┼───────────┼──────────┼───────────────────┤  │
//! │  │ Secured        │ fn(ctx)   │ -        │ fn(ctx)->Option<> │  │
//! │  │ UnlockedWindow │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ Opening        │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  └────────────────┴───────────┴──────────┴───────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the
//! current pointer.  At most one transition happens per tick, and the
//! inputs latched for the tick are cleared afterwards whether or not
//! they were used.

pub mod context;
pub mod states;

use context::{DoorInputs, FsmContext};
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all door states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    /// Strike released, button presses ignored.
    Secured = 0,
    /// Remote unlock received; a button press opens the door.
    UnlockedWindow = 1,
    /// Strike energised for the open pulse.
    Opening = 2,
}

impl StateId {
    /// Total number of states: used to size the table array.
    pub const COUNT: usize = 3;

    /// Convert an index back to `StateId`.  Panics on out-of-range in
    /// debug builds; returns `Secured` in release (safe fallback).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Secured,
            1 => Self::UnlockedWindow,
            2 => Self::Opening,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Secured
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array: no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table (array of [`StateDescriptor`]); the mutable
/// [`FsmContext`] is owned by the caller and threaded through every
/// handler call.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, row)| row.id as usize == i),
            "state table rows must be ordered by StateId"
        );
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        ctx.entered_at_ms = ctx.now_ms;
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.  `ctx.now_ms` and `ctx.inputs` must
    /// already hold this tick's values.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    /// 3. Clear the inputs.
    ///
    /// Returns the `(from, to)` pair when a transition happened.
    pub fn tick(&mut self, ctx: &mut FsmContext) -> Option<(StateId, StateId)> {
        let from = self.current_state();
        let next = (self.table[self.current].on_update)(ctx);

        let changed = match next {
            Some(next_id) if next_id as usize != self.current => {
                self.transition(next_id, ctx);
                Some((from, next_id))
            }
            _ => None,
        };

        ctx.inputs = DoorInputs::default();
        changed
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        // Exit current state
        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        // Update pointer and timing
        self.current = next_idx;
        ctx.entered_at_ms = ctx.now_ms;

        // Enter new state
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
