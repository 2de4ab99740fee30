//! Concrete state handler functions and table builder.
//!
//! Each state is defined by three plain `fn` pointers: no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!  SECURED ──[authenticated unlock]──▶ UNLOCKED_WINDOW
//!     ▲  ▲                                 │      │
//!     │  └────────[window expired]─────────┘      │
//!     │                                     [button pressed]
//!     │                                           ▼
//!     └──────────[pulse expired]────────────── OPENING
//! ```
//!
//! Leaving `UnlockedWindow` by either path emits "secured"; entering
//! `Opening` then emits "opening", so an opening always reports the
//! secure first.  An unlock that arrives during `Opening` is held and
//! opens a fresh window on the first tick back in `Secured`.

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use crate::app::events::StatusNotice;
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Secured
        StateDescriptor {
            id: StateId::Secured,
            name: "Secured",
            on_enter: Some(secured_enter),
            on_exit: None,
            on_update: secured_update,
        },
        // Index 1: UnlockedWindow
        StateDescriptor {
            id: StateId::UnlockedWindow,
            name: "UnlockedWindow",
            on_enter: Some(unlocked_enter),
            on_exit: Some(unlocked_exit),
            on_update: unlocked_update,
        },
        // Index 2: Opening
        StateDescriptor {
            id: StateId::Opening,
            name: "Opening",
            on_enter: Some(opening_enter),
            on_exit: Some(opening_exit),
            on_update: opening_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  SECURED state
// ═══════════════════════════════════════════════════════════════════════════

fn secured_enter(ctx: &mut FsmContext) {
    ctx.door.unlocked_for_entry = false;
    ctx.door.actuator_engaged = false;
    ctx.door.unlock_deadline = None;
    ctx.door.open_deadline = None;
    info!("SECURED: strike released, button inactive");
}

fn secured_update(ctx: &mut FsmContext) -> Option<StateId> {
    if let Some(cmd) = ctx.inputs.unlock.take() {
        ctx.deferred_unlock = None;
        info!("SECURED: unlock accepted (sender ts={})", cmd.sender_timestamp);
        return Some(StateId::UnlockedWindow);
    }

    if let Some(cmd) = ctx.deferred_unlock.take() {
        info!("SECURED: applying unlock held during opening (sender ts={})", cmd.sender_timestamp);
        return Some(StateId::UnlockedWindow);
    }

    if ctx.inputs.button_pressed {
        debug!("SECURED: button press ignored");
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  UNLOCKED_WINDOW state: button press will open the door
// ═══════════════════════════════════════════════════════════════════════════

fn unlocked_enter(ctx: &mut FsmContext) {
    ctx.door.unlocked_for_entry = true;
    ctx.door.unlock_deadline = Some(ctx.deadline_after(ctx.config.unlock_window_ms));
    ctx.notify(StatusNotice::Unlocked);
    info!("UNLOCKED: window open for {} ms", ctx.config.unlock_window_ms);
}

fn unlocked_exit(ctx: &mut FsmContext) {
    ctx.door.unlocked_for_entry = false;
    ctx.door.unlock_deadline = None;
    ctx.notify(StatusNotice::Secured);
}

fn unlocked_update(ctx: &mut FsmContext) -> Option<StateId> {
    // Expiry is checked first: a press confirmed after the deadline must
    // not open the door.
    if ctx.is_past(ctx.door.unlock_deadline) {
        info!("UNLOCKED: window expired after {} ms without a press", ctx.ms_in_state());
        return Some(StateId::Secured);
    }

    if ctx.inputs.button_pressed {
        info!("UNLOCKED: button pressed -> opening");
        return Some(StateId::Opening);
    }

    // A further unlock refreshes the window.
    if let Some(cmd) = ctx.inputs.unlock.take() {
        ctx.door.unlock_deadline = Some(ctx.deadline_after(ctx.config.unlock_window_ms));
        ctx.notify(StatusNotice::Unlocked);
        info!("UNLOCKED: window refreshed (sender ts={})", cmd.sender_timestamp);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  OPENING state: strike energised for the open pulse
// ═══════════════════════════════════════════════════════════════════════════

fn opening_enter(ctx: &mut FsmContext) {
    ctx.door.actuator_engaged = true;
    ctx.door.open_deadline = Some(ctx.deadline_after(ctx.config.open_pulse_ms));
    ctx.notify(StatusNotice::Opening);
    info!("OPENING: strike energised for {} ms", ctx.config.open_pulse_ms);
}

fn opening_exit(ctx: &mut FsmContext) {
    ctx.door.actuator_engaged = false;
    ctx.door.open_deadline = None;
    info!("OPENING: strike released after {} ms", ctx.ms_in_state());
}

fn opening_update(ctx: &mut FsmContext) -> Option<StateId> {
    if let Some(cmd) = ctx.inputs.unlock.take() {
        info!("OPENING: unlock held until the strike is released (sender ts={})", cmd.sender_timestamp);
        ctx.deferred_unlock = Some(cmd);
    }

    if ctx.is_past(ctx.door.open_deadline) {
        return Some(StateId::Secured);
    }

    None
}
