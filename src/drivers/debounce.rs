//! Interrupt-flagged, deferred-read input debouncer.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up.  The GPIO interrupt fires on
//! any edge; the ISR only raises an [`EdgeSignal`] (one atomic store).
//! [`DebouncedInput::evaluate`], called from the poll loop, turns that
//! flag into a scheduled read and confirms the level once the debounce
//! window has elapsed.
//!
//! ```text
//!  ISR ──raise()──▶ EdgeSignal ──take()──▶ evaluate(now)
//!                                            │ arm read at `now`
//!                                            ▼
//!                          now - scheduled_at > window ?
//!                                            │ sample pin
//!                                            ▼
//!                             level != last_stable → LevelChange
//! ```
//!
//! This is a level-confirmation debounce: any number of bounces inside
//! the window collapse into one read.  With [`DebouncePolicy::Fixed`] the
//! first edge fixes the read time and later bounces do not push it back;
//! [`DebouncePolicy::Extend`] restarts the window on every edge.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::digital::InputPin;
use log::warn;

use crate::config::DebouncePolicy;

/// "Something changed" flag shared between the ISR and the poll loop.
///
/// Single writer (ISR), single reader (poll loop).  Raising is one atomic
/// store: no allocation, no blocking, safe from interrupt context.
pub struct EdgeSignal {
    raised: AtomicBool,
}

impl EdgeSignal {
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    /// Mark that an edge occurred.  Idempotent until the next [`take`](Self::take).
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Read and clear the flag.
    pub fn take(&self) -> bool {
        self.raised.swap(false, Ordering::AcqRel)
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

impl Default for EdgeSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Edge flag for the door button; raised by the GPIO ISR in `main.rs`.
pub static BUTTON_EDGE: EdgeSignal = EdgeSignal::new();

/// A confirmed level transition on the monitored pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelChange {
    High,
    Low,
}

impl LevelChange {
    fn from_level(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }

    /// Electrical level after the change (`true` = HIGH).
    pub fn is_high(self) -> bool {
        matches!(self, Self::High)
    }
}

/// Debounced view of a single input pin.
pub struct DebouncedInput<P> {
    pin: P,
    signal: &'static EdgeSignal,
    window_ms: u64,
    policy: DebouncePolicy,
    /// When the confirming read was armed; `Some` means a read is pending.
    scheduled_at: Option<u64>,
    last_stable: bool,
}

impl<P: InputPin> DebouncedInput<P> {
    /// Take an initial synchronous sample as the boot-time stable level.
    pub fn new(
        mut pin: P,
        signal: &'static EdgeSignal,
        window_ms: u64,
        policy: DebouncePolicy,
    ) -> Result<Self, P::Error> {
        let last_stable = pin.is_high()?;
        Ok(Self {
            pin,
            signal,
            window_ms,
            policy,
            scheduled_at: None,
            last_stable,
        })
    }

    /// Same as [`EdgeSignal::raise`] on the bound signal.
    pub fn raise_edge_signal(&self) {
        self.signal.raise();
    }

    /// Call from the poll loop.  `now_ms` is monotonic milliseconds.
    /// Returns a change only once per confirmed transition.
    pub fn evaluate(&mut self, now_ms: u64) -> Option<LevelChange> {
        if self.signal.take() {
            match (self.policy, self.scheduled_at) {
                (DebouncePolicy::Fixed, Some(_)) => {}
                _ => self.scheduled_at = Some(now_ms),
            }
        }

        let scheduled_at = self.scheduled_at?;
        if now_ms.saturating_sub(scheduled_at) <= self.window_ms {
            return None;
        }
        self.scheduled_at = None;

        let level = match self.pin.is_high() {
            Ok(level) => level,
            Err(e) => {
                warn!("debounce: pin read failed ({e:?}), retrying after window");
                self.scheduled_at = Some(now_ms);
                return None;
            }
        };

        if level == self.last_stable {
            return None;
        }
        self.last_stable = level;
        Some(LevelChange::from_level(level))
    }

    /// Last confirmed level (`true` = HIGH).
    pub fn stable_level(&self) -> bool {
        self.last_stable
    }

    /// When the pending confirmation read was armed, if any.
    pub fn scheduled_at(&self) -> Option<u64> {
        self.scheduled_at
    }

    pub fn is_read_pending(&self) -> bool {
        self.scheduled_at.is_some()
    }

    /// Access the pin (e.g. to re-arm a one-shot GPIO interrupt).
    pub fn pin_mut(&mut self) -> &mut P {
        &mut self.pin
    }
}
