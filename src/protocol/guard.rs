//! Admission policy around the authenticator.
//!
//! * [`InboundThrottle`]: token bucket in front of digest computation
//!   (via `burster`), so a flood of junk cannot monopolise the poll loop.
//! * [`ReplayGuard`]: sender timestamps must strictly increase.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use burster::Limiter;
use core::time::Duration;
use log::warn;

use crate::error::AuthError;

// ── Replay guard ─────────────────────────────────────────────

/// Rejects authenticated commands whose sender timestamp is not newer
/// than the last accepted one.  Disabled guards accept everything.
#[derive(Debug, Clone)]
pub struct ReplayGuard {
    enabled: bool,
    last_accepted: Option<u64>,
}

impl ReplayGuard {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            last_accepted: None,
        }
    }

    /// Record `sender_timestamp` if it is fresh.
    pub fn check(&mut self, sender_timestamp: u64) -> Result<(), AuthError> {
        if !self.enabled {
            return Ok(());
        }
        if let Some(last) = self.last_accepted {
            if sender_timestamp <= last {
                warn!("auth: timestamp regression (got {sender_timestamp}, last {last})");
                return Err(AuthError::Replayed);
            }
        }
        self.last_accepted = Some(sender_timestamp);
        Ok(())
    }

    pub fn last_accepted(&self) -> Option<u64> {
        self.last_accepted
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

// ── Inbound throttle ─────────────────────────────────────────

/// Bounds how many inbound messages per second reach the authenticator.
///
/// The bucket runs on the controller's clock: [`set_now`](Self::set_now)
/// is fed from every tick, so refills follow the same monotonic
/// milliseconds as the door deadlines.  The throttle sits in front of
/// authentication, so a flood of unauthenticated junk also drains the
/// tokens of a genuine sender until the flood stops; the sender's retry
/// then gets through.
pub struct InboundThrottle {
    now_ms: Arc<AtomicU64>,
    bucket: burster::TokenBucket<Box<dyn Fn() -> Duration + Send>>,
}

impl InboundThrottle {
    /// `per_sec` tokens per second with an equal burst capacity.  The
    /// clock starts at 0 ms.
    pub fn new(per_sec: u32) -> Self {
        let rate = u64::from(per_sec.max(1));
        let now_ms = Arc::new(AtomicU64::new(0));
        let clock = Arc::clone(&now_ms);
        let provider: Box<dyn Fn() -> Duration + Send> =
            Box::new(move || Duration::from_millis(clock.load(Ordering::Relaxed)));
        Self {
            now_ms,
            bucket: burster::TokenBucket::new_with_time_provider(rate, rate, provider),
        }
    }

    /// Advance the bucket's clock.  Earlier values are ignored.
    pub fn set_now(&self, now_ms: u64) {
        self.now_ms.fetch_max(now_ms, Ordering::Relaxed);
    }

    /// Consume one token; `Throttled` when the bucket is empty.
    pub fn admit(&mut self) -> Result<(), AuthError> {
        self.bucket
            .try_consume(1)
            .map_err(|_| AuthError::Throttled)
    }
}

// ── Tests ────────────────────────────────────────────────────
