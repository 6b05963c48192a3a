//! Millisecond tick clock and polling timers.
//!
//! The clock is a process-wide monotonic counter advanced from the
//! platform tick interrupt via [`tick`]; task code only ever reads it.
//! Timers have no callbacks: arm one, then poll [`Timer::is_expired`]
//! from a task handler. Expiry is observed the next time the owning
//! task runs after the deadline, so this is deliberately not an
//! accurate timer.
//!
//! All arithmetic is wrapping, so expiry checks stay correct across
//! the u32 rollover (about 49.7 days at 1 kHz).

use core::sync::atomic::{AtomicU32, Ordering};

static TICKS_MS: AtomicU32 = AtomicU32::new(0);

/// Advance the clock by `ms` milliseconds.
///
/// Interrupt context; typically `tick(1)` from a 1 kHz timer ISR.
pub fn tick(ms: u32) {
    TICKS_MS.fetch_add(ms, Ordering::Release);
}

/// Current clock reading in milliseconds since boot (mod 2^32).
pub fn now_ms() -> u32 {
    TICKS_MS.load(Ordering::Acquire)
}

/// A polling stopwatch, owned by whichever module creates it.
///
/// Armed at construction; re-armed with [`set`](Timer::set). Once the
/// deadline passes, [`is_expired`](Timer::is_expired) stays true until
/// the next `set` — so always re-arm after consuming an expiry, or
/// leave a zero-duration timer permanently expired to mean
/// "always ready".
pub struct Timer {
    armed_at: u32,
    duration_ms: u32,
}

impl Timer {
    /// Create a timer that expires `duration_ms` from now.
    pub fn new(duration_ms: u32) -> Self {
        Self {
            armed_at: now_ms(),
            duration_ms,
        }
    }

    /// Re-arm: the new deadline is `duration_ms` from *now*, not from
    /// the previous deadline. Accumulated drift versus a fixed-period
    /// design is expected and accepted.
    pub fn set(&mut self, duration_ms: u32) {
        self.armed_at = now_ms();
        self.duration_ms = duration_ms;
    }

    /// Has the deadline passed? Non-destructive and non-blocking.
    pub fn is_expired(&self) -> bool {
        expired(now_ms(), self.armed_at, self.duration_ms)
    }

    /// Milliseconds until expiry; 0 once expired.
    pub fn remaining_ms(&self) -> u32 {
        let elapsed = now_ms().wrapping_sub(self.armed_at);
        self.duration_ms.saturating_sub(elapsed)
    }
}

fn expired(now: u32, armed_at: u32, duration_ms: u32) -> bool {
    now.wrapping_sub(armed_at) >= duration_ms
}
