//! Fixed-interval tick pacing without catch-up.
//!
//! Each tick measures its own start time. Whatever is left of the period is
//! slept; an overrun sleeps nothing and the next tick simply starts late, so
//! a slow tick never triggers a burst of back-to-back ticks.

use crate::config::TICK_US;

/// Computes the sleep that completes a tick.
#[derive(Clone, Copy, Debug)]
pub struct TickPacer {
    period_us: u64,
    overruns: u32,
}

impl TickPacer {
    #[must_use]
    pub const fn new(period_us: u64) -> Self {
        Self {
            period_us,
            overruns: 0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn period_us(&self) -> u64 {
        self.period_us
    }

    /// Number of ticks so far that took longer than the period.
    #[inline]
    #[must_use]
    pub const fn overruns(&self) -> u32 {
        self.overruns
    }

    /// Microseconds left in the tick that started at `started_us`.
    ///
    /// Returns 0 and counts an overrun when the period is already used up.
    pub fn remaining_us(&mut self, started_us: u64, now_us: u64) -> u64 {
        let elapsed = now_us.saturating_sub(started_us);
        if elapsed > self.period_us {
            self.overruns = self.overruns.wrapping_add(1);
            trace!("tick overran by {} us", elapsed - self.period_us);
            return 0;
        }
        self.period_us - elapsed
    }
}

impl Default for TickPacer {
    fn default() -> Self {
        Self::new(TICK_US)
    }
}
