//! Simulation time model.
//!
//! Time is a monotonically increasing `Tick` counter.  `SimClock` maps ticks
//! to simulated milliseconds:
//!
//!   now_ms = tick * ms_per_tick
//!
//! All order windows, blockage durations, and alert ages are expressed in
//! simulated milliseconds, so changing the tick resolution never changes the
//! meaning of a configured duration.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// Number of clock steps since the session (re)started.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    #[inline]
    pub fn next(self) -> Tick {
        Tick(self.0 + 1)
    }

    /// Steps elapsed since `earlier`; zero if `earlier` is in the future.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// `true` on every `period`-th tick (never for period 0, never at tick 0).
    #[inline]
    pub fn is_multiple_of(self, period: u64) -> bool {
        period != 0 && self.0 != 0 && self.0 % period == 0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick {}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// The session clock: current tick plus the tick-to-ms resolution.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Simulated milliseconds represented by one tick.  Default: 1000.
    pub ms_per_tick:  u64,
    /// Advanced once at the end of every `Sim::tick`.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(ms_per_tick: u64) -> Self {
        Self { ms_per_tick, current_tick: Tick::ZERO }
    }

    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = self.current_tick.next();
    }

    /// Back to tick 0, keeping the resolution.
    pub fn reset(&mut self) {
        self.current_tick = Tick::ZERO;
    }

    /// Simulated milliseconds elapsed since tick 0.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.current_tick.0 * self.ms_per_tick
    }

    /// How many ticks span `ms` milliseconds (rounded up).
    #[inline]
    pub fn ticks_for_ms(&self, ms: u64) -> u64 {
        ms.div_ceil(self.ms_per_tick.max(1))
    }

    /// Break elapsed time into (hours, minutes, seconds).
    pub fn elapsed_hms(&self) -> (u64, u32, u32) {
        let total_secs = self.now_ms() / 1000;
        let hours = total_secs / 3_600;
        let minutes = ((total_secs % 3_600) / 60) as u32;
        let seconds = (total_secs % 60) as u32;
        (hours, minutes, seconds)
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = self.elapsed_hms();
        write!(f, "{} @ {h:02}:{m:02}:{s:02}", self.current_tick)
    }
}
