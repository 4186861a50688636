//! Cadence scheduling
//!
//! Four independent periodic triggers evaluated from the main loop: each
//! is a pure "elapsed time >= interval" check that fires and restarts.
//! A cadence restarts from the firing instant rather than from its
//! deadline, so a stalled loop never produces a burst of catch-up fires.
//! The caller is responsible for sleeping until [`Scheduler::next_deadline`].

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::config::Timing;
use crate::signal::SchedulerSignals;

/// The scheduler's periodic triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadenceKind {
    /// Marks pixel data dirty
    Refresh,
    /// Toggles the blink phase
    Blink,
    /// Advances the pattern step counters
    Animate,
    /// Marks a physical transmission due
    Push,
}

impl CadenceKind {
    pub const ALL: [Self; 4] = [Self::Refresh, Self::Blink, Self::Animate, Self::Push];

    /// Interval of this cadence under `timing`
    pub const fn interval(self, timing: &Timing) -> Duration {
        match self {
            Self::Refresh => timing.update(),
            Self::Blink => timing.blink(),
            Self::Animate => timing.animate(),
            Self::Push => timing.push(),
        }
    }
}

/// One periodic trigger
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    interval: Duration,
    last: Instant,
}

impl Cadence {
    pub const fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last: now,
        }
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Fire if the interval has elapsed since the last fire
    pub fn poll(&mut self, now: Instant) -> bool {
        let elapsed = now.as_millis().saturating_sub(self.last.as_millis());
        if elapsed >= self.interval.as_millis() {
            self.last = now;
            return true;
        }
        false
    }

    /// Cancel the running period and start a new one at `now`
    pub fn rearm(&mut self, interval: Duration, now: Instant) {
        self.interval = interval;
        self.last = now;
    }

    pub fn deadline(&self) -> Instant {
        self.last + self.interval
    }
}

/// The four cadences of the controller
#[derive(Debug, Clone)]
pub struct Scheduler {
    cadences: [Cadence; 4],
}

impl Scheduler {
    pub fn new(timing: &Timing, now: Instant) -> Self {
        Self {
            cadences: CadenceKind::ALL.map(|kind| Cadence::new(kind.interval(timing), now)),
        }
    }

    const fn slot(kind: CadenceKind) -> usize {
        match kind {
            CadenceKind::Refresh => 0,
            CadenceKind::Blink => 1,
            CadenceKind::Animate => 2,
            CadenceKind::Push => 3,
        }
    }

    pub const fn cadence(&self, kind: CadenceKind) -> &Cadence {
        &self.cadences[Self::slot(kind)]
    }

    /// Evaluate every cadence and raise the matching signals
    pub fn poll(&mut self, now: Instant, signals: &SchedulerSignals) {
        for kind in CadenceKind::ALL {
            if !self.cadences[Self::slot(kind)].poll(now) {
                continue;
            }
            match kind {
                CadenceKind::Refresh => signals.pixels_dirty.raise(),
                CadenceKind::Blink => signals.toggle_blink(),
                CadenceKind::Animate => signals.tick_animation(),
                CadenceKind::Push => signals.transmit_due.raise(),
            }
        }
    }

    /// Restart one cadence with its interval from `timing`
    pub fn rearm(&mut self, kind: CadenceKind, timing: &Timing, now: Instant) {
        let interval = kind.interval(timing);
        #[cfg(feature = "esp32-log")]
        println!(
            "[Scheduler.rearm] {:?} every {} ms",
            kind,
            interval.as_millis()
        );
        self.cadences[Self::slot(kind)].rearm(interval, now);
    }

    pub fn rearm_all(&mut self, timing: &Timing, now: Instant) {
        for kind in CadenceKind::ALL {
            self.rearm(kind, timing, now);
        }
    }

    /// Earliest instant at which any cadence fires
    pub fn next_deadline(&self) -> Instant {
        self.cadences
            .iter()
            .map(Cadence::deadline)
            .min()
            .unwrap_or(Instant::from_millis(0))
    }
}
