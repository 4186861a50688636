//! Cross-context signals
//!
//! Timer callbacks (or the cooperative scheduler standing in for them) only
//! ever raise flags and bump counters here. The main loop consumes them on
//! its own turn, so buffers and configuration are never shared with an
//! interrupt context.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Single-writer, single-reader flag with at most one pending signal
#[derive(Debug, Default)]
pub struct Signal(AtomicBool);

impl Signal {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Consume the pending signal, if any
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Flags and counters raised by the cadences
#[derive(Debug, Default)]
pub struct SchedulerSignals {
    /// Pixel buffers must be re-rendered
    pub pixels_dirty: Signal,
    /// Buffers must be transmitted
    pub transmit_due: Signal,
    /// The blink phase flipped since the last check
    pub blink_toggled: Signal,
    blink_phase: AtomicBool,
    animation_ticks: AtomicU8,
}

impl SchedulerSignals {
    pub const fn new() -> Self {
        Self {
            pixels_dirty: Signal::new(),
            transmit_due: Signal::new(),
            blink_toggled: Signal::new(),
            blink_phase: AtomicBool::new(false),
            animation_ticks: AtomicU8::new(0),
        }
    }

    /// Flip the global blink phase
    pub fn toggle_blink(&self) {
        self.blink_phase.fetch_xor(true, Ordering::AcqRel);
        self.blink_toggled.raise();
    }

    pub fn blink_phase(&self) -> bool {
        self.blink_phase.load(Ordering::Acquire)
    }

    /// Record one animation tick
    pub fn tick_animation(&self) {
        let _ = self
            .animation_ticks
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |ticks| {
                Some(ticks.saturating_add(1))
            });
    }

    /// Consume the pending animation ticks
    pub fn take_animation_ticks(&self) -> u8 {
        self.animation_ticks.swap(0, Ordering::AcqRel)
    }
}
