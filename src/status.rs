//! Status indicator mode machine
//!
//! A single status LED shows the controller's health as a breathing color.
//! Each mode has its own target color, breathing period and step size.
//! `Startup` moves to `Normal` once initialization succeeds; `Error` is
//! terminal until the device resets.

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::color::{Rgb, rgb_from_u32, scale_color};
use crate::math8::{scale8, triangle8};

/// Lowest breathing level
const BREATH_FLOOR: u8 = 16;

/// Level multiplier applied during the off phase of the blink cadence
const OFF_PHASE_SCALE: u8 = 160;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMode {
    Startup,
    Normal,
    Error,
}

/// Color and breathing shape of a mode
#[derive(Debug, Clone, Copy)]
struct Breathing {
    color: Rgb,
    period: Duration,
    step: u8,
}

impl StatusMode {
    const fn breathing(self) -> Breathing {
        match self {
            Self::Startup => Breathing {
                color: rgb_from_u32(0x00_00FF),
                period: Duration::from_millis(10),
                step: 8,
            },
            Self::Normal => Breathing {
                color: rgb_from_u32(0x00_FF00),
                period: Duration::from_millis(30),
                step: 4,
            },
            Self::Error => Breathing {
                color: rgb_from_u32(0xFF_0000),
                period: Duration::from_millis(5),
                step: 16,
            },
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Normal => "normal",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusIndicator {
    mode: StatusMode,
    level: u8,
    rising: bool,
    blink_phase: bool,
    last_step: Instant,
    current: Rgb,
}

impl StatusIndicator {
    pub const fn new(now: Instant) -> Self {
        Self {
            mode: StatusMode::Startup,
            level: BREATH_FLOOR,
            rising: true,
            blink_phase: true,
            last_step: now,
            current: Rgb { r: 0, g: 0, b: 0 },
        }
    }

    pub const fn mode(&self) -> StatusMode {
        self.mode
    }

    pub const fn color(&self) -> Rgb {
        self.current
    }

    /// Initialization finished; ignored once in `Error`
    pub fn enter_normal(&mut self) {
        if self.mode == StatusMode::Startup {
            self.set_mode(StatusMode::Normal);
        }
    }

    /// Fatal until reboot
    pub fn enter_error(&mut self) {
        self.set_mode(StatusMode::Error);
    }

    fn set_mode(&mut self, mode: StatusMode) {
        #[cfg(feature = "esp32-log")]
        println!("[StatusIndicator] {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        self.level = BREATH_FLOOR;
        self.rising = true;
    }

    /// Blink cadence fired
    pub fn on_blink(&mut self, phase: bool) {
        self.blink_phase = phase;
    }

    /// Advance the breathing wave by the elapsed time.
    ///
    /// Returns the new color when it differs from the last one reported.
    pub fn advance(&mut self, now: Instant) -> Option<Rgb> {
        let breathing = self.mode.breathing();
        let period = breathing.period.as_millis().max(1);
        let elapsed = now.as_millis().saturating_sub(self.last_step.as_millis());
        let steps = elapsed / period;
        if steps > 0 {
            self.last_step += Duration::from_millis(steps * period);
            // One step per elapsed period, bounded to a single full sweep.
            for _ in 0..steps.min(u64::from(u8::MAX / breathing.step.max(1)) * 2) {
                let (level, rising) =
                    triangle8(self.level, breathing.step, BREATH_FLOOR, self.rising);
                self.level = level;
                self.rising = rising;
            }
        }

        let mut level = self.level;
        if self.mode == StatusMode::Normal && !self.blink_phase {
            level = scale8(level, OFF_PHASE_SCALE);
        }
        let color = scale_color(breathing.color, level);
        if color == self.current {
            return None;
        }
        self.current = color;
        Some(color)
    }
}
