//! Pattern library with compile-time known pattern variants
//!
//! Patterns 0-7 are two-phase patterns driven by the global blink phase.
//! Patterns 8-12 are continuous animations driven by a per-pattern step
//! counter; their trails fade progressively instead of being cleared.

mod blink;
mod sweep;

use crate::color::{Rgb, fade_to_black_by, fill};

/// Number of patterns in the library
pub const PATTERN_COUNT: usize = 13;

const PATTERN_NAME_SOLID: &str = "solid";
const PATTERN_NAME_BLINK: &str = "blink";
const PATTERN_NAME_BLINK_INVERSE: &str = "blink_inverse";
const PATTERN_NAME_HALF_SWAP: &str = "half_swap";
const PATTERN_NAME_QUARTER_SWAP: &str = "quarter_swap";
const PATTERN_NAME_ALTERNATE: &str = "alternate";
const PATTERN_NAME_GATED: &str = "gated";
const PATTERN_NAME_GATED_BLINK: &str = "gated_blink";
const PATTERN_NAME_SWEEP_UP: &str = "sweep_up";
const PATTERN_NAME_SWEEP_DOWN: &str = "sweep_down";
const PATTERN_NAME_BOUNCE: &str = "bounce";
const PATTERN_NAME_CONVERGE: &str = "converge";
const PATTERN_NAME_DIVERGE: &str = "diverge";

const PATTERN_ID_SOLID: u8 = 0;
const PATTERN_ID_BLINK: u8 = 1;
const PATTERN_ID_BLINK_INVERSE: u8 = 2;
const PATTERN_ID_HALF_SWAP: u8 = 3;
const PATTERN_ID_QUARTER_SWAP: u8 = 4;
const PATTERN_ID_ALTERNATE: u8 = 5;
const PATTERN_ID_GATED: u8 = 6;
const PATTERN_ID_GATED_BLINK: u8 = 7;
const PATTERN_ID_SWEEP_UP: u8 = 8;
const PATTERN_ID_SWEEP_DOWN: u8 = 9;
const PATTERN_ID_BOUNCE: u8 = 10;
const PATTERN_ID_CONVERGE: u8 = 11;
const PATTERN_ID_DIVERGE: u8 = 12;

/// Known pattern ids
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PatternId {
    /// All pixels lit
    Solid = PATTERN_ID_SOLID,
    /// All pixels lit in the on phase
    Blink = PATTERN_ID_BLINK,
    /// All pixels lit in the off phase
    BlinkInverse = PATTERN_ID_BLINK_INVERSE,
    /// Left half and right half take turns
    HalfSwap = PATTERN_ID_HALF_SWAP,
    /// Outer quarters and inner half take turns
    QuarterSwap = PATTERN_ID_QUARTER_SWAP,
    /// Odd and even pixels take turns
    Alternate = PATTERN_ID_ALTERNATE,
    /// Outer thirds lit, middle dark
    Gated = PATTERN_ID_GATED,
    /// Gated shape lit in the on phase
    GatedBlink = PATTERN_ID_GATED_BLINK,
    /// One pixel moving towards the end of the group
    SweepUp = PATTERN_ID_SWEEP_UP,
    /// One pixel moving towards the start of the group
    SweepDown = PATTERN_ID_SWEEP_DOWN,
    /// One pixel moving up then down
    Bounce = PATTERN_ID_BOUNCE,
    /// Two pixels moving from both ends to the center
    Converge = PATTERN_ID_CONVERGE,
    /// Two pixels moving from the center to both ends
    Diverge = PATTERN_ID_DIVERGE,
}

/// Inputs of one pattern draw
#[derive(Debug, Clone, Copy)]
pub struct PatternFrame {
    pub color: Rgb,
    /// Global blink phase
    pub phase: bool,
    /// Raw step counter of the pattern; reduced by the pattern's period
    pub step: u32,
    /// Fade applied to unlit pixels of two-phase patterns
    pub blink_fade: u8,
}

impl PatternId {
    pub const ALL: [Self; PATTERN_COUNT] = [
        Self::Solid,
        Self::Blink,
        Self::BlinkInverse,
        Self::HalfSwap,
        Self::QuarterSwap,
        Self::Alternate,
        Self::Gated,
        Self::GatedBlink,
        Self::SweepUp,
        Self::SweepDown,
        Self::Bounce,
        Self::Converge,
        Self::Diverge,
    ];

    pub const fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            PATTERN_ID_SOLID => Self::Solid,
            PATTERN_ID_BLINK => Self::Blink,
            PATTERN_ID_BLINK_INVERSE => Self::BlinkInverse,
            PATTERN_ID_HALF_SWAP => Self::HalfSwap,
            PATTERN_ID_QUARTER_SWAP => Self::QuarterSwap,
            PATTERN_ID_ALTERNATE => Self::Alternate,
            PATTERN_ID_GATED => Self::Gated,
            PATTERN_ID_GATED_BLINK => Self::GatedBlink,
            PATTERN_ID_SWEEP_UP => Self::SweepUp,
            PATTERN_ID_SWEEP_DOWN => Self::SweepDown,
            PATTERN_ID_BOUNCE => Self::Bounce,
            PATTERN_ID_CONVERGE => Self::Converge,
            PATTERN_ID_DIVERGE => Self::Diverge,
            _ => return None,
        })
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Index of this pattern's step counter
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Solid => PATTERN_NAME_SOLID,
            Self::Blink => PATTERN_NAME_BLINK,
            Self::BlinkInverse => PATTERN_NAME_BLINK_INVERSE,
            Self::HalfSwap => PATTERN_NAME_HALF_SWAP,
            Self::QuarterSwap => PATTERN_NAME_QUARTER_SWAP,
            Self::Alternate => PATTERN_NAME_ALTERNATE,
            Self::Gated => PATTERN_NAME_GATED,
            Self::GatedBlink => PATTERN_NAME_GATED_BLINK,
            Self::SweepUp => PATTERN_NAME_SWEEP_UP,
            Self::SweepDown => PATTERN_NAME_SWEEP_DOWN,
            Self::Bounce => PATTERN_NAME_BOUNCE,
            Self::Converge => PATTERN_NAME_CONVERGE,
            Self::Diverge => PATTERN_NAME_DIVERGE,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|pattern| pattern.as_str() == s)
    }

    /// Continuous patterns fade their window instead of clearing it
    pub const fn is_continuous(self) -> bool {
        self as u8 >= PATTERN_ID_SWEEP_UP
    }

    /// Step counter period for a window of `width` pixels, never zero
    pub const fn period(self, width: usize) -> usize {
        let period = match self {
            Self::SweepUp | Self::SweepDown => width,
            Self::Bounce => width * 2,
            Self::Converge | Self::Diverge => width / 2,
            _ => 1,
        };
        if period == 0 { 1 } else { period }
    }

    /// Draw the pattern into `leds`, the lit window of one group
    pub fn render(self, leds: &mut [Rgb], frame: &PatternFrame) {
        let width = leds.len();
        if width == 0 {
            return;
        }
        let k = frame.step as usize % self.period(width);

        match self {
            Self::Solid => fill(leds, frame.color),
            Self::Blink
            | Self::BlinkInverse
            | Self::HalfSwap
            | Self::QuarterSwap
            | Self::Alternate
            | Self::Gated
            | Self::GatedBlink => {
                let dim = fade_to_black_by(frame.color, frame.blink_fade);
                for (i, led) in leds.iter_mut().enumerate() {
                    *led = if blink::is_lit(self, i, width, frame.phase) {
                        frame.color
                    } else {
                        dim
                    };
                }
            }
            Self::SweepUp => sweep::light(leds, frame.color, &[k]),
            Self::SweepDown => sweep::light(leds, frame.color, &[width - 1 - k]),
            Self::Bounce => sweep::light(leds, frame.color, &[sweep::bounce(k, width)]),
            Self::Converge => sweep::light(leds, frame.color, &sweep::converge(k, width)),
            Self::Diverge => sweep::light(leds, frame.color, &sweep::diverge(k, width)),
        }
    }
}
