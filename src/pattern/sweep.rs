//! Pixel positions of the continuous patterns

use crate::color::Rgb;

/// Set the given positions to `color`, ignoring any outside the window
pub(super) fn light(leds: &mut [Rgb], color: Rgb, positions: &[usize]) {
    for &position in positions {
        if let Some(led) = leds.get_mut(position) {
            *led = color;
        }
    }
}

/// Up then down over a period of `2 x width`
pub(super) const fn bounce(k: usize, width: usize) -> usize {
    if k < width { k } else { 2 * width - 1 - k }
}

/// Both ends moving towards the center
pub(super) const fn converge(k: usize, width: usize) -> [usize; 2] {
    [k, width - 1 - k]
}

/// Both halves moving away from the center
pub(super) const fn diverge(k: usize, width: usize) -> [usize; 2] {
    let half = width / 2;
    [half.saturating_sub(1 + k), width - half + k]
}
