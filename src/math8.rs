/// Scale an 8-bit value by a factor (0-255 = 0.0-1.0)
///
/// Uses integer math for efficiency on embedded systems.
#[inline]
#[allow(clippy::cast_lossless, clippy::cast_possible_truncation)]
pub const fn scale8(value: u8, scale: u8) -> u8 {
    ((value as u16 * (1 + scale as u16)) >> 8) as u8
}

/// Dim a value towards zero by `amount` (0 = unchanged, 255 = black)
#[inline]
pub const fn fade8(value: u8, amount: u8) -> u8 {
    if amount == u8::MAX {
        return 0;
    }
    scale8(value, u8::MAX - amount)
}

/// Rescale `value` by `percent` (0-100) with round-half-up.
///
/// Any nonzero percentage of a nonzero value yields at least 1, so a
/// partially filled indicator always shows something.
#[inline]
pub const fn percent_of(value: usize, percent: u8) -> usize {
    if percent == 0 || value == 0 {
        return 0;
    }
    let scaled = (value * percent as usize + 50) / 100;
    if scaled == 0 { 1 } else { scaled }
}

/// Advance a triangle wave level by `step`, bouncing between `floor` and 255.
///
/// Returns the new level and whether the wave is still rising.
#[inline]
pub const fn triangle8(level: u8, step: u8, floor: u8, rising: bool) -> (u8, bool) {
    if rising {
        match level.checked_add(step) {
            Some(next) => (next, true),
            None => (u8::MAX, false),
        }
    } else {
        match level.checked_sub(step) {
            Some(next) if next > floor => (next, false),
            _ => (floor, true),
        }
    }
}
