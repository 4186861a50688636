//! Lit masks of the two-phase patterns

use super::PatternId;

/// Outer thirds of the window; the middle third stays dark
const fn outer_thirds(i: usize, width: usize) -> bool {
    let third = width / 3;
    i < third || i >= width - third
}

/// Whether pixel `i` of a `width` window is lit in the given phase.
///
/// Split points use integer division, so odd widths are asymmetric.
pub(super) const fn is_lit(pattern: PatternId, i: usize, width: usize, phase: bool) -> bool {
    match pattern {
        PatternId::Solid => true,
        PatternId::Blink => phase,
        PatternId::BlinkInverse => !phase,
        PatternId::HalfSwap => (i < width / 2) == phase,
        PatternId::QuarterSwap => {
            let quarter = width / 4;
            let outer = i < quarter || i >= width - quarter;
            outer == phase
        }
        PatternId::Alternate => (i % 2 == 0) == phase,
        PatternId::Gated => outer_thirds(i, width),
        PatternId::GatedBlink => phase && outer_thirds(i, width),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask<const N: usize>(pattern: PatternId, phase: bool) -> [bool; N] {
        core::array::from_fn(|i| is_lit(pattern, i, N, phase))
    }

    #[test]
    fn test_half_swap_odd_width() {
        assert_eq!(mask::<5>(PatternId::HalfSwap, true), [true, true, false, false, false]);
        assert_eq!(mask::<5>(PatternId::HalfSwap, false), [false, false, true, true, true]);
    }

    #[test]
    fn test_quarter_swap() {
        assert_eq!(
            mask::<8>(PatternId::QuarterSwap, true),
            [true, true, false, false, false, false, true, true]
        );
        assert_eq!(
            mask::<8>(PatternId::QuarterSwap, false),
            [false, false, true, true, true, true, false, false]
        );
    }

    #[test]
    fn test_gated_ignores_phase() {
        let expected = [true, true, false, false, true, true];
        assert_eq!(mask::<6>(PatternId::Gated, true), expected);
        assert_eq!(mask::<6>(PatternId::Gated, false), expected);
        assert_eq!(mask::<6>(PatternId::GatedBlink, false), [false; 6]);
    }

    #[test]
    fn test_alternate_swaps() {
        assert_eq!(mask::<4>(PatternId::Alternate, true), [true, false, true, false]);
        assert_eq!(mask::<4>(PatternId::Alternate, false), [false, true, false, true]);
    }
}
