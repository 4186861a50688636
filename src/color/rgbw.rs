//! RGBW output support
//!
//! Four-component strips (SK6812 RGBW and friends) are driven through the
//! same three-byte pixel pipeline: colors are converted to RGBW and the
//! resulting byte stream is packed into RGB-sized cells, which the output
//! driver transmits verbatim in `r`, `g`, `b` field order.

use smart_leds::{RGBW, White};

use super::{BLACK, Rgb};

pub type Rgbw = RGBW<u8>;

/// Pixel layout of the attached strips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    #[default]
    Rgb,
    Rgbw,
}

impl PixelFormat {
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Rgb => 0,
            Self::Rgbw => 1,
        }
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Rgb),
            1 => Some(Self::Rgbw),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rgb => "RGB",
            Self::Rgbw => "RGBW",
        }
    }
}

/// Convert an RGB color to RGBW.
///
/// Grayscale colors are moved entirely onto the white channel; any other
/// color keeps its RGB components and leaves white off.
pub const fn to_rgbw(color: Rgb) -> Rgbw {
    if color.r == color.g && color.r == color.b {
        Rgbw {
            r: 0,
            g: 0,
            b: 0,
            a: White(color.r),
        }
    } else {
        Rgbw {
            r: color.r,
            g: color.g,
            b: color.b,
            a: White(0),
        }
    }
}

/// Number of RGB cells needed to carry `pixels` RGBW pixels
pub const fn rgbw_cells(pixels: usize) -> usize {
    (pixels * 4 + 2) / 3
}

/// Pack `src` as a G, R, B, W byte stream into RGB cells.
///
/// Returns the number of cells written. Pixels that do not fit into `dst`
/// are dropped; unused bytes of the last cell are zeroed.
pub fn pack_rgbw(src: &[Rgb], dst: &mut [Rgb]) -> usize {
    let pixels = src.len().min(dst.len() * 3 / 4);
    let cells = rgbw_cells(pixels).min(dst.len());
    for cell in dst.iter_mut().take(cells) {
        *cell = BLACK;
    }

    for (i, color) in src.iter().take(pixels).enumerate() {
        let rgbw = to_rgbw(*color);
        let bytes = [rgbw.g, rgbw.r, rgbw.b, rgbw.a.0];
        for (j, byte) in bytes.into_iter().enumerate() {
            let offset = i * 4 + j;
            let Some(cell) = dst.get_mut(offset / 3) else {
                continue;
            };
            match offset % 3 {
                0 => cell.r = byte,
                1 => cell.g = byte,
                _ => cell.b = byte,
            }
        }
    }
    cells
}
