mod rgbw;

pub use rgbw::{PixelFormat, Rgbw, pack_rgbw, rgbw_cells, to_rgbw};
use smart_leds::RGB8;

use crate::math8::{fade8, scale8};

pub type Rgb = RGB8;

pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

/// Create an RGB color from a u32 value (0xRRGGBB format)
pub const fn rgb_from_u32(color: u32) -> Rgb {
    Rgb {
        r: ((color >> 16) & 0xFF) as u8,
        g: ((color >> 8) & 0xFF) as u8,
        b: (color & 0xFF) as u8,
    }
}

/// Pack an RGB color into a u32 value (0xRRGGBB format)
pub const fn rgb_to_u32(color: Rgb) -> u32 {
    ((color.r as u32) << 16) | ((color.g as u32) << 8) | color.b as u32
}

/// Dim a color towards black (0 = unchanged, 255 = black)
#[inline]
pub const fn fade_to_black_by(color: Rgb, amount: u8) -> Rgb {
    Rgb {
        r: fade8(color.r, amount),
        g: fade8(color.g, amount),
        b: fade8(color.b, amount),
    }
}

/// Scale every component of a color by `scale` (0-255 = 0.0-1.0)
#[inline]
pub const fn scale_color(color: Rgb, scale: u8) -> Rgb {
    Rgb {
        r: scale8(color.r, scale),
        g: scale8(color.g, scale),
        b: scale8(color.b, scale),
    }
}

/// Fade every pixel of a slice towards black
pub fn fade_all(leds: &mut [Rgb], amount: u8) {
    for led in leds {
        *led = fade_to_black_by(*led, amount);
    }
}

/// Fill a slice with one color
pub fn fill(leds: &mut [Rgb], color: Rgb) {
    for led in leds {
        *led = color;
    }
}
