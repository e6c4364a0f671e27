//! 24-bit colors as the application writes them (`0xRRGGBB`).

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

pub const BLACK: Rgb888 = Rgb888::BLACK;
pub const WHITE: Rgb888 = Rgb888::WHITE;
pub const RED: Rgb888 = Rgb888::RED;
pub const GREEN: Rgb888 = Rgb888::GREEN;
pub const BLUE: Rgb888 = Rgb888::BLUE;
pub const YELLOW: Rgb888 = Rgb888::YELLOW;
pub const CYAN: Rgb888 = Rgb888::CYAN;
pub const MAGENTA: Rgb888 = Rgb888::MAGENTA;

/// Default stroke color for pixels, lines and shapes
pub const DEFAULT_DRAW: Rgb888 = GREEN;
/// Default text color
pub const DEFAULT_TEXT: Rgb888 = RED;
/// Default background fill
pub const DEFAULT_BACKGROUND: Rgb888 = YELLOW;

/// `0xRRGGBB` to [`Rgb888`]; the top byte is ignored.
pub const fn from_hex(hex: u32) -> Rgb888 {
    Rgb888::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// [`Rgb888`] to `0xRRGGBB`.
pub fn to_hex(color: Rgb888) -> u32 {
    (u32::from(color.r()) << 16) | (u32::from(color.g()) << 8) | u32::from(color.b())
}
