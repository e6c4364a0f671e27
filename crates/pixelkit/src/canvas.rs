//! Logical framebuffer for the LED matrix
//!
//! [`Canvas`] holds one RGB color per LED and implements
//! [`DrawTarget`](embedded_graphics::draw_target::DrawTarget), so every
//! embedded-graphics primitive works on it too. Nothing reaches the LEDs
//! until [`Canvas::present`].
//!
//! Two bounds policies:
//!
//! - [`set_pixel`](Canvas::set_pixel) / [`get_pixel`](Canvas::get_pixel) fail
//!   with [`Error::OutOfBounds`] outside the grid
//! - shapes and text clip silently, since animations legitimately run past
//!   the edges
//!
//! ## Addressing
//!
//! The Pixel Kit strip is wired row-major without serpentine folding, so
//! logical `(x, y)` is strip index `y * width + x`. This is fixed for the
//! hardware and intentionally not configurable.
//!
//! ## Example
//!
//! ```
//! use pixelkit::{color, Builder, Canvas, MockPixels};
//!
//! let config = Builder::pixel_kit().build().unwrap();
//! let mut canvas = Canvas::new(&config);
//! let mut strip = MockPixels::new();
//!
//! canvas.clear();
//! canvas.draw_hline(0, 0, 16, color::BLUE);
//! canvas.draw_text(1, 0, "RPK", color::DEFAULT_TEXT);
//! canvas.present(&mut strip).unwrap();
//!
//! assert_eq!(strip.frames().len(), 1);
//! ```

use alloc::vec;
use alloc::vec::Vec;

use embedded_graphics::{
    mono_font::{ascii::FONT_5X8, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Line, PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};

use crate::color;
use crate::config::Config;
use crate::error::Error;
use crate::interface::PixelInterface;

const GLYPH_WIDTH: i64 = 5;
const GLYPH_HEIGHT: i64 = 8;

/// Endpoints further than this outside the grid are clipped before drawing.
const LINE_REACH: u32 = 4096;

/// W×H grid of 24-bit colors, row-major
pub struct Canvas {
    pixels: Vec<Rgb888>,
    width: u32,
    height: u32,
    brightness: f32,
    /// Scratch for `present`, reused between frames
    frame: Vec<u8>,
}

impl Canvas {
    /// Create a black canvas sized and lit per `config`.
    pub fn new(config: &Config) -> Self {
        let dims = config.dimensions;
        Self {
            pixels: vec![color::BLACK; dims.pixel_count()],
            width: dims.width,
            height: dims.height,
            brightness: config.brightness,
            frame: Vec::with_capacity(dims.buffer_size()),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Strip index of `(x, y)`, or `None` outside the grid.
    pub(crate) fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Set one pixel.
    ///
    /// # Errors
    ///
    /// `Error::OutOfBounds` if `(x, y)` is outside the grid; nothing is drawn.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb888) -> Result<(), Error> {
        let index = self.index(x, y).ok_or(Error::OutOfBounds { x, y })?;
        self.pixels[index] = color;
        Ok(())
    }

    /// Color stored at `(x, y)`.
    ///
    /// # Errors
    ///
    /// `Error::OutOfBounds` if `(x, y)` is outside the grid.
    pub fn get_pixel(&self, x: i32, y: i32) -> Result<Rgb888, Error> {
        let index = self.index(x, y).ok_or(Error::OutOfBounds { x, y })?;
        Ok(self.pixels[index])
    }

    /// Set every pixel to `color`.
    pub fn fill(&mut self, color: Rgb888) {
        self.pixels.fill(color);
    }

    /// Same as `fill(black)`.
    pub fn clear(&mut self) {
        self.fill(color::BLACK);
    }

    /// Straight line between both endpoints, inclusive.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb888) {
        let (start, end) = if self.near_grid(x0, y0) && self.near_grid(x1, y1) {
            (Point::new(x0, y0), Point::new(x1, y1))
        } else {
            match self.clip_line(x0, y0, x1, y1) {
                Some(ends) => ends,
                None => return,
            }
        };
        Line::new(start, end)
            .into_styled(PrimitiveStyle::with_stroke(color, 1))
            .draw(self)
            .ok();
    }

    /// Horizontal run of `length` pixels starting at `(x, y)` going right.
    pub fn draw_hline(&mut self, x: i32, y: i32, length: i32, color: Rgb888) {
        if length > 0 {
            let (x, y) = (i64::from(x), i64::from(y));
            self.fill_span(x, y, x + i64::from(length) - 1, y, color);
        }
    }

    /// Vertical run of `length` pixels starting at `(x, y)` going down.
    pub fn draw_vline(&mut self, x: i32, y: i32, length: i32, color: Rgb888) {
        if length > 0 {
            let (x, y) = (i64::from(x), i64::from(y));
            self.fill_span(x, y, x, y + i64::from(length) - 1, color);
        }
    }

    /// One-pixel outline of the `width`×`height` box at `(x, y)`.
    pub fn draw_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgb888) {
        if width <= 0 || height <= 0 {
            return;
        }
        let (left, top) = (i64::from(x), i64::from(y));
        let right = left + i64::from(width) - 1;
        let bottom = top + i64::from(height) - 1;

        self.fill_span(left, top, right, top, color);
        self.fill_span(left, bottom, right, bottom, color);
        self.fill_span(left, top + 1, left, bottom - 1, color);
        self.fill_span(right, top + 1, right, bottom - 1, color);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgb888) {
        if width <= 0 || height <= 0 {
            return;
        }
        let (left, top) = (i64::from(x), i64::from(y));
        self.fill_span(
            left,
            top,
            left + i64::from(width) - 1,
            top + i64::from(height) - 1,
            color,
        );
    }

    /// Draw `text` in the 5x8 font with its top-left corner at `(x, y)`.
    ///
    /// `\n` starts a new line 8 pixels down. Glyphs that cannot reach the
    /// grid are never handed to the font renderer.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Rgb888) {
        let style = MonoTextStyle::new(&FONT_5X8, color);
        let (width, height) = (i64::from(self.width), i64::from(self.height));
        let left = i64::from(x);
        if left >= width {
            return;
        }

        // Whole glyphs left of column 0, and glyphs needed to reach the right edge.
        let skip = if left < 0 { -left / GLYPH_WIDTH } else { 0 };
        let end = (width - left + GLYPH_WIDTH - 1) / GLYPH_WIDTH;
        let origin_x = left + skip * GLYPH_WIDTH;

        for (row, line) in text.split('\n').enumerate() {
            let top = i64::from(y) + row as i64 * GLYPH_HEIGHT;
            if top >= height {
                break;
            }
            if top + GLYPH_HEIGHT <= 0 {
                continue;
            }
            let Some(visible) = char_range(line, skip, end) else {
                continue;
            };
            // Both coordinates are within a glyph of the grid here.
            let origin = Point::new(origin_x as i32, top as i32);
            Text::with_baseline(visible, origin, style, Baseline::Top)
                .draw(self)
                .ok();
        }
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    /// Set the global brightness used by the next `present`.
    ///
    /// # Errors
    ///
    /// `Error::InvalidBrightness` unless `0.0 <= brightness <= 1.0`.
    pub fn set_brightness(&mut self, brightness: f32) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&brightness) {
            return Err(Error::InvalidBrightness(brightness));
        }
        self.brightness = brightness;
        Ok(())
    }

    /// Row-major `R, G, B` bytes, one triple per LED in strip order.
    pub fn frame_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        write_frame(&self.pixels, &mut bytes);
        bytes
    }

    /// Push brightness and the whole grid to the strip in one transfer.
    pub fn present<P: PixelInterface>(&mut self, strip: &mut P) -> Result<(), P::Error> {
        write_frame(&self.pixels, &mut self.frame);
        strip.set_global_brightness(self.brightness)?;
        strip.write_pixel_buffer(&self.frame)
    }
}

impl Canvas {
    /// Fill the inclusive box `(x0, y0)..=(x1, y1)` after clipping it to the grid.
    fn fill_span(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb888) {
        let x0 = x0.max(0);
        let y0 = y0.max(0);
        let x1 = x1.min(i64::from(self.width) - 1);
        let y1 = y1.min(i64::from(self.height) - 1);
        if x0 > x1 || y0 > y1 {
            return;
        }

        let width = self.width as usize;
        let (x0, x1) = (x0 as usize, x1 as usize);
        for row in y0 as usize..=y1 as usize {
            self.pixels[row * width + x0..=row * width + x1].fill(color);
        }
    }

    /// Whether `(x, y)` is close enough that rasterizing up to it stays cheap
    /// and free of coordinate overflow.
    fn near_grid(&self, x: i32, y: i32) -> bool {
        let reach = |v: i32, size: u32| {
            i64::from(v) > -i64::from(LINE_REACH)
                && i64::from(v) < i64::from(size) + i64::from(LINE_REACH)
        };
        reach(x, self.width) && reach(y, self.height)
    }

    /// Liang-Barsky clip of the segment to the grid grown by one pixel.
    ///
    /// `None` if the segment misses it entirely.
    fn clip_line(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> Option<(Point, Point)> {
        let (fx, fy) = (f64::from(x0), f64::from(y0));
        let dx = f64::from(x1) - fx;
        let dy = f64::from(y1) - fy;
        let (min_x, min_y) = (-1.0, -1.0);
        let max_x = f64::from(self.width);
        let max_y = f64::from(self.height);

        let mut enter = 0.0_f64;
        let mut exit = 1.0_f64;
        for (p, q) in [
            (-dx, fx - min_x),
            (dx, max_x - fx),
            (-dy, fy - min_y),
            (dy, max_y - fy),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                if t > exit {
                    return None;
                }
                enter = enter.max(t);
            } else {
                if t < enter {
                    return None;
                }
                exit = exit.min(t);
            }
        }

        let at = |t: f64| Point::new(nearest(fx + t * dx), nearest(fy + t * dy));
        Some((at(enter), at(exit)))
    }
}

fn write_frame(pixels: &[Rgb888], out: &mut Vec<u8>) {
    out.clear();
    for pixel in pixels {
        out.extend_from_slice(&[pixel.r(), pixel.g(), pixel.b()]);
    }
}

/// Substring holding chars `skip..end`, or `None` if that range is empty.
fn char_range(line: &str, skip: i64, end: i64) -> Option<&str> {
    let skip = usize::try_from(skip).ok()?;
    let end = usize::try_from(end).unwrap_or(usize::MAX);
    let mut bounds = line.char_indices().map(|(i, _)| i).chain(Some(line.len()));
    let start = bounds.nth(skip)?;
    if start == line.len() || end <= skip {
        return None;
    }
    let stop = bounds.nth(end - skip - 1).unwrap_or(line.len());
    Some(&line[start..stop])
}

/// `floor(value + 0.5)`, for values already clipped near the grid.
fn nearest(value: f64) -> i32 {
    let shifted = value + 0.5;
    let truncated = shifted as i32;
    if f64::from(truncated) > shifted {
        truncated - 1
    } else {
        truncated
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(index) = self.index(point.x, point.y) {
                self.pixels[index] = color;
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Rgb888) -> Result<(), Self::Error> {
        if area.size.width == 0 || area.size.height == 0 {
            return Ok(());
        }
        let left = i64::from(area.top_left.x);
        let top = i64::from(area.top_left.y);
        self.fill_span(
            left,
            top,
            left + i64::from(area.size.width) - 1,
            top + i64::from(area.size.height) - 1,
            color,
        );
        Ok(())
    }

    fn clear(&mut self, color: Rgb888) -> Result<(), Self::Error> {
        self.fill(color);
        Ok(())
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Builder;
    use crate::mock::MockPixels;

    const W: i32 = 16;
    const H: i32 = 8;

    fn canvas() -> Canvas {
        Canvas::new(&Builder::pixel_kit().build().unwrap())
    }

    fn lit(canvas: &Canvas) -> usize {
        canvas.pixels.iter().filter(|&&p| p != color::BLACK).count()
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut canvas = canvas();
        let orange = color::from_hex(0xFF8800);

        canvas.set_pixel(3, 5, orange).unwrap();

        assert_eq!(canvas.get_pixel(3, 5).unwrap(), orange);
        assert_eq!(canvas.get_pixel(5, 3).unwrap(), color::BLACK);
    }

    #[test]
    fn set_pixel_outside_grid_fails() {
        let mut canvas = canvas();

        for (x, y) in [(W, 0), (0, H), (-1, 0), (0, -1)] {
            assert_eq!(
                canvas.set_pixel(x, y, color::RED),
                Err(Error::OutOfBounds { x, y })
            );
        }
        assert_eq!(lit(&canvas), 0);
        assert!(canvas.get_pixel(W, 0).is_err());
    }

    #[test]
    fn hline_clips_at_right_edge() {
        let mut canvas = canvas();

        canvas.draw_hline(W - 2, 0, 5, color::GREEN);

        assert_eq!(canvas.get_pixel(W - 2, 0).unwrap(), color::GREEN);
        assert_eq!(canvas.get_pixel(W - 1, 0).unwrap(), color::GREEN);
        assert_eq!(lit(&canvas), 2);
        // Clipped pixels must not wrap onto the next row.
        assert_eq!(canvas.get_pixel(0, 1).unwrap(), color::BLACK);
    }

    #[test]
    fn vline_clips_at_bottom_edge() {
        let mut canvas = canvas();
        canvas.draw_vline(4, H - 1, 3, color::BLUE);
        assert_eq!(lit(&canvas), 1);
        assert_eq!(canvas.get_pixel(4, H - 1).unwrap(), color::BLUE);
    }

    #[test]
    fn zero_length_shapes_draw_nothing() {
        let mut canvas = canvas();
        canvas.draw_hline(0, 0, 0, color::WHITE);
        canvas.draw_vline(0, 0, -3, color::WHITE);
        canvas.draw_rect(0, 0, 0, 4, color::WHITE);
        canvas.fill_rect(0, 0, 4, -1, color::WHITE);
        assert_eq!(lit(&canvas), 0);
    }

    #[test]
    fn fill_sets_every_pixel_and_clear_is_fill_black() {
        let mut canvas = canvas();
        let teal = color::from_hex(0x008080);

        canvas.fill(teal);
        for y in 0..H {
            for x in 0..W {
                assert_eq!(canvas.get_pixel(x, y).unwrap(), teal);
            }
        }

        canvas.clear();
        let mut reference = self::canvas();
        reference.fill(color::from_hex(0x000000));
        assert_eq!(canvas.frame_bytes(), reference.frame_bytes());
    }

    #[test]
    fn rect_outline_leaves_interior() {
        let mut canvas = canvas();
        canvas.draw_rect(1, 1, 4, 3, color::RED);

        assert_eq!(canvas.get_pixel(1, 1).unwrap(), color::RED);
        assert_eq!(canvas.get_pixel(4, 3).unwrap(), color::RED);
        assert_eq!(canvas.get_pixel(2, 2).unwrap(), color::BLACK);
        assert_eq!(lit(&canvas), 10);
    }

    #[test]
    fn fill_rect_clips_past_corner() {
        let mut canvas = canvas();
        canvas.fill_rect(W - 2, H - 2, 5, 5, color::YELLOW);
        assert_eq!(lit(&canvas), 4);
    }

    #[test]
    fn shapes_clip_at_left_and_top_edges() {
        let mut canvas = canvas();
        canvas.draw_line(-3, -3, 2, 2, color::CYAN);
        for i in 0..3 {
            assert_eq!(canvas.get_pixel(i, i).unwrap(), color::CYAN);
        }
        assert_eq!(lit(&canvas), 3);

        canvas.clear();
        canvas.fill_rect(-2, -2, 4, 4, color::YELLOW);
        assert_eq!(lit(&canvas), 4);

        canvas.clear();
        canvas.draw_rect(-1, -1, 4, 3, color::RED);
        // Only the right and bottom sides land on the grid.
        assert_eq!(canvas.get_pixel(2, 0).unwrap(), color::RED);
        assert_eq!(canvas.get_pixel(0, 1).unwrap(), color::RED);
        assert_eq!(canvas.get_pixel(0, 0).unwrap(), color::BLACK);
        assert_eq!(lit(&canvas), 4);

        canvas.clear();
        canvas.draw_hline(-3, 0, 5, color::GREEN);
        canvas.draw_vline(W - 1, -6, 7, color::GREEN);
        assert_eq!(lit(&canvas), 3);
    }

    #[test]
    fn text_clips_at_left_and_top_edges() {
        let mut shifted = canvas();
        let mut reference = canvas();

        // "PK" placed so the "R" glyph is fully off the left edge.
        shifted.draw_text(-5, 0, "RPK", color::DEFAULT_TEXT);
        reference.draw_text(0, 0, "PK", color::DEFAULT_TEXT);
        assert_eq!(shifted.frame_bytes(), reference.frame_bytes());

        let mut above = canvas();
        above.draw_text(0, -8, "R", color::DEFAULT_TEXT);
        assert_eq!(lit(&above), 0);

        above.draw_text(0, -8, "R\nR", color::DEFAULT_TEXT);
        assert!(lit(&above) > 0);
    }

    #[test]
    fn extreme_coordinates_clip_without_panicking() {
        let mut canvas = canvas();

        canvas.fill_rect(i32::MAX - 1, 0, 5, 1, color::WHITE);
        canvas.draw_rect(i32::MAX - 1, 0, 5, 3, color::WHITE);
        canvas.draw_text(i32::MAX - 3, 0, "RPK", color::WHITE);
        canvas.draw_text(i32::MIN, i32::MIN, "RPK", color::WHITE);
        canvas.draw_line(i32::MIN, i32::MIN, i32::MIN + 1, i32::MAX, color::WHITE);
        assert_eq!(lit(&canvas), 0);

        canvas.draw_line(i32::MIN, 0, i32::MAX, 0, color::WHITE);
        for x in 0..W {
            assert_eq!(canvas.get_pixel(x, 0).unwrap(), color::WHITE);
        }
        assert_eq!(lit(&canvas), W as usize);

        canvas.clear();
        canvas.draw_hline(-100_000_000, 1, 200_000_000, color::WHITE);
        canvas.draw_vline(0, -1_000_000, i32::MAX, color::WHITE);
        assert_eq!(lit(&canvas), W as usize + H as usize - 1);
    }

    #[test]
    fn long_diagonal_is_clipped_to_grid() {
        let mut canvas = canvas();
        canvas.draw_line(-1_000_000, -1_000_000, 1_000_000, 1_000_000, color::CYAN);
        for i in 0..H {
            assert_eq!(canvas.get_pixel(i, i).unwrap(), color::CYAN);
        }
        assert_eq!(lit(&canvas), H as usize);
    }

    #[test]
    fn huge_fill_touches_only_the_grid() {
        let mut canvas = canvas();
        canvas.fill_rect(-20_000, -20_000, 40_000, 40_000, color::BLUE);
        assert_eq!(lit(&canvas), (W * H) as usize);

        canvas.clear();
        canvas
            .fill_solid(
                &Rectangle::new(Point::new(i32::MAX - 2, 0), Size::new(u32::MAX, 4)),
                color::BLUE,
            )
            .unwrap();
        canvas
            .fill_solid(
                &Rectangle::new(Point::new(-4, -4), Size::new(6, 6)),
                color::BLUE,
            )
            .unwrap();
        assert_eq!(lit(&canvas), 4);
    }

    #[test]
    fn diagonal_line_hits_both_ends() {
        let mut canvas = canvas();
        canvas.draw_line(0, 0, 7, 7, color::CYAN);
        for i in 0..8 {
            assert_eq!(canvas.get_pixel(i, i).unwrap(), color::CYAN);
        }
        assert_eq!(lit(&canvas), 8);
    }

    #[test]
    fn text_stays_inside_grid() {
        let mut canvas = canvas();
        canvas.draw_text(12, 0, "RPK", color::DEFAULT_TEXT);
        assert!(lit(&canvas) > 0);
        assert_eq!(canvas.get_pixel(0, 0).unwrap(), color::BLACK);
    }

    #[test]
    fn frame_is_row_major_not_serpentine() {
        let mut canvas = canvas();
        canvas.set_pixel(0, 1, color::from_hex(0x010203)).unwrap();
        canvas.set_pixel(15, 1, color::from_hex(0x040506)).unwrap();

        let bytes = canvas.frame_bytes();
        assert_eq!(bytes.len(), 16 * 8 * 3);
        assert_eq!(&bytes[16 * 3..16 * 3 + 3], &[1, 2, 3]);
        assert_eq!(&bytes[31 * 3..31 * 3 + 3], &[4, 5, 6]);
    }

    #[test]
    fn present_pushes_brightness_and_one_frame() {
        let mut canvas = canvas();
        let mut strip = MockPixels::new();
        canvas.set_pixel(0, 0, color::WHITE).unwrap();
        canvas.set_brightness(0.5).unwrap();

        assert!(strip.frames().is_empty());
        canvas.present(&mut strip).unwrap();

        assert_eq!(strip.frames().len(), 1);
        assert_eq!(strip.brightness(), Some(0.5));
        assert_eq!(strip.last_frame().unwrap(), canvas.frame_bytes().as_slice());
    }

    #[test]
    fn content_persists_across_presents() {
        let mut canvas = canvas();
        let mut strip = MockPixels::new();
        canvas.set_pixel(2, 2, color::MAGENTA).unwrap();
        canvas.present(&mut strip).unwrap();
        canvas.present(&mut strip).unwrap();

        assert_eq!(strip.frames()[0], strip.frames()[1]);
    }

    #[test]
    fn brightness_outside_unit_range_is_rejected() {
        let mut canvas = canvas();
        assert!(canvas.set_brightness(1.01).is_err());
        assert!(canvas.set_brightness(-0.1).is_err());
        assert!(canvas.set_brightness(f32::NAN).is_err());
        assert_eq!(canvas.brightness(), crate::config::DEFAULT_BRIGHTNESS);
    }
}
