//! Small drawing toy shared by the firmware, the simulator and scenario tests.
//!
//! - joystick moves the cursor, click toggles the microphone meter
//! - A cycles the brush color, B paints the cell under the cursor
//! - reset wipes the painting
//! - the dial sets brightness
//!
//! Handlers only touch shared state and mark it dirty; drawing happens in
//! [`Sketch::render`] from the host loop.

use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use embedded_graphics::pixelcolor::Rgb888;

use crate::canvas::Canvas;
use crate::channel::{AnalogChannel, DigitalChannel};
use crate::color;
use crate::config::Dimensions;
use crate::dispatcher::EventDispatcher;
use crate::error::Error;
use crate::ADC_MAX;

const PALETTE: [Rgb888; 6] = [
    color::GREEN,
    color::RED,
    color::BLUE,
    color::YELLOW,
    color::CYAN,
    color::MAGENTA,
];

/// Dimmest level the dial can reach; fully off looks like a dead board.
const MIN_BRIGHTNESS: f32 = 0.01;
const METER_COLOR: Rgb888 = color::from_hex(0x303030);

struct State {
    width: i32,
    height: i32,
    cursor: (i32, i32),
    brush: usize,
    paint: Vec<Option<Rgb888>>,
    meter_visible: bool,
    /// Microphone distance from its quiet midpoint
    loudness: u16,
    brightness: Option<f32>,
    splash: bool,
    dirty: bool,
}

impl State {
    fn move_cursor(&mut self, dx: i32, dy: i32) {
        self.cursor.0 = (self.cursor.0 + dx).clamp(0, self.width - 1);
        self.cursor.1 = (self.cursor.1 + dy).clamp(0, self.height - 1);
        self.touch();
    }

    fn touch(&mut self) {
        self.splash = false;
        self.dirty = true;
    }
}

/// Demo application state, cheap to clone (handles share one state).
#[derive(Clone)]
pub struct Sketch {
    state: Rc<RefCell<State>>,
}

impl Sketch {
    pub fn new(dimensions: Dimensions) -> Self {
        let width = dimensions.width as i32;
        let height = dimensions.height as i32;
        Self {
            state: Rc::new(RefCell::new(State {
                width,
                height,
                cursor: (width / 2, height / 2),
                brush: 0,
                paint: vec![None; dimensions.pixel_count()],
                meter_visible: false,
                loudness: 0,
                brightness: None,
                splash: true,
                dirty: true,
            })),
        }
    }

    /// Bind every Pixel Kit channel to the sketch.
    pub fn install(&self, dispatcher: &mut EventDispatcher) -> Result<(), Error> {
        let moves = [
            (DigitalChannel::JoystickUp, 0, -1),
            (DigitalChannel::JoystickDown, 0, 1),
            (DigitalChannel::JoystickLeft, -1, 0),
            (DigitalChannel::JoystickRight, 1, 0),
        ];
        for (channel, dx, dy) in moves {
            let state = self.state.clone();
            dispatcher.bind_press(channel, move || state.borrow_mut().move_cursor(dx, dy))?;
        }

        let state = self.state.clone();
        dispatcher.bind_press(DigitalChannel::JoystickClick, move || {
            let mut s = state.borrow_mut();
            s.meter_visible = !s.meter_visible;
            s.touch();
        })?;

        let state = self.state.clone();
        dispatcher.bind_press(DigitalChannel::ButtonA, move || {
            let mut s = state.borrow_mut();
            s.brush = (s.brush + 1) % PALETTE.len();
            s.touch();
        })?;

        let state = self.state.clone();
        dispatcher.bind_press(DigitalChannel::ButtonB, move || {
            let mut s = state.borrow_mut();
            let (x, y) = s.cursor;
            let index = (y * s.width + x) as usize;
            let brush = PALETTE[s.brush];
            s.paint[index] = Some(brush);
            s.touch();
        })?;

        let state = self.state.clone();
        dispatcher.bind_press(DigitalChannel::ButtonReset, move || {
            let mut s = state.borrow_mut();
            s.paint.fill(None);
            s.touch();
        })?;

        let state = self.state.clone();
        dispatcher.bind_change(AnalogChannel::Dial, move |value| {
            let mut s = state.borrow_mut();
            s.brightness = Some(dial_to_brightness(value));
            s.dirty = true;
        })?;

        let state = self.state.clone();
        dispatcher.bind_change(AnalogChannel::Microphone, move |value| {
            let mut s = state.borrow_mut();
            s.loudness = value.abs_diff(ADC_MAX / 2);
            if s.meter_visible {
                s.dirty = true;
            }
        })?;

        Ok(())
    }

    /// Returns whether a redraw is pending and clears the flag.
    pub fn take_dirty(&self) -> bool {
        core::mem::take(&mut self.state.borrow_mut().dirty)
    }

    pub fn cursor(&self) -> (i32, i32) {
        self.state.borrow().cursor
    }

    pub fn brush(&self) -> Rgb888 {
        PALETTE[self.state.borrow().brush]
    }

    /// Redraw the whole frame.
    pub fn render(&self, canvas: &mut Canvas) {
        let s = self.state.borrow();

        if let Some(brightness) = s.brightness {
            // Always in range: dial_to_brightness clamps.
            canvas.set_brightness(brightness).ok();
        }

        canvas.clear();

        if s.splash {
            canvas.draw_text(0, 0, "RPK", color::DEFAULT_TEXT);
            return;
        }

        for (index, cell) in s.paint.iter().enumerate() {
            if let Some(c) = cell {
                let x = index as i32 % s.width;
                let y = index as i32 / s.width;
                canvas.set_pixel(x, y, *c).ok();
            }
        }

        if s.meter_visible {
            let rows = u32::from(s.loudness) * s.height as u32 / u32::from(ADC_MAX / 2);
            let rows = (rows as i32).min(s.height);
            canvas.draw_vline(s.width - 1, s.height - rows, rows, METER_COLOR);
        }

        let (x, y) = s.cursor;
        canvas.set_pixel(x, y, PALETTE[s.brush]).ok();
    }
}

fn dial_to_brightness(value: u16) -> f32 {
    (f32::from(value) / f32::from(ADC_MAX)).clamp(MIN_BRIGHTNESS, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Builder;
    use crate::mock::MockInput;
    use crate::sampler::InputSampler;

    struct Rig {
        sketch: Sketch,
        dispatcher: EventDispatcher,
        sampler: InputSampler<MockInput>,
        canvas: Canvas,
    }

    impl Rig {
        fn new() -> Self {
            let config = Builder::pixel_kit().build().unwrap();
            let sketch = Sketch::new(config.dimensions);
            let mut dispatcher = EventDispatcher::new(&config);
            sketch.install(&mut dispatcher).unwrap();
            Self {
                sketch,
                dispatcher,
                sampler: InputSampler::new(MockInput::new()),
                canvas: Canvas::new(&config),
            }
        }

        fn tap(&mut self, pin: u8) {
            self.sampler.interface_mut().set_level(pin, false);
            self.dispatcher.poll(&mut self.sampler).unwrap();
            self.sampler.interface_mut().set_level(pin, true);
            self.dispatcher.poll(&mut self.sampler).unwrap();
        }
    }

    #[test]
    fn starts_dirty_with_splash() {
        let mut rig = Rig::new();
        assert!(rig.sketch.take_dirty());
        assert!(!rig.sketch.take_dirty());

        rig.sketch.render(&mut rig.canvas);
        assert_eq!(rig.canvas.get_pixel(15, 7).unwrap(), color::BLACK);
    }

    #[test]
    fn joystick_moves_cursor_and_stops_at_edges() {
        let mut rig = Rig::new();
        assert_eq!(rig.sketch.cursor(), (8, 4));

        for _ in 0..10 {
            rig.tap(35); // up
        }
        rig.tap(25); // right

        assert_eq!(rig.sketch.cursor(), (9, 0));
    }

    #[test]
    fn paint_then_reset() {
        let mut rig = Rig::new();
        rig.tap(23); // A: next color
        rig.tap(18); // B: paint
        rig.tap(26); // left, so the cursor no longer covers the paint

        rig.sketch.render(&mut rig.canvas);
        assert_eq!(rig.canvas.get_pixel(8, 4).unwrap(), color::RED);
        assert_eq!(rig.canvas.get_pixel(7, 4).unwrap(), color::RED);

        rig.tap(5); // reset
        rig.sketch.render(&mut rig.canvas);
        assert_eq!(rig.canvas.get_pixel(8, 4).unwrap(), color::BLACK);
    }

    #[test]
    fn dial_sets_brightness_on_next_render() {
        let mut rig = Rig::new();
        rig.sampler.interface_mut().script_values(36, &[0, ADC_MAX]);
        rig.dispatcher.poll(&mut rig.sampler).unwrap();
        rig.dispatcher.poll(&mut rig.sampler).unwrap();

        rig.sketch.render(&mut rig.canvas);
        assert_eq!(rig.canvas.brightness(), 1.0);
    }

    #[test]
    fn loud_microphone_fills_meter_column() {
        let mut rig = Rig::new();
        rig.tap(27); // click: show meter
        rig.sampler.interface_mut().script_values(39, &[ADC_MAX / 2, ADC_MAX]);
        rig.dispatcher.poll(&mut rig.sampler).unwrap();
        rig.dispatcher.poll(&mut rig.sampler).unwrap();

        rig.sketch.render(&mut rig.canvas);
        for y in 0..8 {
            assert_eq!(rig.canvas.get_pixel(15, y).unwrap(), METER_COLOR);
        }
    }
}
