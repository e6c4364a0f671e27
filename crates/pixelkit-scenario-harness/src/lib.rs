//! Host-side scenario test harness for scripted input flows.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use png::{BitDepth, ColorType, Encoder};
use pixelkit::mock::MockError;
use pixelkit::{
    AnalogChannel, Builder, Canvas, Config, Device, DigitalChannel, EventDispatcher, MockInput,
    MockPixels, PollError, Sketch,
};

/// Couples device, dispatcher, canvas and the sketch app over mock hardware.
///
/// Each [`step`](ScenarioHarness::step) is one iteration of the firmware loop:
/// poll, then redraw and present if the app asked for it.
pub struct ScenarioHarness {
    device: Device<MockInput, MockPixels>,
    dispatcher: EventDispatcher,
    canvas: Canvas,
    sketch: Sketch,
}

impl ScenarioHarness {
    /// Pixel Kit configuration with the sketch installed.
    pub fn new() -> Self {
        let config = Builder::pixel_kit()
            .build()
            .expect("pixel kit preset should be valid");
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Self {
        let device = Device::new(config, MockInput::new(), MockPixels::new());
        let mut dispatcher = EventDispatcher::new(device.config());
        let canvas = Canvas::new(device.config());
        let sketch = Sketch::new(device.config().dimensions);
        sketch
            .install(&mut dispatcher)
            .expect("sketch needs every pixel kit channel");

        Self {
            device,
            dispatcher,
            canvas,
            sketch,
        }
    }

    /// One loop iteration; returns whether a frame was presented.
    ///
    /// Panics on read failures; use [`try_step`](Self::try_step) to observe them.
    pub fn step(&mut self) -> bool {
        self.try_step().expect("scenario poll should succeed")
    }

    /// One loop iteration, surfacing read failures after the redraw.
    pub fn try_step(&mut self) -> Result<bool, PollError<MockError>> {
        let polled = self.device.poll(&mut self.dispatcher);
        let presented = self.redraw_if_dirty();
        polled.map(|()| presented)
    }

    /// Run `count` loop iterations without changing any input.
    pub fn idle(&mut self, count: usize) -> usize {
        (0..count).filter(|_| self.step()).count()
    }

    /// Hold a line at its active level (takes effect on the next step).
    pub fn hold(&mut self, channel: DigitalChannel) {
        self.set_pressed(channel, true);
    }

    /// Return a line to its idle level (takes effect on the next step).
    pub fn release(&mut self, channel: DigitalChannel) {
        self.set_pressed(channel, false);
    }

    /// Press and release across two steps; returns whether anything redrew.
    pub fn press(&mut self, channel: DigitalChannel) -> bool {
        self.hold(channel);
        let pressed = self.step();
        self.release(channel);
        let released = self.step();
        pressed || released
    }

    /// Hold an analog line at `value` (takes effect on the next step).
    pub fn set_analog(&mut self, channel: AnalogChannel, value: u16) {
        let pin = self
            .device
            .config()
            .analog_line(channel)
            .expect("analog channel should be configured")
            .pin;
        self.device.input_mut().set_value(pin, value);
    }

    /// Make every read of `channel`'s pin fail.
    pub fn disconnect(&mut self, channel: impl Into<pixelkit::Channel>) {
        let pin = self.pin_of(channel.into());
        self.device.input_mut().disconnect(pin);
    }

    pub fn reconnect(&mut self, channel: impl Into<pixelkit::Channel>) {
        let pin = self.pin_of(channel.into());
        self.device.input_mut().reconnect(pin);
    }

    /// Access the canvas for pixel assertions.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Access the sketch for state assertions.
    pub fn sketch(&self) -> &Sketch {
        &self.sketch
    }

    /// Everything the "strip" received so far.
    pub fn strip(&self) -> &MockPixels {
        self.device.strip()
    }

    pub fn dispatcher_mut(&mut self) -> &mut EventDispatcher {
        &mut self.dispatcher
    }

    /// Pixels in the last presented frame that are not black.
    pub fn lit_pixel_count(&self) -> usize {
        self.strip()
            .last_frame()
            .map(|frame| {
                frame
                    .chunks_exact(3)
                    .filter(|rgb| rgb.iter().any(|&c| c != 0))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Save the canvas to a PNG, each LED scaled to a `scale`×`scale` block.
    pub fn save_screenshot_png(&self, path: impl AsRef<Path>, scale: u32) -> Result<(), String> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let scale = scale.max(1);
        let width = self.canvas.width() * scale;
        let height = self.canvas.height() * scale;
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let pixel: Rgb888 = self
                    .canvas
                    .get_pixel((x / scale) as i32, (y / scale) as i32)
                    .map_err(|e| e.to_string())?;
                data.extend_from_slice(&[pixel.r(), pixel.g(), pixel.b()]);
            }
        }

        let file = File::create(path).map_err(|e| e.to_string())?;
        let writer = BufWriter::new(file);
        let mut encoder = Encoder::new(writer, width, height);
        encoder.set_color(ColorType::Rgb);
        encoder.set_depth(BitDepth::Eight);
        let mut png_writer = encoder.write_header().map_err(|e| e.to_string())?;
        png_writer
            .write_image_data(&data)
            .map_err(|e| e.to_string())
    }

    fn redraw_if_dirty(&mut self) -> bool {
        if !self.sketch.take_dirty() {
            return false;
        }
        self.sketch.render(&mut self.canvas);
        self.device
            .present(&mut self.canvas)
            .expect("mock strip should accept frames");
        true
    }

    fn set_pressed(&mut self, channel: DigitalChannel, pressed: bool) {
        let line = *self
            .device
            .config()
            .digital_line(channel)
            .expect("digital channel should be configured");
        // Level that makes `active.is_active(level)` equal `pressed`.
        let high = line.active.is_active(true) == pressed;
        self.device.input_mut().set_level(line.pin, high);
    }

    fn pin_of(&self, channel: pixelkit::Channel) -> u8 {
        let config = self.device.config();
        match channel {
            pixelkit::Channel::Digital(c) => config.digital_line(c).map(|l| l.pin),
            pixelkit::Channel::Analog(c) => config.analog_line(c).map(|l| l.pin),
        }
        .expect("channel should be configured")
    }
}

impl Default for ScenarioHarness {
    fn default() -> Self {
        Self::new()
    }
}
