//! Desktop SDL simulator for the Pixel Kit.
//!
//! Runs the sketch app against a keyboard-driven input panel and shows the
//! 16×8 matrix scaled up in a window.

use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics_simulator::{
    sdl2::Keycode, OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window,
};
use pixelkit::{
    AnalogChannel, Builder, Canvas, Config, Device, DigitalChannel, EventDispatcher,
    InputInterface, PixelInterface, Sketch, ADC_MAX,
};

const LED_SIZE: u32 = 32;
const LED_GAP: u32 = 4;
const DIAL_STEP: u16 = 256;
const FRAME_DELAY: Duration = Duration::from_millis(20);

/// Levels and ADC values the keyboard currently holds, keyed by GPIO.
#[derive(Default)]
struct Panel {
    levels: HashMap<u8, bool>,
    values: HashMap<u8, u16>,
}

/// Input side of the simulator, sharing its panel with the event loop.
struct KeyboardInput {
    panel: Rc<RefCell<Panel>>,
}

impl InputInterface for KeyboardInput {
    type Error = Infallible;

    fn read_digital_level(&mut self, pin: u8) -> Result<bool, Self::Error> {
        // Unheld lines rest at their pull-up.
        Ok(self.panel.borrow().levels.get(&pin).copied().unwrap_or(true))
    }

    fn read_analog_value(&mut self, pin: u8) -> Result<u16, Self::Error> {
        Ok(self.panel.borrow().values.get(&pin).copied().unwrap_or(0))
    }
}

/// Strip stand-in that keeps the last frame for the window to draw.
#[derive(Default)]
struct ScreenStrip {
    frame: Vec<u8>,
    brightness: f32,
}

impl PixelInterface for ScreenStrip {
    type Error = Infallible;

    fn write_pixel_buffer(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.frame.clear();
        self.frame.extend_from_slice(bytes);
        Ok(())
    }

    fn set_global_brightness(&mut self, brightness: f32) -> Result<(), Self::Error> {
        self.brightness = brightness;
        Ok(())
    }
}

impl ScreenStrip {
    fn draw(&self, display: &mut SimulatorDisplay<Rgb888>, width: u32) -> Result<(), Infallible> {
        display.clear(Rgb888::BLACK)?;
        // Keep dim frames visible on a monitor.
        let gain = 0.25 + 0.75 * self.brightness;
        for (index, rgb) in self.frame.chunks_exact(3).enumerate() {
            let x = index as u32 % width;
            let y = index as u32 / width;
            let color = Rgb888::new(scale(rgb[0], gain), scale(rgb[1], gain), scale(rgb[2], gain));
            let pitch = LED_SIZE + LED_GAP;
            Rectangle::new(
                Point::new((x * pitch + LED_GAP) as i32, (y * pitch + LED_GAP) as i32),
                Size::new(LED_SIZE, LED_SIZE),
            )
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(display)?;
        }
        Ok(())
    }
}

fn scale(channel: u8, gain: f32) -> u8 {
    (f32::from(channel) * gain).round() as u8
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Builder::pixel_kit().build()?;
    let dimensions = config.dimensions;

    let mut quiet = Panel::default();
    if let Some(line) = config.analog_line(AnalogChannel::Microphone) {
        quiet.values.insert(line.pin, ADC_MAX / 2);
    }
    let panel = Rc::new(RefCell::new(quiet));
    let input = KeyboardInput {
        panel: panel.clone(),
    };
    let mut device = Device::new(config, input, ScreenStrip::default());
    let mut dispatcher = EventDispatcher::new(device.config());
    let mut canvas = Canvas::new(device.config());
    let sketch = Sketch::new(dimensions);
    sketch.install(&mut dispatcher)?;

    let pitch = LED_SIZE + LED_GAP;
    let mut display: SimulatorDisplay<Rgb888> = SimulatorDisplay::new(Size::new(
        dimensions.width * pitch + LED_GAP,
        dimensions.height * pitch + LED_GAP,
    ));
    let output_settings = OutputSettingsBuilder::new().scale(1).build();
    let mut window = Window::new("Pixel Kit", &output_settings);

    println!("Pixel Kit Simulator");
    println!("Controls:");
    println!("  Arrow Keys   - Joystick");
    println!("  Enter        - Joystick click");
    println!("  A / B        - Buttons A and B");
    println!("  R            - Reset button");
    println!("  + / -        - Turn the dial");
    println!("  M (hold)     - Make noise");
    println!("  Escape       - Quit");

    window.update(&display);

    loop {
        let events = window.events().collect::<Vec<_>>();
        for event in events {
            match event {
                SimulatorEvent::Quit => return Ok(()),
                SimulatorEvent::KeyDown {
                    keycode: Keycode::Escape,
                    ..
                } => return Ok(()),
                SimulatorEvent::KeyDown {
                    keycode, repeat, ..
                } => {
                    if !repeat {
                        handle_key(&mut panel.borrow_mut(), device.config(), keycode, true);
                    }
                }
                SimulatorEvent::KeyUp { keycode, .. } => {
                    handle_key(&mut panel.borrow_mut(), device.config(), keycode, false);
                }
                _ => {}
            }
        }

        if let Err(err) = device.poll(&mut dispatcher) {
            eprintln!("poll: {err}");
        }

        if sketch.take_dirty() {
            sketch.render(&mut canvas);
            device.present(&mut canvas)?;
            device.strip().draw(&mut display, dimensions.width)?;
        }

        window.update(&display);
        thread::sleep(FRAME_DELAY);
    }
}

fn handle_key(panel: &mut Panel, config: &Config, keycode: Keycode, down: bool) {
    if let Some(channel) = keycode_to_channel(keycode) {
        if let Some(line) = config.digital_line(channel) {
            let high = line.active.is_active(true) == down;
            panel.levels.insert(line.pin, high);
        }
        return;
    }

    match keycode {
        Keycode::Plus | Keycode::Equals | Keycode::KpPlus if down => {
            nudge_dial(panel, config, |value| value.saturating_add(DIAL_STEP).min(ADC_MAX));
        }
        Keycode::Minus | Keycode::KpMinus if down => {
            nudge_dial(panel, config, |value| value.saturating_sub(DIAL_STEP));
        }
        Keycode::M => {
            if let Some(line) = config.analog_line(AnalogChannel::Microphone) {
                let value = if down { ADC_MAX } else { ADC_MAX / 2 };
                panel.values.insert(line.pin, value);
            }
        }
        _ => {}
    }
}

fn nudge_dial(panel: &mut Panel, config: &Config, step: impl FnOnce(u16) -> u16) {
    if let Some(line) = config.analog_line(AnalogChannel::Dial) {
        let value = panel.values.entry(line.pin).or_insert(0);
        *value = step(*value);
    }
}

fn keycode_to_channel(keycode: Keycode) -> Option<DigitalChannel> {
    match keycode {
        Keycode::Up => Some(DigitalChannel::JoystickUp),
        Keycode::Down => Some(DigitalChannel::JoystickDown),
        Keycode::Left => Some(DigitalChannel::JoystickLeft),
        Keycode::Right => Some(DigitalChannel::JoystickRight),
        Keycode::Return | Keycode::Space => Some(DigitalChannel::JoystickClick),
        Keycode::A => Some(DigitalChannel::ButtonA),
        Keycode::B => Some(DigitalChannel::ButtonB),
        Keycode::R => Some(DigitalChannel::ButtonReset),
        _ => None,
    }
}
