mod input;
mod ws2812;

use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::{AnyInputPin, InputPin, PinDriver};
use esp_idf_svc::hal::peripherals::Peripherals;

use pixelkit::{Builder, Canvas, Device, EventDispatcher, HalInput, Sketch};

use input::{Adc1, InputLine};
use ws2812::Ws2812;

const POLL_INTERVAL_MS: u32 = 20;

fn main() {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    if let Err(err) = run() {
        log::error!("Pixel Kit stopped: {err}");
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    let config = Builder::pixel_kit().build()?;
    log::info!(
        "Pixel Kit {}x{} on GPIO{}",
        config.dimensions.width,
        config.dimensions.height,
        config.pixel_pin
    );

    // Keyed by the same GPIO numbers the config uses.
    let lines: Vec<(u8, AnyInputPin)> = vec![
        (35, pins.gpio35.downgrade_input()),
        (34, pins.gpio34.downgrade_input()),
        (26, pins.gpio26.downgrade_input()),
        (25, pins.gpio25.downgrade_input()),
        (27, pins.gpio27.downgrade_input()),
        (23, pins.gpio23.downgrade_input()),
        (18, pins.gpio18.downgrade_input()),
        (5, pins.gpio5.downgrade_input()),
    ];
    let mut drivers: Vec<(u8, InputLine)> = Vec::with_capacity(lines.len());
    for (gpio, pin) in lines {
        drivers.push((gpio, PinDriver::input(pin)?));
    }
    let input = HalInput::new(drivers, Adc1::init());

    let strip = Ws2812::new(peripherals.rmt.channel0, pins.gpio4)?;

    let mut device = Device::new(config, input, strip);
    let mut dispatcher = EventDispatcher::new(device.config());
    let mut canvas = Canvas::new(device.config());
    let sketch = Sketch::new(device.config().dimensions);
    sketch.install(&mut dispatcher)?;

    loop {
        if sketch.take_dirty() {
            sketch.render(&mut canvas);
            if let Err(err) = device.present(&mut canvas) {
                log::warn!("LED transfer failed: {err}");
            }
        }

        if let Err(err) = device.poll(&mut dispatcher) {
            log::warn!("{err}");
        }

        FreeRtos::delay_ms(POLL_INTERVAL_MS);
    }
}
