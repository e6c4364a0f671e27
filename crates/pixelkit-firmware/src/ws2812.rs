//! WS2812 strip over the RMT peripheral.

use core::time::Duration;

use esp_idf_svc::hal::gpio::OutputPin;
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::rmt::config::TransmitConfig;
use esp_idf_svc::hal::rmt::{PinState, Pulse, RmtChannel, TxRmtDriver, VariableLengthSignal};
use esp_idf_svc::sys::EspError;
use pixelkit::PixelInterface;

// Datasheet bit timings
const T0H: Duration = Duration::from_nanos(350);
const T0L: Duration = Duration::from_nanos(800);
const T1H: Duration = Duration::from_nanos(700);
const T1L: Duration = Duration::from_nanos(600);

pub struct Ws2812 {
    tx: TxRmtDriver<'static>,
    zero: [Pulse; 2],
    one: [Pulse; 2],
    brightness: f32,
}

impl Ws2812 {
    pub fn new<C: RmtChannel>(
        channel: impl Peripheral<P = C> + 'static,
        pin: impl Peripheral<P = impl OutputPin> + 'static,
    ) -> Result<Self, EspError> {
        let config = TransmitConfig::new().clock_divider(1);
        let tx = TxRmtDriver::new(channel, pin, &config)?;

        let ticks_hz = tx.counter_clock()?;
        let zero = [
            Pulse::new_with_duration(ticks_hz, PinState::High, &T0H)?,
            Pulse::new_with_duration(ticks_hz, PinState::Low, &T0L)?,
        ];
        let one = [
            Pulse::new_with_duration(ticks_hz, PinState::High, &T1H)?,
            Pulse::new_with_duration(ticks_hz, PinState::Low, &T1L)?,
        ];

        Ok(Self {
            tx,
            zero,
            one,
            brightness: 1.0,
        })
    }

    fn scale(&self, channel: u8) -> u8 {
        (f32::from(channel) * self.brightness) as u8
    }
}

impl PixelInterface for Ws2812 {
    type Error = EspError;

    fn write_pixel_buffer(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let mut signal = VariableLengthSignal::with_capacity(bytes.len() * 8);
        for rgb in bytes.chunks_exact(3) {
            // Wire order is G, R, B.
            for byte in [rgb[1], rgb[0], rgb[2]] {
                let byte = self.scale(byte);
                for bit in (0..8).rev() {
                    let pulses = if byte & (1 << bit) != 0 {
                        &self.one
                    } else {
                        &self.zero
                    };
                    signal.push(pulses)?;
                }
            }
        }
        self.tx.start_blocking(&signal)
    }

    fn set_global_brightness(&mut self, brightness: f32) -> Result<(), Self::Error> {
        self.brightness = brightness.clamp(0.0, 1.0);
        Ok(())
    }
}
