//! Hardware interface abstraction
//!
//! The driver layer never touches peripherals directly. It consumes two narrow
//! traits implemented by the platform:
//!
//! - [`InputInterface`]: raw digital levels and raw ADC samples, addressed by GPIO
//! - [`PixelInterface`]: one-shot transfer of the LED buffer and the global
//!   brightness scalar
//!
//! The ESP32 firmware implements them with `PinDriver`, ADC1 and the RMT
//! peripheral; [`HalInput`](crate::hal::HalInput) covers any embedded-hal
//! pins; [`mock`](crate::mock) provides scripted versions for tests.
//!
//! ## Example
//!
//! ```
//! use pixelkit::InputInterface;
//!
//! struct AlwaysReleased;
//!
//! impl InputInterface for AlwaysReleased {
//!     type Error = core::convert::Infallible;
//!
//!     fn read_digital_level(&mut self, _pin: u8) -> Result<bool, Self::Error> {
//!         Ok(true) // pulled up
//!     }
//!
//!     fn read_analog_value(&mut self, _pin: u8) -> Result<u16, Self::Error> {
//!         Ok(0)
//!     }
//! }
//! ```

use core::fmt::Debug;

/// Raw peripheral reads
///
/// Reads are assumed synchronous, bounded and non-destructive.
pub trait InputInterface {
    /// Error type for read operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Read the electrical level of `pin` (`true` = high).
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be read (e.g. not set up as an
    /// input, or disconnected).
    fn read_digital_level(&mut self, pin: u8) -> Result<bool, Self::Error>;

    /// Read the raw ADC value of `pin`.
    ///
    /// The range is bounded by the platform's ADC resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if the conversion fails.
    fn read_analog_value(&mut self, pin: u8) -> Result<u16, Self::Error>;
}

/// LED strip transfer
pub trait PixelInterface {
    /// Error type for transfer operations
    type Error: Debug;

    /// Push one full frame to the strip
    ///
    /// `bytes` holds `R, G, B` triples in strip order, which on the Pixel Kit
    /// is row-major (no serpentine). Wire-order conversion (GRB for WS2812)
    /// belongs to the implementation.
    fn write_pixel_buffer(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Set the global brightness applied at transfer time, in `[0, 1]`
    fn set_global_brightness(&mut self, brightness: f32) -> Result<(), Self::Error>;
}

impl<T: InputInterface + ?Sized> InputInterface for &mut T {
    type Error = T::Error;

    fn read_digital_level(&mut self, pin: u8) -> Result<bool, Self::Error> {
        (**self).read_digital_level(pin)
    }

    fn read_analog_value(&mut self, pin: u8) -> Result<u16, Self::Error> {
        (**self).read_analog_value(pin)
    }
}

impl<T: PixelInterface + ?Sized> PixelInterface for &mut T {
    type Error = T::Error;

    fn write_pixel_buffer(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write_pixel_buffer(bytes)
    }

    fn set_global_brightness(&mut self, brightness: f32) -> Result<(), Self::Error> {
        (**self).set_global_brightness(brightness)
    }
}
