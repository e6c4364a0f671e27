//! [`InputInterface`] over embedded-hal pins
//!
//! embedded-hal v1.0 has no ADC trait, so analog reads go through the small
//! [`AnalogRead`] trait implemented by the platform.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pixelkit::HalInput;
//!
//! // All digital pins must share one type (e.g. downgraded `AnyInputPin` drivers).
//! let input = HalInput::new(vec![(35, up), (34, down), (23, button_a)], adc);
//! ```

use alloc::vec::Vec;
use core::fmt::Debug;

use embedded_hal::digital::InputPin;

use crate::interface::InputInterface;

/// Raw ADC access by GPIO number
pub trait AnalogRead {
    type Error: Debug;

    fn read_raw(&mut self, pin: u8) -> Result<u16, Self::Error>;
}

/// Errors from the embedded-hal adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError<PinErr, AdcErr> {
    /// GPIO read error
    Pin(PinErr),
    /// ADC conversion error
    Adc(AdcErr),
    /// No digital pin registered under this GPIO number
    UnknownPin(u8),
}

impl<PinErr: Debug, AdcErr: Debug> core::fmt::Display for HalError<PinErr, AdcErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::Pin(e) => write!(f, "Pin error: {e:?}"),
            HalError::Adc(e) => write!(f, "ADC error: {e:?}"),
            HalError::UnknownPin(pin) => write!(f, "GPIO{pin} is not registered"),
        }
    }
}

impl<PinErr: Debug, AdcErr: Debug> core::error::Error for HalError<PinErr, AdcErr> {}

/// Digital pins keyed by GPIO number, plus an ADC
pub struct HalInput<P, A> {
    pins: Vec<(u8, P)>,
    adc: A,
}

impl<P, A> HalInput<P, A>
where
    P: InputPin,
    A: AnalogRead,
{
    pub fn new(pins: Vec<(u8, P)>, adc: A) -> Self {
        Self { pins, adc }
    }

    pub fn adc_mut(&mut self) -> &mut A {
        &mut self.adc
    }

    pub fn release(self) -> (Vec<(u8, P)>, A) {
        (self.pins, self.adc)
    }
}

impl<P, A> InputInterface for HalInput<P, A>
where
    P: InputPin,
    A: AnalogRead,
{
    type Error = HalError<P::Error, A::Error>;

    fn read_digital_level(&mut self, pin: u8) -> Result<bool, Self::Error> {
        let (_, driver) = self
            .pins
            .iter_mut()
            .find(|(gpio, _)| *gpio == pin)
            .ok_or(HalError::UnknownPin(pin))?;
        driver.is_high().map_err(HalError::Pin)
    }

    fn read_analog_value(&mut self, pin: u8) -> Result<u16, Self::Error> {
        self.adc.read_raw(pin).map_err(HalError::Adc)
    }
}
