//! Stateless line sampling on top of an [`InputInterface`].

use crate::channel::{AnalogLine, DigitalLine};
use crate::interface::InputInterface;

/// Reads configured lines and maps them to logical values.
///
/// Holds nothing but the hardware handle: every call is a pure function of
/// the hardware state at call time.
pub struct InputSampler<I> {
    interface: I,
}

impl<I: InputInterface> InputSampler<I> {
    pub fn new(interface: I) -> Self {
        Self { interface }
    }

    /// `true` while the line sits at its active level.
    pub fn sample_digital(&mut self, line: &DigitalLine) -> Result<bool, I::Error> {
        let level_high = self.interface.read_digital_level(line.pin)?;
        Ok(line.active.is_active(level_high))
    }

    /// Raw ADC value of the line.
    pub fn sample_analog(&mut self, line: &AnalogLine) -> Result<u16, I::Error> {
        self.interface.read_analog_value(line.pin)
    }

    pub fn interface(&self) -> &I {
        &self.interface
    }

    pub fn interface_mut(&mut self) -> &mut I {
        &mut self.interface
    }

    pub fn into_interface(self) -> I {
        self.interface
    }
}
