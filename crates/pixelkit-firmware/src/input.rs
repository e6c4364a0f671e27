use core::fmt;

use esp_idf_svc::hal::gpio::{AnyInputPin, Input, PinDriver};
use esp_idf_svc::sys;
use pixelkit::AnalogRead;

pub type InputLine = PinDriver<'static, AnyInputPin, Input>;

const ADC_WIDTH_BIT_12: u32 = 3;
const ADC_ATTEN_DB_11: u32 = 3;

/// GPIO36 (VP) and GPIO39 (VN) on ADC1.
const ADC1_PINS: [(u8, sys::adc_channel_t); 2] = [
    (36, sys::adc_channel_t_ADC_CHANNEL_0),
    (39, sys::adc_channel_t_ADC_CHANNEL_3),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcError {
    /// Pin has no ADC1 channel
    NotAnalog(u8),
    /// Driver returned -1
    Conversion(u8),
}

impl fmt::Display for AdcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdcError::NotAnalog(pin) => write!(f, "GPIO{pin} is not an ADC1 pin"),
            AdcError::Conversion(pin) => write!(f, "ADC conversion failed on GPIO{pin}"),
        }
    }
}

impl std::error::Error for AdcError {}

/// Raw 12-bit reads through the legacy ADC1 driver
pub struct Adc1;

impl Adc1 {
    /// Configure width and attenuation for the dial and microphone channels.
    pub fn init() -> Self {
        unsafe {
            sys::adc1_config_width(ADC_WIDTH_BIT_12);
            for (_, channel) in ADC1_PINS {
                sys::adc1_config_channel_atten(channel, ADC_ATTEN_DB_11);
            }
        }
        Adc1
    }
}

impl AnalogRead for Adc1 {
    type Error = AdcError;

    fn read_raw(&mut self, pin: u8) -> Result<u16, Self::Error> {
        let channel = ADC1_PINS
            .iter()
            .find(|(gpio, _)| *gpio == pin)
            .map(|(_, channel)| *channel)
            .ok_or(AdcError::NotAnalog(pin))?;

        let raw = unsafe { sys::adc1_get_raw(channel) };
        u16::try_from(raw).map_err(|_| AdcError::Conversion(pin))
    }
}
