//! Device configuration types and builder

use alloc::vec::Vec;

use crate::channel::{AnalogChannel, AnalogLine, Channel, DigitalChannel, DigitalLine};
pub use crate::error::{BuilderError, MAX_PIXELS};

/// Brightness the Pixel Kit starts at; full power is blinding at arm's length.
pub const DEFAULT_BRIGHTNESS: f32 = 0.05;

/// Grid dimensions in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if either side is zero or the
    /// grid holds more than [`MAX_PIXELS`] pixels.
    pub fn new(width: u32, height: u32) -> Result<Self, BuilderError> {
        let invalid = BuilderError::InvalidDimensions { width, height };
        if width == 0 || height == 0 {
            return Err(invalid);
        }
        match width.checked_mul(height) {
            Some(count) if count <= MAX_PIXELS => Ok(Self { width, height }),
            _ => Err(invalid),
        }
    }

    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Bytes in one full RGB transfer
    pub const fn buffer_size(&self) -> usize {
        self.pixel_count() * 3
    }
}

/// Device configuration
///
/// Fixed at construction; nothing here changes while the device runs.
/// Use [`Builder`] to create a Config.
#[derive(Clone, Debug)]
pub struct Config {
    /// Matrix dimensions
    pub dimensions: Dimensions,
    /// GPIO driving the LED data line
    pub pixel_pin: u8,
    pub digital: Vec<DigitalLine>,
    pub analog: Vec<AnalogLine>,
    /// Brightness applied until the application changes it
    pub brightness: f32,
}

impl Config {
    pub fn digital_line(&self, channel: DigitalChannel) -> Option<&DigitalLine> {
        self.digital.iter().find(|line| line.channel == channel)
    }

    pub fn analog_line(&self, channel: AnalogChannel) -> Option<&AnalogLine> {
        self.analog.iter().find(|line| line.channel == channel)
    }

    pub fn is_configured(&self, channel: impl Into<Channel>) -> bool {
        match channel.into() {
            Channel::Digital(c) => self.digital_line(c).is_some(),
            Channel::Analog(c) => self.analog_line(c).is_some(),
        }
    }
}

/// Builder for constructing device configuration
///
/// # Example
///
/// ```
/// use pixelkit::{Builder, DigitalChannel, Dimensions};
/// use pixelkit::channel::DigitalLine;
///
/// let config = Builder::new()
///     .dimensions(Dimensions::new(16, 8).unwrap())
///     .digital(DigitalLine::active_low(DigitalChannel::ButtonA, 23))
///     .build()
///     .expect("valid configuration");
/// assert_eq!(config.digital.len(), 1);
/// ```
pub struct Builder {
    /// Matrix dimensions (required)
    dimensions: Option<Dimensions>,
    pixel_pin: u8,
    digital: Vec<DigitalLine>,
    analog: Vec<AnalogLine>,
    brightness: f32,
}

impl Default for Builder {
    fn default() -> Self {
        Builder {
            dimensions: None,
            pixel_pin: 4,
            digital: Vec::new(),
            analog: Vec::new(),
            brightness: DEFAULT_BRIGHTNESS,
        }
    }
}

impl Builder {
    /// Create a new Builder with no lines configured
    pub fn new() -> Self {
        Self::default()
    }

    /// The Pixel Kit board: 16x8 matrix on GPIO4, every line active-low.
    ///
    /// Dial and microphone sit on the ESP32's VP (GPIO36) and VN (GPIO39).
    pub fn pixel_kit() -> Self {
        use DigitalChannel::*;

        Self::new()
            .dimensions(Dimensions {
                width: crate::MATRIX_WIDTH,
                height: crate::MATRIX_HEIGHT,
            })
            .pixel_pin(4)
            .digital(DigitalLine::active_low(JoystickUp, 35))
            .digital(DigitalLine::active_low(JoystickDown, 34))
            .digital(DigitalLine::active_low(JoystickLeft, 26))
            .digital(DigitalLine::active_low(JoystickRight, 25))
            .digital(DigitalLine::active_low(JoystickClick, 27))
            .digital(DigitalLine::active_low(ButtonA, 23))
            .digital(DigitalLine::active_low(ButtonB, 18))
            .digital(DigitalLine::active_low(ButtonReset, 5))
            .analog(AnalogLine::new(AnalogChannel::Dial, 36))
            .analog(AnalogLine::new(AnalogChannel::Microphone, 39))
    }

    /// Set matrix dimensions (required)
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = Some(dims);
        self
    }

    /// Set the LED data GPIO
    pub fn pixel_pin(mut self, pin: u8) -> Self {
        self.pixel_pin = pin;
        self
    }

    /// Add a binary input line
    pub fn digital(mut self, line: DigitalLine) -> Self {
        self.digital.push(line);
        self
    }

    /// Add an analog input line
    pub fn analog(mut self, line: AnalogLine) -> Self {
        self.analog.push(line);
        self
    }

    /// Set the starting brightness
    pub fn brightness(mut self, brightness: f32) -> Self {
        self.brightness = brightness;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// - `BuilderError::MissingDimensions` if dimensions were not set
    /// - `BuilderError::DuplicateChannel` / `DuplicatePin` if two lines collide
    /// - `BuilderError::InvalidBrightness` if brightness is outside `[0, 1]`
    pub fn build(self) -> Result<Config, BuilderError> {
        let dimensions = self.dimensions.ok_or(BuilderError::MissingDimensions)?;
        // Rebuild through the validating constructor; the field is public.
        let dimensions = Dimensions::new(dimensions.width, dimensions.height)?;

        if !(0.0..=1.0).contains(&self.brightness) {
            return Err(BuilderError::InvalidBrightness(self.brightness));
        }

        let mut pins: Vec<u8> = Vec::with_capacity(self.digital.len() + self.analog.len() + 1);
        pins.push(self.pixel_pin);

        for (i, line) in self.digital.iter().enumerate() {
            if self.digital[..i].iter().any(|l| l.channel == line.channel) {
                return Err(BuilderError::DuplicateChannel(line.channel.into()));
            }
            if pins.contains(&line.pin) {
                return Err(BuilderError::DuplicatePin(line.pin));
            }
            pins.push(line.pin);
        }

        for (i, line) in self.analog.iter().enumerate() {
            if self.analog[..i].iter().any(|l| l.channel == line.channel) {
                return Err(BuilderError::DuplicateChannel(line.channel.into()));
            }
            if pins.contains(&line.pin) {
                return Err(BuilderError::DuplicatePin(line.pin));
            }
            pins.push(line.pin);
        }

        Ok(Config {
            dimensions,
            pixel_pin: self.pixel_pin,
            digital: self.digital,
            analog: self.analog,
            brightness: self.brightness,
        })
    }
}
