//! Input channel identifiers and their line descriptors.

/// Binary input lines on the Pixel Kit (joystick and push buttons).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigitalChannel {
    JoystickUp,
    JoystickDown,
    JoystickLeft,
    JoystickRight,
    JoystickClick,
    ButtonA,
    ButtonB,
    ButtonReset,
}

impl DigitalChannel {
    pub const ALL: [DigitalChannel; 8] = [
        DigitalChannel::JoystickUp,
        DigitalChannel::JoystickDown,
        DigitalChannel::JoystickLeft,
        DigitalChannel::JoystickRight,
        DigitalChannel::JoystickClick,
        DigitalChannel::ButtonA,
        DigitalChannel::ButtonB,
        DigitalChannel::ButtonReset,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            DigitalChannel::JoystickUp => "joystick up",
            DigitalChannel::JoystickDown => "joystick down",
            DigitalChannel::JoystickLeft => "joystick left",
            DigitalChannel::JoystickRight => "joystick right",
            DigitalChannel::JoystickClick => "joystick click",
            DigitalChannel::ButtonA => "button A",
            DigitalChannel::ButtonB => "button B",
            DigitalChannel::ButtonReset => "reset button",
        }
    }
}

/// Continuous input lines sampled through the ADC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalogChannel {
    Dial,
    Microphone,
}

impl AnalogChannel {
    pub const ALL: [AnalogChannel; 2] = [AnalogChannel::Dial, AnalogChannel::Microphone];

    pub const fn name(self) -> &'static str {
        match self {
            AnalogChannel::Dial => "dial",
            AnalogChannel::Microphone => "microphone",
        }
    }
}

/// Either kind of channel, used where both share an operation (unbind, errors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Digital(DigitalChannel),
    Analog(AnalogChannel),
}

impl Channel {
    pub const fn name(self) -> &'static str {
        match self {
            Channel::Digital(channel) => channel.name(),
            Channel::Analog(channel) => channel.name(),
        }
    }
}

impl From<DigitalChannel> for Channel {
    fn from(channel: DigitalChannel) -> Self {
        Channel::Digital(channel)
    }
}

impl From<AnalogChannel> for Channel {
    fn from(channel: AnalogChannel) -> Self {
        Channel::Analog(channel)
    }
}

impl core::fmt::Display for Channel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Electrical level that means "pressed".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActiveLevel {
    /// Line reads low (0) while pressed; Pixel Kit buttons pull to ground.
    #[default]
    Low,
    High,
}

impl ActiveLevel {
    /// Map a raw line level (`true` = high) to the logical pressed state.
    pub const fn is_active(self, level_high: bool) -> bool {
        match self {
            ActiveLevel::Low => !level_high,
            ActiveLevel::High => level_high,
        }
    }
}

/// A configured binary input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitalLine {
    pub channel: DigitalChannel,
    /// GPIO number
    pub pin: u8,
    pub active: ActiveLevel,
}

impl DigitalLine {
    pub const fn active_low(channel: DigitalChannel, pin: u8) -> Self {
        Self {
            channel,
            pin,
            active: ActiveLevel::Low,
        }
    }
}

/// A configured analog input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalogLine {
    pub channel: AnalogChannel,
    /// GPIO number
    pub pin: u8,
}

impl AnalogLine {
    pub const fn new(channel: AnalogChannel, pin: u8) -> Self {
        Self { channel, pin }
    }
}
