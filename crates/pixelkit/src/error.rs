//! Error types for the driver layer
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`Error`] - Drawing and binding errors (no hardware involved)
//! - [`ReadError`] - One input line failed to produce a value
//! - [`PollError`] - Every read failure collected during one poll pass
//! - [`HalError`](crate::hal::HalError) - Low-level pin/ADC errors
//!
//! ## Example
//!
//! ```
//! use pixelkit::{Builder, BuilderError, Dimensions};
//!
//! // Missing dimensions
//! let result = Builder::new().build();
//! assert!(matches!(result, Err(BuilderError::MissingDimensions)));
//!
//! // Invalid dimensions
//! let result = Dimensions::new(0, 8);
//! assert!(result.is_err());
//! ```

use alloc::vec::Vec;

use crate::channel::Channel;

/// Longest LED chain a single transfer is allowed to drive.
pub const MAX_PIXELS: u32 = 1024;

/// Errors raised immediately by drawing and binding calls
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// Coordinate outside the grid for an operation that must not clip
    OutOfBounds {
        x: i32,
        y: i32,
    },
    /// Channel is not configured on this device
    InvalidChannel(Channel),
    /// Brightness must be a number in `[0, 1]`
    InvalidBrightness(f32),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::OutOfBounds { x, y } => write!(f, "Pixel ({x}, {y}) is out of bounds"),
            Error::InvalidChannel(channel) => write!(f, "Channel {channel} is not configured"),
            Error::InvalidBrightness(value) => {
                write!(f, "Invalid brightness {value} (expected 0.0..=1.0)")
            }
        }
    }
}

impl core::error::Error for Error {}

/// A configured line failed to produce a value
///
/// Generic over the interface error so callers can match on the underlying
/// hardware failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadError<E> {
    /// Channel whose read failed
    pub channel: Channel,
    /// Error reported by the [`InputInterface`](crate::interface::InputInterface)
    pub source: E,
}

impl<E: core::fmt::Debug> core::fmt::Display for ReadError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Failed to read {}: {:?}", self.channel, self.source)
    }
}

impl<E: core::fmt::Debug> core::error::Error for ReadError<E> {}

/// Read failures collected over one poll pass
///
/// The pass always visits every channel; this holds the ones that failed, in
/// the order they were visited.
#[derive(Debug, Clone, PartialEq)]
pub struct PollError<E> {
    failures: Vec<ReadError<E>>,
}

impl<E> PollError<E> {
    pub(crate) fn new(failures: Vec<ReadError<E>>) -> Self {
        Self { failures }
    }

    pub fn failures(&self) -> &[ReadError<E>] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<ReadError<E>> {
        self.failures
    }

    /// Whether `channel` is among the failed reads.
    pub fn contains(&self, channel: impl Into<Channel>) -> bool {
        let channel = channel.into();
        self.failures.iter().any(|f| f.channel == channel)
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for PollError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} channel(s) failed to read", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            let sep = if i == 0 { ": " } else { ", " };
            write!(f, "{sep}{}", failure.channel)?;
        }
        Ok(())
    }
}

impl<E: core::fmt::Debug> core::error::Error for PollError<E> {}

/// Errors that can occur when building configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BuilderError {
    /// [`Builder::dimensions()`](crate::config::Builder::dimensions) was never called
    MissingDimensions,
    /// See [`Dimensions::new()`](crate::config::Dimensions::new) for constraints.
    InvalidDimensions { width: u32, height: u32 },
    /// Same channel configured twice
    DuplicateChannel(Channel),
    /// Two lines share one GPIO
    DuplicatePin(u8),
    /// Default brightness outside `[0, 1]`
    InvalidBrightness(f32),
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BuilderError::MissingDimensions => write!(f, "Dimensions must be specified"),
            BuilderError::InvalidDimensions { width, height } => write!(
                f,
                "Invalid dimensions {width}x{height} (nonzero, at most {MAX_PIXELS} pixels)"
            ),
            BuilderError::DuplicateChannel(channel) => {
                write!(f, "Channel {channel} configured more than once")
            }
            BuilderError::DuplicatePin(pin) => write!(f, "GPIO{pin} assigned to two lines"),
            BuilderError::InvalidBrightness(value) => {
                write!(f, "Invalid default brightness {value}")
            }
        }
    }
}

impl core::error::Error for BuilderError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{AnalogChannel, DigitalChannel};
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn poll_error_lists_failed_channels() {
        let err = PollError::new(vec![
            ReadError {
                channel: DigitalChannel::ButtonA.into(),
                source: "open",
            },
            ReadError {
                channel: AnalogChannel::Dial.into(),
                source: "timeout",
            },
        ]);

        assert_eq!(
            err.to_string(),
            "2 channel(s) failed to read: button A, dial"
        );
        assert!(err.contains(AnalogChannel::Dial));
        assert!(!err.contains(DigitalChannel::ButtonB));
    }

    #[test]
    fn out_of_bounds_message_names_coordinate() {
        let err = Error::OutOfBounds { x: -1, y: 0 };
        assert_eq!(err.to_string(), "Pixel (-1, 0) is out of bounds");
    }
}
