//! Input polling and LED matrix drawing for the Pixel Kit.
//! Works on ESP32 and on the desktop (simulator, scenario tests).
//!
//! # Architecture
//!
//! ```text
//!   Application (bound handlers, drawing)
//!        │                    │
//!        ▼                    ▼
//! ┌──────────────┐     ┌─────────────┐
//! │  Dispatcher  │     │   Canvas    │
//! │ (edge state) │     │ (16x8 RGB)  │
//! └──────┬───────┘     └──────┬──────┘
//!        ▼                    │
//! ┌──────────────┐            │
//! │ InputSampler │            │
//! └──────┬───────┘            │
//!        ▼                    ▼
//! ┌────────────────┐  ┌────────────────┐
//! │ InputInterface │  │ PixelInterface │
//! └────────────────┘  └────────────────┘
//! ```
//!
//! The host drives everything from one loop: draw, present, poll, repeat.
//! Both sides hang off a [`Device`], which owns the hardware handles.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::unreachable,
        clippy::unwrap_used
    )
)]

extern crate alloc;

pub mod canvas;
pub mod channel;
pub mod color;
pub mod config;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod hal;
pub mod interface;
pub mod mock;
pub mod sampler;
pub mod sketch;

pub use canvas::Canvas;
pub use channel::{ActiveLevel, AnalogChannel, AnalogLine, Channel, DigitalChannel, DigitalLine};
pub use config::{Builder, Config, Dimensions};
pub use device::Device;
pub use dispatcher::EventDispatcher;
pub use error::{BuilderError, Error, PollError, ReadError};
pub use hal::{AnalogRead, HalError, HalInput};
pub use interface::{InputInterface, PixelInterface};
pub use mock::{MockInput, MockPixels};
pub use sampler::InputSampler;
pub use sketch::Sketch;

pub use embedded_graphics::pixelcolor::Rgb888;

/// Pixel Kit matrix dimensions (landscape, as mounted).
pub const MATRIX_WIDTH: u32 = 16;
pub const MATRIX_HEIGHT: u32 = 8;

/// Largest raw value the ESP32 12-bit ADC produces.
pub const ADC_MAX: u16 = 4095;
