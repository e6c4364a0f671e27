//! Scripted hardware for host-side tests and the scenario harness.
//!
//! [`MockInput`] answers reads from per-pin scripts; [`MockPixels`] records
//! every transfer so tests can inspect what reached the "strip".

use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use alloc::vec::Vec;

use crate::interface::{InputInterface, PixelInterface};

/// Failures the mocks can be told to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    /// Pin was marked disconnected with [`MockInput::disconnect`]
    Disconnected(u8),
    /// [`MockPixels::fail_transfers`] is active
    TransferFailed,
}

impl core::fmt::Display for MockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MockError::Disconnected(pin) => write!(f, "GPIO{pin} disconnected"),
            MockError::TransferFailed => write!(f, "Pixel transfer failed"),
        }
    }
}

impl core::error::Error for MockError {}

/// A value that follows a queued script, then holds the last entry.
#[derive(Debug, Clone)]
struct Script<T> {
    queue: VecDeque<T>,
    current: T,
}

impl<T: Copy> Script<T> {
    fn holding(value: T) -> Self {
        Self {
            queue: VecDeque::new(),
            current: value,
        }
    }

    fn next(&mut self) -> T {
        if let Some(value) = self.queue.pop_front() {
            self.current = value;
        }
        self.current
    }
}

/// Scripted [`InputInterface`]
///
/// Digital pins idle high (released for active-low lines), analog pins idle
/// at 0. Each read consumes one scripted entry; once the script runs out the
/// last entry is repeated.
#[derive(Debug, Clone, Default)]
pub struct MockInput {
    levels: BTreeMap<u8, Script<bool>>,
    values: BTreeMap<u8, Script<u16>>,
    disconnected: BTreeSet<u8>,
    reads: usize,
}

impl MockInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `pin` at a level until changed (`true` = high).
    pub fn set_level(&mut self, pin: u8, high: bool) {
        self.levels.insert(pin, Script::holding(high));
    }

    /// Queue levels returned by successive reads of `pin`.
    pub fn script_levels(&mut self, pin: u8, levels: &[bool]) {
        let script = self.levels.entry(pin).or_insert(Script::holding(true));
        script.queue.extend(levels.iter().copied());
    }

    /// Hold `pin` at a raw ADC value until changed.
    pub fn set_value(&mut self, pin: u8, value: u16) {
        self.values.insert(pin, Script::holding(value));
    }

    /// Queue values returned by successive reads of `pin`.
    pub fn script_values(&mut self, pin: u8, values: &[u16]) {
        let script = self.values.entry(pin).or_insert(Script::holding(0));
        script.queue.extend(values.iter().copied());
    }

    /// Make every read of `pin` fail until [`reconnect`](Self::reconnect).
    pub fn disconnect(&mut self, pin: u8) {
        self.disconnected.insert(pin);
    }

    pub fn reconnect(&mut self, pin: u8) {
        self.disconnected.remove(&pin);
    }

    /// Total reads served, failed ones included.
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl InputInterface for MockInput {
    type Error = MockError;

    fn read_digital_level(&mut self, pin: u8) -> Result<bool, Self::Error> {
        self.reads += 1;
        if self.disconnected.contains(&pin) {
            return Err(MockError::Disconnected(pin));
        }
        Ok(self
            .levels
            .entry(pin)
            .or_insert(Script::holding(true))
            .next())
    }

    fn read_analog_value(&mut self, pin: u8) -> Result<u16, Self::Error> {
        self.reads += 1;
        if self.disconnected.contains(&pin) {
            return Err(MockError::Disconnected(pin));
        }
        Ok(self.values.entry(pin).or_insert(Script::holding(0)).next())
    }
}

/// Recording [`PixelInterface`]
#[derive(Debug, Clone, Default)]
pub struct MockPixels {
    frames: Vec<Vec<u8>>,
    brightness: Option<f32>,
    fail: bool,
}

impl MockPixels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every buffer written so far, oldest first.
    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&[u8]> {
        self.frames.last().map(Vec::as_slice)
    }

    /// Last brightness pushed, if any.
    pub fn brightness(&self) -> Option<f32> {
        self.brightness
    }

    /// Make subsequent transfers fail (or succeed again).
    pub fn fail_transfers(&mut self, fail: bool) {
        self.fail = fail;
    }
}

impl PixelInterface for MockPixels {
    type Error = MockError;

    fn write_pixel_buffer(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.fail {
            return Err(MockError::TransferFailed);
        }
        self.frames.push(bytes.to_vec());
        Ok(())
    }

    fn set_global_brightness(&mut self, brightness: f32) -> Result<(), Self::Error> {
        if self.fail {
            return Err(MockError::TransferFailed);
        }
        self.brightness = Some(brightness);
        Ok(())
    }
}
