//! Edge detection and handler dispatch.
//!
//! [`EventDispatcher::poll`] turns raw samples into discrete events:
//!
//! - digital lines fire their press handler once per press edge; holding a
//!   button fires nothing more, and releasing it is silent
//! - analog lines fire their change handler with the new value whenever the
//!   sample differs from that channel's previous one
//!
//! Each channel owns its own latch or value slot, and only that channel's
//! reads ever write to it.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::channel::{AnalogChannel, AnalogLine, Channel, DigitalChannel, DigitalLine};
use crate::config::Config;
use crate::error::{Error, PollError, ReadError};
use crate::interface::InputInterface;
use crate::sampler::InputSampler;

/// Called on a press edge.
pub type PressHandler = Box<dyn FnMut()>;
/// Called with the new value when an analog reading changes.
pub type ChangeHandler = Box<dyn FnMut(u16)>;

struct DigitalSlot {
    line: DigitalLine,
    pressed: bool,
    handler: Option<PressHandler>,
}

struct AnalogSlot {
    line: AnalogLine,
    /// `None` until the first successful read, which seeds it silently.
    last: Option<u16>,
    handler: Option<ChangeHandler>,
}

/// Owns press latches, analog value slots and handler bindings.
///
/// Not thread-safe: `poll` and the bind calls are meant to be driven from the
/// one loop that also draws.
pub struct EventDispatcher {
    digital: Vec<DigitalSlot>,
    analog: Vec<AnalogSlot>,
}

impl EventDispatcher {
    /// One slot per configured line, all released and unbound.
    pub fn new(config: &Config) -> Self {
        Self {
            digital: config
                .digital
                .iter()
                .map(|&line| DigitalSlot {
                    line,
                    pressed: false,
                    handler: None,
                })
                .collect(),
            analog: config
                .analog
                .iter()
                .map(|&line| AnalogSlot {
                    line,
                    last: None,
                    handler: None,
                })
                .collect(),
        }
    }

    /// Bind the press handler of `channel`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// `Error::InvalidChannel` if `channel` is not configured.
    pub fn bind_press<F>(&mut self, channel: DigitalChannel, handler: F) -> Result<(), Error>
    where
        F: FnMut() + 'static,
    {
        let slot = self.digital_slot(channel)?;
        slot.handler = Some(Box::new(handler));
        Ok(())
    }

    /// Bind the change handler of `channel`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// `Error::InvalidChannel` if `channel` is not configured.
    pub fn bind_change<F>(&mut self, channel: AnalogChannel, handler: F) -> Result<(), Error>
    where
        F: FnMut(u16) + 'static,
    {
        let slot = self.analog_slot(channel)?;
        slot.handler = Some(Box::new(handler));
        Ok(())
    }

    /// Clear whatever handler is bound to `channel`.
    ///
    /// Latches and stored values are untouched, so rebinding later does not
    /// replay an edge that already happened.
    pub fn unbind(&mut self, channel: impl Into<Channel>) -> Result<(), Error> {
        match channel.into() {
            Channel::Digital(c) => self.digital_slot(c)?.handler = None,
            Channel::Analog(c) => self.analog_slot(c)?.handler = None,
        }
        Ok(())
    }

    pub fn is_bound(&self, channel: impl Into<Channel>) -> bool {
        match channel.into() {
            Channel::Digital(c) => self
                .digital
                .iter()
                .any(|s| s.line.channel == c && s.handler.is_some()),
            Channel::Analog(c) => self
                .analog
                .iter()
                .any(|s| s.line.channel == c && s.handler.is_some()),
        }
    }

    /// Value currently stored for `channel`; `None` before its first read.
    pub fn last_value(&self, channel: AnalogChannel) -> Option<u16> {
        self.analog
            .iter()
            .find(|s| s.line.channel == channel)
            .and_then(|s| s.last)
    }

    /// Sample every configured line once and fire handlers for its edges.
    ///
    /// A failed read leaves that channel's state as it was and does not stop
    /// the pass; all failures are returned together at the end.
    ///
    /// # Errors
    ///
    /// `PollError` listing every channel whose read failed in this pass.
    pub fn poll<I: InputInterface>(
        &mut self,
        sampler: &mut InputSampler<I>,
    ) -> Result<(), PollError<I::Error>> {
        let mut failures = Vec::new();

        for slot in self.digital.iter_mut() {
            let pressed = match sampler.sample_digital(&slot.line) {
                Ok(pressed) => pressed,
                Err(source) => {
                    log::warn!("Input: failed to read {}: {:?}", slot.line.channel.name(), source);
                    failures.push(ReadError {
                        channel: slot.line.channel.into(),
                        source,
                    });
                    continue;
                }
            };

            if pressed && !slot.pressed {
                slot.pressed = true;
                log::debug!("Input: {} pressed", slot.line.channel.name());
                if let Some(handler) = slot.handler.as_mut() {
                    handler();
                }
            } else if !pressed && slot.pressed {
                // Release edges only re-arm the latch.
                slot.pressed = false;
            }
        }

        for slot in self.analog.iter_mut() {
            let value = match sampler.sample_analog(&slot.line) {
                Ok(value) => value,
                Err(source) => {
                    log::warn!("Input: failed to read {}: {:?}", slot.line.channel.name(), source);
                    failures.push(ReadError {
                        channel: slot.line.channel.into(),
                        source,
                    });
                    continue;
                }
            };

            match slot.last {
                None => slot.last = Some(value),
                Some(last) if last != value => {
                    slot.last = Some(value);
                    log::debug!("Input: {} changed to {}", slot.line.channel.name(), value);
                    if let Some(handler) = slot.handler.as_mut() {
                        handler(value);
                    }
                }
                Some(_) => {}
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(PollError::new(failures))
        }
    }

    fn digital_slot(&mut self, channel: DigitalChannel) -> Result<&mut DigitalSlot, Error> {
        self.digital
            .iter_mut()
            .find(|s| s.line.channel == channel)
            .ok_or(Error::InvalidChannel(channel.into()))
    }

    fn analog_slot(&mut self, channel: AnalogChannel) -> Result<&mut AnalogSlot, Error> {
        self.analog
            .iter_mut()
            .find(|s| s.line.channel == channel)
            .ok_or(Error::InvalidChannel(channel.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, Dimensions};
    use crate::mock::{MockError, MockInput};
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::{Cell, RefCell};

    const LOW: bool = false;
    const HIGH: bool = true;

    fn setup() -> (EventDispatcher, InputSampler<MockInput>) {
        let config = Builder::pixel_kit().build().unwrap();
        (EventDispatcher::new(&config), InputSampler::new(MockInput::new()))
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
        let count = Rc::new(Cell::new(0));
        let handle = count.clone();
        (count, move || handle.set(handle.get() + 1))
    }

    fn recorder() -> (Rc<RefCell<Vec<u16>>>, impl FnMut(u16) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let handle = seen.clone();
        (seen, move |value| handle.borrow_mut().push(value))
    }

    #[test]
    fn button_a_reads_low_low_high_low_fires_twice() {
        let (mut dispatcher, mut sampler) = setup();
        let (count, handler) = counter();
        dispatcher.bind_press(DigitalChannel::ButtonA, handler).unwrap();
        sampler
            .interface_mut()
            .script_levels(23, &[LOW, LOW, HIGH, LOW]);

        for _ in 0..4 {
            dispatcher.poll(&mut sampler).unwrap();
        }

        assert_eq!(count.get(), 2);
    }

    #[test]
    fn held_press_fires_once() {
        let (mut dispatcher, mut sampler) = setup();
        let (count, handler) = counter();
        dispatcher.bind_press(DigitalChannel::JoystickUp, handler).unwrap();
        sampler.interface_mut().set_level(35, LOW);

        for _ in 0..25 {
            dispatcher.poll(&mut sampler).unwrap();
        }

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn press_release_press_fires_two_and_no_release_events() {
        for channel in DigitalChannel::ALL {
            let (mut dispatcher, mut sampler) = setup();
            let pin = Builder::pixel_kit()
                .build()
                .unwrap()
                .digital_line(channel)
                .unwrap()
                .pin;
            let (count, handler) = counter();
            dispatcher.bind_press(channel, handler).unwrap();
            sampler
                .interface_mut()
                .script_levels(pin, &[LOW, HIGH, HIGH, LOW, HIGH]);

            for _ in 0..5 {
                dispatcher.poll(&mut sampler).unwrap();
            }

            assert_eq!(count.get(), 2, "{}", channel.name());
        }
    }

    #[test]
    fn dial_change_fires_once_with_new_value() {
        let (mut dispatcher, mut sampler) = setup();
        let (seen, handler) = recorder();
        dispatcher.bind_change(AnalogChannel::Dial, handler).unwrap();
        sampler.interface_mut().script_values(36, &[100, 100, 250]);

        for _ in 0..3 {
            dispatcher.poll(&mut sampler).unwrap();
        }

        assert_eq!(*seen.borrow(), vec![250]);
        assert_eq!(dispatcher.last_value(AnalogChannel::Dial), Some(250));
    }

    #[test]
    fn analog_channels_keep_separate_slots() {
        let (mut dispatcher, mut sampler) = setup();
        let (dial_seen, dial_handler) = recorder();
        let (mic_seen, mic_handler) = recorder();
        dispatcher.bind_change(AnalogChannel::Dial, dial_handler).unwrap();
        dispatcher
            .bind_change(AnalogChannel::Microphone, mic_handler)
            .unwrap();
        sampler.interface_mut().script_values(36, &[10, 10, 10]);
        sampler.interface_mut().script_values(39, &[500, 900, 900]);

        for _ in 0..3 {
            dispatcher.poll(&mut sampler).unwrap();
        }

        assert!(dial_seen.borrow().is_empty());
        assert_eq!(*mic_seen.borrow(), vec![900]);
        assert_eq!(dispatcher.last_value(AnalogChannel::Dial), Some(10));
        assert_eq!(dispatcher.last_value(AnalogChannel::Microphone), Some(900));
    }

    #[test]
    fn unchanged_analog_never_fires() {
        let (mut dispatcher, mut sampler) = setup();
        let (seen, handler) = recorder();
        dispatcher.bind_change(AnalogChannel::Microphone, handler).unwrap();
        sampler.interface_mut().set_value(39, 2048);

        for _ in 0..10 {
            dispatcher.poll(&mut sampler).unwrap();
        }

        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn missing_handler_is_noop_but_state_advances() {
        let (mut dispatcher, mut sampler) = setup();
        sampler.interface_mut().set_level(23, LOW);
        dispatcher.poll(&mut sampler).unwrap();

        // Still held: binding now must not replay the press that already happened.
        let (count, handler) = counter();
        dispatcher.bind_press(DigitalChannel::ButtonA, handler).unwrap();
        dispatcher.poll(&mut sampler).unwrap();
        assert_eq!(count.get(), 0);

        sampler.interface_mut().set_level(23, HIGH);
        dispatcher.poll(&mut sampler).unwrap();
        sampler.interface_mut().set_level(23, LOW);
        dispatcher.poll(&mut sampler).unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn rebinding_replaces_and_unbind_silences() {
        let (mut dispatcher, mut sampler) = setup();
        let (first, first_handler) = counter();
        let (second, second_handler) = counter();
        dispatcher.bind_press(DigitalChannel::ButtonB, first_handler).unwrap();
        dispatcher.bind_press(DigitalChannel::ButtonB, second_handler).unwrap();
        sampler.interface_mut().script_levels(18, &[LOW, HIGH, LOW]);

        dispatcher.poll(&mut sampler).unwrap();
        assert_eq!((first.get(), second.get()), (0, 1));

        dispatcher.unbind(DigitalChannel::ButtonB).unwrap();
        assert!(!dispatcher.is_bound(DigitalChannel::ButtonB));
        dispatcher.poll(&mut sampler).unwrap();
        dispatcher.poll(&mut sampler).unwrap();
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn unconfigured_channel_is_rejected() {
        let config = Builder::new()
            .dimensions(Dimensions::new(16, 8).unwrap())
            .digital(DigitalLine::active_low(DigitalChannel::ButtonA, 23))
            .build()
            .unwrap();
        let mut dispatcher = EventDispatcher::new(&config);

        assert_eq!(
            dispatcher.bind_press(DigitalChannel::ButtonB, || {}),
            Err(Error::InvalidChannel(DigitalChannel::ButtonB.into()))
        );
        assert_eq!(
            dispatcher.bind_change(AnalogChannel::Dial, |_| {}),
            Err(Error::InvalidChannel(AnalogChannel::Dial.into()))
        );
        assert_eq!(
            dispatcher.unbind(AnalogChannel::Microphone),
            Err(Error::InvalidChannel(AnalogChannel::Microphone.into()))
        );
        assert!(dispatcher.bind_press(DigitalChannel::ButtonA, || {}).is_ok());
    }

    #[test]
    fn failing_line_is_reported_and_others_still_dispatch() {
        let (mut dispatcher, mut sampler) = setup();
        let (a_count, a_handler) = counter();
        let (up_count, up_handler) = counter();
        let (seen, dial_handler) = recorder();
        dispatcher.bind_press(DigitalChannel::ButtonA, a_handler).unwrap();
        dispatcher.bind_press(DigitalChannel::JoystickUp, up_handler).unwrap();
        dispatcher.bind_change(AnalogChannel::Dial, dial_handler).unwrap();

        sampler.interface_mut().set_value(36, 100);
        dispatcher.poll(&mut sampler).unwrap();

        sampler.interface_mut().disconnect(35);
        sampler.interface_mut().disconnect(39);
        sampler.interface_mut().set_level(23, LOW);
        sampler.interface_mut().set_value(36, 300);

        let err = dispatcher.poll(&mut sampler).unwrap_err();
        assert_eq!(err.failures().len(), 2);
        assert!(err.contains(DigitalChannel::JoystickUp));
        assert!(err.contains(AnalogChannel::Microphone));
        assert_eq!(err.failures()[0].source, MockError::Disconnected(35));
        assert_eq!(a_count.get(), 1);
        assert_eq!(*seen.borrow(), vec![300]);

        // The line resumes from its pre-failure state once readable again.
        sampler.interface_mut().reconnect(35);
        sampler.interface_mut().set_level(35, LOW);
        dispatcher.poll(&mut sampler).unwrap_err();
        assert_eq!(up_count.get(), 1);
    }

    #[test]
    fn failed_read_keeps_latch() {
        let (mut dispatcher, mut sampler) = setup();
        let (count, handler) = counter();
        dispatcher.bind_press(DigitalChannel::JoystickClick, handler).unwrap();
        sampler.interface_mut().set_level(27, LOW);
        dispatcher.poll(&mut sampler).unwrap();

        sampler.interface_mut().disconnect(27);
        assert!(dispatcher.poll(&mut sampler).is_err());
        sampler.interface_mut().reconnect(27);
        dispatcher.poll(&mut sampler).unwrap();

        assert_eq!(count.get(), 1);
    }
}
