//! Hardware context for one Pixel Kit.

use crate::canvas::Canvas;
use crate::config::Config;
use crate::dispatcher::EventDispatcher;
use crate::error::PollError;
use crate::interface::{InputInterface, PixelInterface};
use crate::sampler::InputSampler;

/// Owns the input and strip handles plus the static configuration.
///
/// Built once at startup and handed to the dispatcher and canvas on every
/// call; [`release`](Device::release) gives the handles back.
///
/// ```
/// use pixelkit::{Builder, Canvas, Device, EventDispatcher, MockInput, MockPixels};
///
/// let config = Builder::pixel_kit().build().unwrap();
/// let mut device = Device::new(config, MockInput::new(), MockPixels::new());
/// let mut dispatcher = EventDispatcher::new(device.config());
/// let mut canvas = Canvas::new(device.config());
///
/// // draw, present, poll
/// canvas.fill_rect(0, 0, 4, 4, pixelkit::color::GREEN);
/// device.present(&mut canvas).unwrap();
/// device.poll(&mut dispatcher).unwrap();
/// ```
pub struct Device<I, P> {
    config: Config,
    sampler: InputSampler<I>,
    strip: P,
}

impl<I, P> Device<I, P>
where
    I: InputInterface,
    P: PixelInterface,
{
    pub fn new(config: Config, input: I, strip: P) -> Self {
        log::info!(
            "Device: {}x{} matrix on GPIO{}, {} digital / {} analog lines",
            config.dimensions.width,
            config.dimensions.height,
            config.pixel_pin,
            config.digital.len(),
            config.analog.len()
        );
        Self {
            config,
            sampler: InputSampler::new(input),
            strip,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one poll pass of `dispatcher` against this device's lines.
    pub fn poll(&mut self, dispatcher: &mut EventDispatcher) -> Result<(), PollError<I::Error>> {
        dispatcher.poll(&mut self.sampler)
    }

    /// Transfer `canvas` to the strip.
    pub fn present(&mut self, canvas: &mut Canvas) -> Result<(), P::Error> {
        canvas.present(&mut self.strip)
    }

    pub fn sampler_mut(&mut self) -> &mut InputSampler<I> {
        &mut self.sampler
    }

    pub fn input(&self) -> &I {
        self.sampler.interface()
    }

    pub fn input_mut(&mut self) -> &mut I {
        self.sampler.interface_mut()
    }

    pub fn strip(&self) -> &P {
        &self.strip
    }

    pub fn strip_mut(&mut self) -> &mut P {
        &mut self.strip
    }

    /// Tear down and hand back the hardware handles.
    pub fn release(self) -> (I, P) {
        log::info!("Device: released");
        (self.sampler.into_interface(), self.strip)
    }
}
