//! Traits for frame acquisition and presentation.

use image::RgbImage;

use crate::geometry::Resolution;

/// A source of frames at a fixed original resolution.
pub trait VideoSource {
    type Error;

    /// Resolution reported by the opened source.
    fn resolution(&self) -> Resolution;

    /// Next frame, or `None` at end of stream. May block until a frame is available.
    fn read_frame(&mut self) -> Result<Option<RgbImage>, Self::Error>;

    /// Release capture handles. Called once when a run ends.
    fn release(&mut self) {}
}

/// Answer from a [`FrameSink`] after presenting a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkControl {
    Continue,
    /// The user asked to stop.
    Quit,
}

/// Destination for annotated frames, typically a display window.
///
/// `present` is the only cancellation point of a run: it performs the bounded
/// key poll and reports [`SinkControl::Quit`] when the user asks to stop.
pub trait FrameSink {
    type Error;

    fn present(&mut self, frame: &RgbImage) -> Result<SinkControl, Self::Error>;

    /// Release display handles. Called once when a run ends.
    fn release(&mut self) {}
}

impl<S: VideoSource + ?Sized> VideoSource for &mut S {
    type Error = S::Error;

    fn resolution(&self) -> Resolution {
        (**self).resolution()
    }

    fn read_frame(&mut self) -> Result<Option<RgbImage>, Self::Error> {
        (**self).read_frame()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    type Error = S::Error;

    fn present(&mut self, frame: &RgbImage) -> Result<SinkControl, Self::Error> {
        (**self).present(frame)
    }

    fn release(&mut self) {
        (**self).release()
    }
}
