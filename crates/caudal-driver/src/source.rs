//! Pull-based audio sources.
//!
//! A source produces planar stereo audio on demand. The feeder thread calls
//! [`AudioSource::render`] once per chunk, so implementations must be
//! real-time safe: no blocking, no allocation, no I/O on the render path.

use core::f32::consts::TAU;

/// A pull-based generator of planar stereo audio.
///
/// The driver owns the source for the lifetime of the pipeline and calls
/// [`render`](AudioSource::render) from its feeder thread. Both channel
/// slices always have the same length (one chunk of frames).
pub trait AudioSource: Send {
    /// Fill `left` and `right` with the next block of samples.
    ///
    /// Samples are nominal full-scale floats in `[-1.0, 1.0]`; values
    /// outside that range are saturated during fixed-point conversion.
    /// This runs on the feeder thread every chunk period, so it must not
    /// block, allocate, or perform I/O.
    fn render(&mut self, left: &mut [f32], right: &mut [f32]);
}

/// Fixed-frequency sine generator, identical on both channels.
///
/// # Example
///
/// ```rust
/// use caudal_driver::{AudioSource, SineSource};
///
/// let mut source = SineSource::new(440.0, 48_000);
/// let mut left = [0.0f32; 64];
/// let mut right = [0.0f32; 64];
/// source.render(&mut left, &mut right);
/// ```
#[derive(Debug, Clone)]
pub struct SineSource {
    /// Current phase position [0.0, 1.0)
    phase: f32,
    /// Phase increment per sample
    phase_inc: f32,
    /// Output amplitude [0.0, 1.0]
    amplitude: f32,
}

impl SineSource {
    /// Create a sine source at `frequency` Hz for the given sample rate.
    ///
    /// The default amplitude is 0.5; use [`with_amplitude`](Self::with_amplitude)
    /// to change it.
    pub fn new(frequency: f32, sample_rate: u32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: frequency / sample_rate as f32,
            amplitude: 0.5,
        }
    }

    /// Set the output amplitude, clamped to [0.0, 1.0].
    #[must_use]
    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude.clamp(0.0, 1.0);
        self
    }

    /// Current output amplitude.
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }
}

impl AudioSource for SineSource {
    fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let sample = (self.phase * TAU).sin() * self.amplitude;
            *l = sample;
            *r = sample;
            self.phase += self.phase_inc;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
            }
        }
    }
}
