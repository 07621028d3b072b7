//! Pipeline lifecycle: configuration, delivery mode, and shutdown ordering.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use caudal_core::{BYTES_PER_FRAME, ByteRing, PlaybackSchedule};

use crate::feed::ChunkFeed;
use crate::feeder::{self, FeederContext};
use crate::sink::{CallbackSink, OutputSink, StreamHandle};
use crate::source::AudioSource;
use crate::{Error, Result};

/// Accepted sample rate range in Hz.
const SAMPLE_RATE_RANGE: RangeInclusive<u32> = 8_000..=96_000;
/// Accepted chunk size range in frames.
const FRAMES_RANGE: RangeInclusive<usize> = 64..=8_192;
/// Floor for the backpressure retry sleep in microseconds.
const MIN_BACKOFF_MICROS: u64 = 500;

/// Configuration for a streaming pipeline.
///
/// ## Fields
///
/// - `sample_rate`: Output sample rate in Hz (default: 44100)
/// - `frames_per_chunk`: Frames moved per render/submit cycle (default: 512)
/// - `ring_chunks`: Ring capacity in whole chunks for device-driven mode
///   (default: 4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Frames per chunk.
    pub frames_per_chunk: usize,
    /// Ring capacity in whole chunks (device-driven mode only).
    pub ring_chunks: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            frames_per_chunk: 512,
            ring_chunks: 4,
        }
    }
}

impl DriverConfig {
    /// Check every field against its supported range.
    pub fn validate(&self) -> Result<()> {
        if !SAMPLE_RATE_RANGE.contains(&self.sample_rate) {
            return Err(Error::Config(format!(
                "sample rate {} Hz outside {}..={}",
                self.sample_rate,
                SAMPLE_RATE_RANGE.start(),
                SAMPLE_RATE_RANGE.end()
            )));
        }
        if !FRAMES_RANGE.contains(&self.frames_per_chunk) {
            return Err(Error::Config(format!(
                "chunk size {} frames outside {}..={}",
                self.frames_per_chunk,
                FRAMES_RANGE.start(),
                FRAMES_RANGE.end()
            )));
        }
        if self.ring_chunks < 2 {
            return Err(Error::Config(format!(
                "ring capacity {} chunks, need at least 2",
                self.ring_chunks
            )));
        }
        Ok(())
    }

    /// Size of one interleaved stereo chunk in bytes.
    pub fn chunk_bytes(&self) -> usize {
        self.frames_per_chunk * BYTES_PER_FRAME
    }
}

/// How finished chunks reach the output.
///
/// The delivery contract travels with the variant, so a self-paced pipeline
/// cannot be started with a callback device or vice versa.
pub enum DriverMode {
    /// The feeder paces itself against a deadline schedule and pushes chunks
    /// straight into the sink.
    SelfPaced(Box<dyn OutputSink>),
    /// The device pulls audio from a shared ring on its own callback thread;
    /// the feeder keeps the ring topped up.
    DeviceDriven(Box<dyn CallbackSink>),
}

impl DriverMode {
    fn label(&self) -> &'static str {
        match self {
            DriverMode::SelfPaced(_) => "self-paced",
            DriverMode::DeviceDriven(_) => "device-driven",
        }
    }
}

impl std::fmt::Debug for DriverMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Counters shared between the feeder thread and the device callback.
///
/// All fields are incremented with `Relaxed` ordering; the counters are
/// monotonic and a snapshot only needs to be approximately simultaneous.
#[derive(Debug, Default)]
pub(crate) struct SharedStats {
    pub(crate) chunks_rendered: AtomicU64,
    pub(crate) chunks_delivered: AtomicU64,
    pub(crate) submit_errors: AtomicU64,
    pub(crate) underrun_bytes: AtomicU64,
    pub(crate) backpressure_waits: AtomicU64,
}

impl SharedStats {
    fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            chunks_rendered: self.chunks_rendered.load(Ordering::Relaxed),
            chunks_delivered: self.chunks_delivered.load(Ordering::Relaxed),
            submit_errors: self.submit_errors.load(Ordering::Relaxed),
            underrun_bytes: self.underrun_bytes.load(Ordering::Relaxed),
            backpressure_waits: self.backpressure_waits.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the pipeline counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Chunks rendered by the source.
    pub chunks_rendered: u64,
    /// Chunks fully handed to the output.
    pub chunks_delivered: u64,
    /// Sink submissions that returned an error (self-paced mode).
    pub submit_errors: u64,
    /// Bytes of silence inserted by the device callback (device-driven mode).
    pub underrun_bytes: u64,
    /// Times the feeder slept waiting for ring space (device-driven mode).
    pub backpressure_waits: u64,
}

/// A running audio pipeline.
///
/// [`start`](AudioDriver::start) spawns the feeder thread and, in
/// device-driven mode, the output stream. [`stop`](AudioDriver::stop) tears
/// everything down in dependency order: the stop flag is raised first, the
/// feeder is joined, the device handle is dropped, and only then does the
/// ring go away with the driver itself. Dropping a running driver performs
/// the same shutdown.
pub struct AudioDriver {
    stop: Arc<AtomicBool>,
    feeder: Option<JoinHandle<()>>,
    device: Option<StreamHandle>,
    stats: Arc<SharedStats>,
    config: DriverConfig,
}

impl AudioDriver {
    /// Start a pipeline that pulls audio from `source` and delivers it
    /// through `mode`.
    ///
    /// In device-driven mode the output stream starts before the feeder
    /// thread, so the first callbacks may drain an empty ring and play
    /// silence; the feeder catches up within a chunk period.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `config` fails validation, or the
    /// device error when the output stream cannot be started.
    pub fn start<S: AudioSource + 'static>(
        config: DriverConfig,
        source: S,
        mode: DriverMode,
    ) -> Result<Self> {
        config.validate()?;

        let stop = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(SharedStats::default());
        let mode_label = mode.label();

        let ctx = FeederContext {
            source,
            frames_per_chunk: config.frames_per_chunk,
            stop: Arc::clone(&stop),
            stats: Arc::clone(&stats),
        };

        let (feeder, device) = match mode {
            DriverMode::SelfPaced(sink) => {
                let schedule =
                    PlaybackSchedule::new(config.frames_per_chunk, config.sample_rate);
                let feeder = thread::Builder::new()
                    .name("caudal-feeder".into())
                    .spawn(move || feeder::run_self_paced(ctx, schedule, sink))
                    .map_err(Error::Io)?;
                (feeder, None)
            }
            DriverMode::DeviceDriven(sink) => {
                let ring = ByteRing::new(config.ring_chunks * config.chunk_bytes() + 1);
                let (producer, consumer) = ring.split();
                let feed =
                    ChunkFeed::new(consumer, config.frames_per_chunk, Arc::clone(&stats));
                // Device first: if the stream fails to start there is no
                // feeder to unwind, and if the spawn below fails the handle
                // drops and stops the stream on the way out.
                let handle = sink.start(feed)?;
                let interval = PlaybackSchedule::new(config.frames_per_chunk, config.sample_rate)
                    .interval_micros();
                let backoff = Duration::from_micros((interval / 4).max(MIN_BACKOFF_MICROS));
                let feeder = thread::Builder::new()
                    .name("caudal-feeder".into())
                    .spawn(move || feeder::run_device_driven(ctx, producer, backoff))
                    .map_err(Error::Io)?;
                (feeder, Some(handle))
            }
        };

        tracing::info!(
            sample_rate = config.sample_rate,
            frames_per_chunk = config.frames_per_chunk,
            mode = mode_label,
            "audio driver started"
        );

        Ok(Self {
            stop,
            feeder: Some(feeder),
            device,
            stats,
            config,
        })
    }

    /// Stop the pipeline and return the final counters.
    pub fn stop(mut self) -> StatsSnapshot {
        self.shutdown();
        self.stats.snapshot()
    }

    /// The configuration the pipeline was started with.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Counters for a pipeline that is still running.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        let Some(feeder) = self.feeder.take() else {
            return;
        };
        if feeder.join().is_err() {
            tracing::error!("feeder thread panicked");
        }
        drop(self.device.take());

        let stats = self.stats.snapshot();
        tracing::info!(
            chunks_rendered = stats.chunks_rendered,
            chunks_delivered = stats.chunks_delivered,
            submit_errors = stats.submit_errors,
            underrun_bytes = stats.underrun_bytes,
            backpressure_waits = stats.backpressure_waits,
            "audio driver stopped"
        );
    }
}

impl Drop for AudioDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}
