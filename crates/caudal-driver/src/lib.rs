//! Paced output driver for the caudal audio streaming pipeline.
//!
//! This crate connects a pull-based [`AudioSource`] to a push-based audio
//! output and keeps the two sides in time. It provides:
//!
//! - **The driver**: [`AudioDriver`] owns the feeder thread, the shared ring,
//!   and shutdown ordering for a running pipeline
//! - **Output sinks**: [`OutputSink`] for blocking chunk submission and
//!   [`CallbackSink`] for devices that pull chunks from a callback
//! - **Devices**: [`CpalOutput`] for live playback and [`WavFileSink`] for
//!   capturing the stream to disk
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use caudal_driver::{AudioDriver, CpalOutput, DriverConfig, DriverMode, SineSource};
//!
//! let config = DriverConfig::default();
//! let source = SineSource::new(440.0, config.sample_rate);
//! let sink = CpalOutput::new(&config, None)?;
//!
//! let driver = AudioDriver::start(config, source, DriverMode::DeviceDriven(Box::new(sink)))?;
//! std::thread::sleep(std::time::Duration::from_secs(2));
//! let stats = driver.stop();
//! println!("delivered {} chunks", stats.chunks_delivered);
//! ```

mod cpal_sink;
mod driver;
mod feed;
mod feeder;
mod sink;
mod source;
mod wav;

pub use cpal_sink::{CpalOutput, OutputDeviceInfo, list_output_devices};
pub use driver::{AudioDriver, DriverConfig, DriverMode, StatsSnapshot};
pub use feed::ChunkFeed;
pub use sink::{CallbackSink, OutputSink, StreamHandle};
pub use source::{AudioSource, SineSource};
pub use wav::WavFileSink;

/// Error types for driver operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Driver configuration outside the supported ranges.
    #[error("invalid driver configuration: {0}")]
    Config(String),

    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested sample format is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for driver operations.
pub type Result<T> = std::result::Result<T, Error>;
