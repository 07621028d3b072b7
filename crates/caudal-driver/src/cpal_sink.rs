//! cpal-based output device.
//!
//! [`CpalOutput`] is the live playback path: a [`CallbackSink`] that opens a
//! cross-platform output stream via [cpal](https://crates.io/crates/cpal)
//! (ALSA on Linux, CoreAudio on macOS, WASAPI on Windows) and drains the
//! pipeline's ring from the stream callback.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caudal_driver::{AudioDriver, CpalOutput, DriverConfig, DriverMode, SineSource};
//!
//! let config = DriverConfig::default();
//! let sink = CpalOutput::new(&config, Some("headphones"))?;
//! let driver = AudioDriver::start(
//!     config,
//!     SineSource::new(440.0, config.sample_rate),
//!     DriverMode::DeviceDriven(Box::new(sink)),
//! )?;
//! ```

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Host};

use caudal_core::CHANNELS;

use crate::driver::DriverConfig;
use crate::feed::ChunkFeed;
use crate::sink::{CallbackSink, StreamHandle};
use crate::{Error, Result};

/// Extract device name via `description()` (cpal 0.17+).
fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Output device information.
#[derive(Debug, Clone)]
pub struct OutputDeviceInfo {
    /// Human-readable device name.
    pub name: String,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Whether this is the system default output.
    pub is_default: bool,
}

/// List all available output devices.
pub fn list_output_devices() -> Result<Vec<OutputDeviceInfo>> {
    let host = cpal::default_host();
    let default_name = host
        .default_output_device()
        .and_then(|d| device_name(&d).ok());

    let mut devices = Vec::new();
    if let Ok(outputs) = host.output_devices() {
        for device in outputs {
            if let Ok(name) = device_name(&device) {
                let sample_rate = device
                    .default_output_config()
                    .map(|c| c.sample_rate())
                    .unwrap_or(48000);

                devices.push(OutputDeviceInfo {
                    is_default: default_name.as_deref() == Some(name.as_str()),
                    name,
                    default_sample_rate: sample_rate,
                });
            }
        }
    }

    Ok(devices)
}

/// Find a cpal output device by name, or return the default.
fn find_output_device(host: &Host, name: Option<&str>) -> Result<Device> {
    match name {
        Some(search) => {
            let search_lower = search.to_lowercase();
            let devices = host
                .output_devices()
                .map_err(|e| Error::Stream(e.to_string()))?;

            for device in devices {
                if let Ok(dev_name) = device_name(&device)
                    && dev_name.to_lowercase().contains(search_lower.as_str())
                {
                    return Ok(device);
                }
            }
            Err(Error::DeviceNotFound(format!(
                "no output device matching '{}'",
                search
            )))
        }
        None => host.default_output_device().ok_or(Error::NoDevice),
    }
}

/// cpal output stream as a [`CallbackSink`].
///
/// Construction resolves the device; [`CallbackSink::start`] opens the
/// stream and hands the [`ChunkFeed`] to its callback. The stream plays
/// until the handle returned by `start` is dropped.
pub struct CpalOutput {
    device: Device,
    sample_rate: u32,
    frames_per_chunk: usize,
}

impl CpalOutput {
    /// Resolve an output device for the given pipeline configuration.
    ///
    /// `device` filters by case-insensitive substring match; `None` uses
    /// the system default output.
    pub fn new(config: &DriverConfig, device: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();
        let device = find_output_device(&host, device)?;
        tracing::info!(
            host = host.id().name(),
            device = device_name(&device).unwrap_or_else(|_| "<unknown>".into()),
            "output device opened"
        );
        Ok(Self {
            device,
            sample_rate: config.sample_rate,
            frames_per_chunk: config.frames_per_chunk,
        })
    }
}

impl CallbackSink for CpalOutput {
    fn start(self: Box<Self>, mut feed: ChunkFeed) -> Result<StreamHandle> {
        let format = self
            .device
            .default_output_config()
            .map_err(|e| Error::Stream(e.to_string()))?
            .sample_format();

        let stream_config = cpal::StreamConfig {
            channels: CHANNELS as u16,
            sample_rate: self.sample_rate,
            buffer_size: cpal::BufferSize::Fixed(self.frames_per_chunk as u32),
        };

        let stream = match format {
            cpal::SampleFormat::I16 => self
                .device
                .build_output_stream(
                    &stream_config,
                    move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                        feed.fill_chunk(data);
                    },
                    move |err| {
                        tracing::error!(error = %err, "output stream error");
                    },
                    None,
                )
                .map_err(|e| Error::Stream(e.to_string()))?,
            cpal::SampleFormat::F32 => self
                .device
                .build_output_stream(
                    &stream_config,
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        feed.fill_chunk_f32(data);
                    },
                    move |err| {
                        tracing::error!(error = %err, "output stream error");
                    },
                    None,
                )
                .map_err(|e| Error::Stream(e.to_string()))?,
            other => return Err(Error::UnsupportedFormat(format!("{other:?}"))),
        };

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            sample_rate = self.sample_rate,
            frames_per_chunk = self.frames_per_chunk,
            format = ?format,
            "output stream started"
        );

        Ok(StreamHandle::new(stream))
    }
}
