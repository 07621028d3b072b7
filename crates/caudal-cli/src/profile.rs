//! Stream profile file format.
//!
//! Profiles are TOML files holding optional overrides for the driver
//! configuration and the test tone, shared by the play and render commands.
//! Every key is optional; explicit command-line flags win over profile
//! values, and profile values win over built-in defaults.

use std::path::Path;

use caudal_driver::DriverConfig;
use serde::Deserialize;

/// Default tone frequency in Hz.
pub const DEFAULT_FREQUENCY: f32 = 440.0;
/// Default tone amplitude.
pub const DEFAULT_AMPLITUDE: f32 = 0.5;

/// Profile file format.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StreamProfile {
    /// Output sample rate in Hz
    pub sample_rate: Option<u32>,
    /// Chunk size in frames
    pub frames_per_chunk: Option<usize>,
    /// Ring capacity in chunks
    pub ring_chunks: Option<usize>,
    /// Tone frequency in Hz
    pub frequency: Option<f32>,
    /// Tone amplitude (0.0-1.0)
    pub amplitude: Option<f32>,
}

/// Final settings after defaults, profile, and flags are merged.
#[derive(Debug, Clone, Copy)]
pub struct ToneSettings {
    /// Driver configuration for the stream.
    pub config: DriverConfig,
    /// Tone frequency in Hz.
    pub frequency: f32,
    /// Tone amplitude.
    pub amplitude: f32,
}

impl StreamProfile {
    /// Load a profile from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read profile '{}': {}", path.display(), e)
        })?;
        let profile: Self = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse profile '{}': {}", path.display(), e)
        })?;
        tracing::debug!(path = %path.display(), "loaded stream profile");
        Ok(profile)
    }

    /// Load the profile at `path` if one was given, otherwise an empty profile.
    pub fn load_optional(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Merge explicit flag values over this profile.
    pub fn merge(
        &self,
        sample_rate: Option<u32>,
        frames_per_chunk: Option<usize>,
        ring_chunks: Option<usize>,
        frequency: Option<f32>,
        amplitude: Option<f32>,
    ) -> ToneSettings {
        let defaults = DriverConfig::default();
        ToneSettings {
            config: DriverConfig {
                sample_rate: sample_rate
                    .or(self.sample_rate)
                    .unwrap_or(defaults.sample_rate),
                frames_per_chunk: frames_per_chunk
                    .or(self.frames_per_chunk)
                    .unwrap_or(defaults.frames_per_chunk),
                ring_chunks: ring_chunks
                    .or(self.ring_chunks)
                    .unwrap_or(defaults.ring_chunks),
            },
            frequency: frequency.or(self.frequency).unwrap_or(DEFAULT_FREQUENCY),
            amplitude: amplitude.or(self.amplitude).unwrap_or(DEFAULT_AMPLITUDE),
        }
    }
}
