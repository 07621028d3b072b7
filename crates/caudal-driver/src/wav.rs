//! WAV file output sink.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use caudal_core::CHANNELS;

use crate::sink::OutputSink;
use crate::{Error, Result};

/// [`OutputSink`] that captures the stream to a 16-bit PCM WAV file.
///
/// Frames are written as they are submitted; [`finish`](OutputSink::finish)
/// finalizes the RIFF header. A finished sink rejects further submissions.
pub struct WavFileSink {
    writer: Option<WavWriter<BufWriter<File>>>,
    frames_written: u64,
}

impl WavFileSink {
    /// Create a WAV file at `path` for interleaved 16-bit stereo.
    pub fn create<P: AsRef<Path>>(path: P, sample_rate: u32) -> Result<Self> {
        let spec = WavSpec {
            channels: CHANNELS as u16,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(path, spec)?;
        Ok(Self {
            writer: Some(writer),
            frames_written: 0,
        })
    }

    /// Frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl OutputSink for WavFileSink {
    fn submit(&mut self, chunk: &[i16]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| Error::Stream("wav sink already finished".into()))?;
        for &sample in chunk {
            writer.write_sample(sample)?;
        }
        self.frames_written += (chunk.len() / CHANNELS) as u64;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.finalize()?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for WavFileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WavFileSink")
            .field("frames_written", &self.frames_written)
            .field("finished", &self.writer.is_none())
            .finish()
    }
}
