//! Tone rendering command.
//!
//! Renders to a WAV file either offline (as fast as possible, the default)
//! or paced in real time through the driver's self-paced mode.

use crate::profile::{StreamProfile, ToneSettings};
use caudal_core::{interleave_i16, CHANNELS};
use caudal_driver::{
    AudioDriver, AudioSource, DriverConfig, DriverMode, OutputSink, SineSource, WavFileSink,
};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Duration in seconds
    #[arg(long, default_value = "2.0")]
    duration: f32,

    /// Tone frequency in Hz [default: 440]
    #[arg(short, long)]
    frequency: Option<f32>,

    /// Tone amplitude, 0.0 to 1.0 [default: 0.5]
    #[arg(short, long)]
    amplitude: Option<f32>,

    /// Sample rate in Hz [default: 44100]
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Chunk size in frames [default: 512]
    #[arg(long)]
    frames_per_chunk: Option<usize>,

    /// Pace chunks in real time instead of rendering as fast as possible
    #[arg(long)]
    paced: bool,

    /// Stream profile file (TOML)
    #[arg(short, long)]
    profile: Option<PathBuf>,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let profile = StreamProfile::load_optional(args.profile.as_deref())?;
    let settings = profile.merge(
        args.sample_rate,
        args.frames_per_chunk,
        None,
        args.frequency,
        args.amplitude,
    );
    let config = settings.config;
    config.validate()?;

    let total_frames = (args.duration.max(0.0) * config.sample_rate as f32) as usize;

    println!("Rendering sine tone...");
    println!("  {} Hz for {:.2}s", settings.frequency, args.duration);

    if args.paced {
        render_paced(&args.output, config, settings, total_frames)
    } else {
        render_offline(&args.output, config, settings, total_frames)
    }
}

/// Render the whole tone in one tight loop, no pacing.
fn render_offline(
    output: &Path,
    config: DriverConfig,
    settings: ToneSettings,
    total_frames: usize,
) -> anyhow::Result<()> {
    let mut source = SineSource::new(settings.frequency, config.sample_rate)
        .with_amplitude(settings.amplitude);
    let mut sink = WavFileSink::create(output, config.sample_rate)?;

    let frames = config.frames_per_chunk;
    let mut left = vec![0.0_f32; frames];
    let mut right = vec![0.0_f32; frames];
    let mut chunk = vec![0_i16; frames * CHANNELS];

    let mut remaining = total_frames;
    while remaining > 0 {
        let take = remaining.min(frames);
        source.render(&mut left[..take], &mut right[..take]);
        interleave_i16(&left[..take], &right[..take], &mut chunk[..take * CHANNELS]);
        sink.submit(&chunk[..take * CHANNELS])?;
        remaining -= take;
    }
    sink.finish()?;

    println!("Wrote {} frames to {}", sink.frames_written(), output.display());
    Ok(())
}

/// Stream the tone through the driver, one chunk per pacing interval.
fn render_paced(
    output: &Path,
    config: DriverConfig,
    settings: ToneSettings,
    total_frames: usize,
) -> anyhow::Result<()> {
    let source = SineSource::new(settings.frequency, config.sample_rate)
        .with_amplitude(settings.amplitude);
    let sink = WavFileSink::create(output, config.sample_rate)?;
    let total_chunks = total_frames.div_ceil(config.frames_per_chunk) as u64;

    let driver = AudioDriver::start(config, source, DriverMode::SelfPaced(Box::new(sink)))?;

    let pb = ProgressBar::new(total_chunks);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("##-"),
    );

    loop {
        let stats = driver.stats();
        pb.set_position(stats.chunks_delivered.min(total_chunks));
        if stats.submit_errors > 0 || stats.chunks_delivered >= total_chunks {
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }
    pb.finish_with_message("done");

    let stats = driver.stop();
    if stats.submit_errors > 0 {
        anyhow::bail!("WAV sink rejected {} chunk(s) mid-stream", stats.submit_errors);
    }

    println!(
        "Wrote {} frames to {}",
        stats.chunks_delivered * config.frames_per_chunk as u64,
        output.display()
    );
    Ok(())
}
