//! Live tone playback command.

use crate::profile::StreamProfile;
use caudal_driver::{AudioDriver, CpalOutput, DriverMode, SineSource};
use clap::Args;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Args)]
pub struct PlayArgs {
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

    /// Ring capacity in chunks [default: 4]
    #[arg(long)]
    ring_chunks: Option<usize>,

    /// Output device name (substring match, default device if omitted)
    #[arg(long)]
    device: Option<String>,

    /// Stop after this many seconds (runs until Ctrl+C if omitted)
    #[arg(short, long)]
    duration: Option<f32>,

    /// Stream profile file (TOML)
    #[arg(short, long)]
    profile: Option<PathBuf>,
}

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    let profile = StreamProfile::load_optional(args.profile.as_deref())?;
    let settings = profile.merge(
        args.sample_rate,
        args.frames_per_chunk,
        args.ring_chunks,
        args.frequency,
        args.amplitude,
    );
    let config = settings.config;

    let source = SineSource::new(settings.frequency, config.sample_rate)
        .with_amplitude(settings.amplitude);
    let output = CpalOutput::new(&config, args.device.as_deref())?;

    println!(
        "Playing {} Hz sine at amplitude {:.2}",
        settings.frequency, settings.amplitude
    );
    println!("  Sample rate: {} Hz", config.sample_rate);
    println!("  Chunk size: {} frames", config.frames_per_chunk);
    println!("  Ring capacity: {} chunks", config.ring_chunks);

    let driver = AudioDriver::start(config, source, DriverMode::DeviceDriven(Box::new(output)))?;

    match args.duration {
        Some(secs) => {
            println!("\nPlaying for {:.1} s...\n", secs);
            thread::sleep(Duration::from_secs_f32(secs.max(0.0)));
        }
        None => {
            println!("\nPress Ctrl+C to stop...\n");

            // Set up Ctrl+C handler
            let running = Arc::new(AtomicBool::new(true));
            let r = Arc::clone(&running);
            ctrlc::set_handler(move || {
                println!("\nStopping...");
                r.store(false, Ordering::SeqCst);
            })?;

            while running.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(50));
            }
        }
    }

    let stats = driver.stop();
    println!("Done!");
    println!("  Chunks delivered: {}", stats.chunks_delivered);
    if stats.underrun_bytes > 0 {
        println!("  Silence inserted: {} bytes", stats.underrun_bytes);
    }
    if stats.backpressure_waits > 0 {
        println!("  Backpressure waits: {}", stats.backpressure_waits);
    }

    Ok(())
}
