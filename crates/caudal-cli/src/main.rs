//! Caudal CLI - Command-line interface for the Caudal streaming audio pipeline.

mod commands;
mod profile;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "caudal")]
#[command(author, version, about = "Caudal streaming audio pipeline CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a test tone on an output device
    Play(commands::play::PlayArgs),

    /// Render a test tone to a WAV file
    Render(commands::render::RenderArgs),

    /// List available output devices
    Devices(commands::devices::DevicesArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => commands::play::run(args),
        Commands::Render(args) => commands::render::run(args),
        Commands::Devices(args) => commands::devices::run(args),
    }
}
