//! Keytone CLI - render, replay and play the keytone sound engine.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "keytone")]
#[command(author, version, about = "Generative typing-game sound engine", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace); overrides RUST_LOG
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in background tracks
    Tracks,

    /// Render a background track to a WAV file
    Render(commands::render::RenderArgs),

    /// Render a one-shot effect to a WAV file
    Effect(commands::effect::EffectArgs),

    /// Replay a JSON-lines snapshot stream through the engine
    Replay(commands::replay::ReplayArgs),

    /// Play a background track on the output device
    Play(commands::play::PlayArgs),

    /// List audio output devices
    Devices,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        1 => "debug".into(),
        _ => "trace".into(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = commands::common::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Tracks => commands::tracks::run(),
        Commands::Render(args) => commands::render::run(args, &config),
        Commands::Effect(args) => commands::effect::run(args, &config),
        Commands::Replay(args) => commands::replay::run(args, &config),
        Commands::Play(args) => commands::play::run(args, &config),
        Commands::Devices => commands::devices::run(),
    }
}
