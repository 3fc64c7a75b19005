//! Offline track rendering command.

use std::path::PathBuf;

use clap::Args;
use keytone_config::EngineConfig;
use keytone_engine::SoundEngine;
use keytone_io::write_wav;

use super::common::{library_for, music_on, peak, wav_spec};

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Track to render (random if omitted); see `keytone tracks`
    #[arg(long)]
    track: Option<String>,

    /// Seconds of music before the track is stopped
    #[arg(long, default_value = "10.0")]
    duration: f64,

    /// Seconds rendered after the stop, for in-flight notes to ring out
    #[arg(long, default_value = "4.0")]
    tail: f64,
}

pub fn run(args: RenderArgs, config: &EngineConfig) -> anyhow::Result<()> {
    anyhow::ensure!(args.duration > 0.0, "--duration must be positive");
    anyhow::ensure!(args.tail >= 0.0, "--tail must not be negative");

    let mut engine = SoundEngine::from_config(config).with_library(library_for(args.track.as_deref())?);
    engine.update(&music_on());
    let track = engine.current_track().unwrap_or("silence").to_string();
    println!("Rendering {track}...");

    let mut samples = engine.render_offline(args.duration);
    engine.stop_background_music();
    samples.extend(engine.render_offline(args.tail));

    write_wav(&args.output, &samples, wav_spec(config))?;
    println!(
        "Wrote {:.2}s ({} samples, peak {:.3}) to {}",
        samples.len() as f64 / f64::from(config.audio.sample_rate),
        samples.len(),
        peak(&samples),
        args.output.display()
    );
    Ok(())
}
