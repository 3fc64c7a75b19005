//! One-shot effect rendering command.

use std::path::PathBuf;

use clap::Args;
use keytone_config::EngineConfig;
use keytone_engine::SoundEngine;
use keytone_io::write_wav;
use keytone_synth::{SoundEffect, TrackLibrary};

use super::common::{peak, wav_spec};

/// Name accepted for the typing click alongside the effect names.
const KEYSTROKE: &str = "keystroke";

#[derive(Args)]
pub struct EffectArgs {
    /// Effect name: correct, incorrect, complete, levelup or keystroke
    #[arg(value_name = "NAME")]
    name: String,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Seconds to render
    #[arg(long, default_value = "1.0")]
    duration: f64,
}

pub fn run(args: EffectArgs, config: &EngineConfig) -> anyhow::Result<()> {
    let mut engine = SoundEngine::from_config(config).with_library(TrackLibrary::new());

    if args.name == KEYSTROKE {
        engine.play_keystroke();
    } else {
        let effect: SoundEffect = args.name.parse()?;
        engine.play_effect(effect.name());
    }

    let samples = engine.render_offline(args.duration);
    write_wav(&args.output, &samples, wav_spec(config))?;
    println!(
        "Wrote {} ({} samples, peak {:.3}) to {}",
        args.name,
        samples.len(),
        peak(&samples),
        args.output.display()
    );
    Ok(())
}
