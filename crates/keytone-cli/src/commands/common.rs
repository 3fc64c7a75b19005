//! Helpers shared by several commands.

use std::path::Path;

use anyhow::Context;
use keytone_config::{EngineConfig, default_config_path};
use keytone_engine::{GameState, Snapshot};
use keytone_io::WavSpec;
use keytone_synth::{TrackKind, TrackLibrary};

/// Load `path`, or the default config file if it exists, or the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => {
            let path = default_config_path();
            EngineConfig::load_or_default(&path)
                .with_context(|| format!("loading config {}", path.display()))
        }
    }
}

/// A library holding only `track`, or every track when `None`.
pub fn library_for(track: Option<&str>) -> anyhow::Result<TrackLibrary> {
    match track {
        Some(name) => {
            let kind: TrackKind = name.parse()?;
            Ok(TrackLibrary::from_kinds(&[kind]))
        }
        None => Ok(TrackLibrary::standard()),
    }
}

/// A snapshot that asks for background music during play.
pub fn music_on() -> Snapshot {
    Snapshot {
        sound_enabled: true,
        typing_sound_enabled: true,
        background_music_enabled: true,
        game_state: GameState::Playing,
        ..Snapshot::default()
    }
}

/// 32-bit float WAV at the configured rate and channel count.
pub fn wav_spec(config: &EngineConfig) -> WavSpec {
    WavSpec {
        channels: config.audio.channels,
        sample_rate: config.audio.sample_rate,
        bits_per_sample: 32,
    }
}

/// Absolute peak of `samples`.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |m, &s| m.max(s.abs()))
}
