//! Live playback on the output device.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Args;
use keytone_config::EngineConfig;
use keytone_core::{AudioContext, ContextOptions, SharedContext};
use keytone_engine::SoundEngine;
use keytone_io::{BackendStreamConfig, CpalBackend, start_output};

use super::common::{library_for, music_on};

#[derive(Args)]
pub struct PlayArgs {
    /// Track to play (random if omitted); see `keytone tracks`
    #[arg(long)]
    track: Option<String>,

    /// Stop after this many seconds instead of waiting for Ctrl+C
    #[arg(long)]
    duration: Option<f64>,
}

pub fn run(args: PlayArgs, config: &EngineConfig) -> anyhow::Result<()> {
    let library = library_for(args.track.as_deref())?;
    let shared = SharedContext::new(AudioContext::new(ContextOptions {
        sample_rate: config.audio.sample_rate as f32,
        max_nodes: config.engine.max_nodes,
    }));

    let stream_config = BackendStreamConfig {
        sample_rate: config.audio.sample_rate,
        buffer_size: config.audio.buffer_size,
        channels: config.audio.channels,
        device_name: config.audio.output_device.clone(),
    };
    let backend = CpalBackend::new();
    let stream = start_output(&backend, &stream_config, shared.clone())
        .context("opening audio output")?;

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("installing Ctrl+C handler")?;

    let mut engine = SoundEngine::new(shared, config).with_library(library);
    engine.update(&music_on());
    match engine.current_track() {
        Some(track) => println!("Playing {track} (Ctrl+C to stop)"),
        None => anyhow::bail!("background music failed to start"),
    }

    let deadline = args
        .duration
        .filter(|d| d.is_finite() && *d > 0.0)
        .map(|d| Instant::now() + Duration::from_secs_f64(d));
    let interval = config.engine.tick_interval();

    while running.load(Ordering::SeqCst) {
        if deadline.is_some_and(|at| Instant::now() >= at) {
            break;
        }
        std::thread::sleep(interval);
        engine.tick();
    }

    engine.stop_background_music();
    // Let the release ramps reach the device before the stream closes.
    std::thread::sleep(Duration::from_millis(250));
    drop(stream);
    println!("Stopped");
    Ok(())
}
