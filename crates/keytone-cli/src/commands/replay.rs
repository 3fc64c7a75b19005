//! Replay of a recorded snapshot stream.
//!
//! The input is JSON lines, one `{"at": seconds, "snapshot": {...}}` object
//! per line, with snapshot fields in the page's camelCase. Audio between
//! events is rendered frame-exactly so decisions land where they were
//! recorded.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use keytone_config::EngineConfig;
use keytone_engine::{Snapshot, SoundEngine};
use keytone_io::write_wav;
use serde::Deserialize;

use super::common::{peak, wav_spec};

#[derive(Args)]
pub struct ReplayArgs {
    /// JSON-lines snapshot file
    #[arg(value_name = "SNAPSHOTS")]
    snapshots: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Seconds rendered after the last snapshot
    #[arg(long, default_value = "4.0")]
    tail: f64,
}

#[derive(Debug, Deserialize)]
struct ReplayEvent {
    at: f64,
    snapshot: Snapshot,
}

fn parse_events(text: &str) -> anyhow::Result<Vec<ReplayEvent>> {
    let mut events = Vec::new();
    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let event: ReplayEvent =
            serde_json::from_str(line).with_context(|| format!("line {}", number + 1))?;
        anyhow::ensure!(
            event.at.is_finite() && event.at >= 0.0,
            "line {}: `at` must be a non-negative number of seconds",
            number + 1
        );
        events.push(event);
    }
    events.sort_by(|a, b| a.at.total_cmp(&b.at));
    Ok(events)
}

pub fn run(args: ReplayArgs, config: &EngineConfig) -> anyhow::Result<()> {
    let text = fs::read_to_string(&args.snapshots)
        .with_context(|| format!("reading {}", args.snapshots.display()))?;
    let events = parse_events(&text).with_context(|| format!("parsing {}", args.snapshots.display()))?;

    let mut engine = SoundEngine::from_config(config);
    let sample_rate = f64::from(engine.sample_rate());
    let mut samples = Vec::new();

    for event in &events {
        let target = (event.at * sample_rate) as usize;
        if target > samples.len() {
            let frames = target - samples.len();
            samples.extend(engine.render_frames(frames));
        }
        let decisions = engine.update(&event.snapshot);
        tracing::info!(at = event.at, ?decisions, "snapshot applied");
    }

    samples.extend(engine.render_offline(args.tail.max(0.0)));
    engine.stop_background_music();

    write_wav(&args.output, &samples, wav_spec(config))?;
    println!(
        "Replayed {} snapshots into {:.2}s (peak {:.3}) at {}",
        events.len(),
        samples.len() as f64 / sample_rate,
        peak(&samples),
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keytone_engine::GameState;

    #[test]
    fn events_are_sorted_and_blank_lines_skipped() {
        let text = r#"{"at": 1.5, "snapshot": {"currentIndex": 2}}

{"at": 0.25, "snapshot": {"soundEnabled": true, "gameState": "playing"}}
"#;
        let events = parse_events(text).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].at, 0.25);
        assert_eq!(events[0].snapshot.game_state, GameState::Playing);
        assert_eq!(events[1].snapshot.current_index, 2);
    }

    #[test]
    fn bad_line_reports_its_number() {
        let text = "{\"at\": 0.0, \"snapshot\": {}}\nnot json\n";
        let err = parse_events(text).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn negative_time_is_rejected() {
        let err = parse_events(r#"{"at": -1.0, "snapshot": {}}"#).unwrap_err();
        assert!(err.to_string().contains("non-negative"));
    }
}
