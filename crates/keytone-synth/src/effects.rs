//! One-shot feedback sounds.
//!
//! Each effect builds a handful of enveloped tones straight into the context
//! output. Every tone schedules its own stop, so nothing here needs a handle.

use core::str::FromStr;

use keytone_core::{AudioContext, Destination, Waveform};

use crate::error::{Result, SynthError};
use crate::tone::{Envelope, Tone};

/// C major chord played as the completion fanfare: C5, E5, G5, C6.
const COMPLETE_CHORD: [f32; 4] = [523.0, 659.0, 784.0, 1047.0];
const COMPLETE_STAGGER: f64 = 0.1;

/// C major scale, C5 up to C6.
const LEVEL_UP_SCALE: [f32; 8] = [523.0, 587.0, 659.0, 698.0, 784.0, 880.0, 988.0, 1047.0];
const LEVEL_UP_STAGGER: f64 = 0.08;

/// A named feedback sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Short rising chirp.
    Correct,
    /// Louder falling buzz.
    Incorrect,
    /// Staggered major chord.
    Complete,
    /// Rapid ascending scale.
    LevelUp,
}

impl SoundEffect {
    /// Every effect.
    pub const ALL: [SoundEffect; 4] = [
        SoundEffect::Correct,
        SoundEffect::Incorrect,
        SoundEffect::Complete,
        SoundEffect::LevelUp,
    ];

    /// Event name as it appears in snapshots.
    pub fn name(self) -> &'static str {
        match self {
            SoundEffect::Correct => "correct",
            SoundEffect::Incorrect => "incorrect",
            SoundEffect::Complete => "complete",
            SoundEffect::LevelUp => "levelup",
        }
    }

    /// Resume the context and play the effect now.
    pub fn play(self, ctx: &mut AudioContext) -> Result<()> {
        ctx.resume();
        match self {
            SoundEffect::Correct => {
                Tone::new(Waveform::Sine, 800.0)
                    .sweep_to(1000.0)
                    .envelope(Envelope::Decay {
                        peak: 0.1,
                        length: 0.1,
                    })
                    .play(ctx, Destination::Output, 0.0)?;
            }
            SoundEffect::Incorrect => {
                Tone::new(Waveform::Sine, 300.0)
                    .sweep_to(200.0)
                    .envelope(Envelope::Decay {
                        peak: 0.15,
                        length: 0.2,
                    })
                    .play(ctx, Destination::Output, 0.0)?;
            }
            SoundEffect::Complete => {
                for (i, &freq) in COMPLETE_CHORD.iter().enumerate() {
                    Tone::new(Waveform::Sine, freq)
                        .envelope(Envelope::Decay {
                            peak: 0.1,
                            length: 0.3,
                        })
                        .play(ctx, Destination::Output, i as f64 * COMPLETE_STAGGER)?;
                }
            }
            SoundEffect::LevelUp => {
                for (i, &freq) in LEVEL_UP_SCALE.iter().enumerate() {
                    Tone::new(Waveform::Sine, freq)
                        .envelope(Envelope::Decay {
                            peak: 0.08,
                            length: 0.15,
                        })
                        .play(ctx, Destination::Output, i as f64 * LEVEL_UP_STAGGER)?;
                }
            }
        }
        tracing::debug!(effect = self.name(), "effect played");
        Ok(())
    }
}

impl FromStr for SoundEffect {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self> {
        SoundEffect::ALL
            .into_iter()
            .find(|e| e.name() == s)
            .ok_or_else(|| SynthError::UnknownEffect(s.to_string()))
    }
}

impl core::fmt::Display for SoundEffect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Resume the context and play the keystroke click.
pub fn play_keystroke(ctx: &mut AudioContext) -> Result<()> {
    ctx.resume();
    Tone::new(Waveform::Sine, 1200.0)
        .sweep_to(1400.0)
        .envelope(Envelope::Decay {
            peak: 0.03,
            length: 0.05,
        })
        .play(ctx, Destination::Output, 0.0)?;
    Ok(())
}
