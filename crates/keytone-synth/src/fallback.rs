//! Fallback ambience, used only when a track fails to build.
//!
//! A Cmaj7 chord of plain sines into a master gain whose level is gently
//! swayed by one LFO.

use keytone_core::{AudioContext, Destination, NodeId, ParamKind, Waveform};

use crate::error::{Result, SynthError};
use crate::tone::{Envelope, Tone, Voice};
use crate::tracks::{Modulator, master_gain};

const MASTER: f32 = 0.15;
const LFO_RATE: f32 = 0.07;
const LFO_DEPTH: f32 = 0.1;

/// (frequency Hz, voice gain): C4, E4, G4, B4.
const CHORD: [(f32, f32); 4] = [
    (261.63, 0.08),
    (329.63, 0.06),
    (392.00, 0.04),
    (493.88, 0.03),
];

/// A sounding fallback chord.
#[derive(Debug)]
pub struct FallbackHandle {
    master: NodeId,
    chord: Vec<Voice>,
    lfo: Modulator,
}

impl FallbackHandle {
    /// Display name used in logs.
    pub const NAME: &'static str = "Fallback Ambience";

    /// Build and start the fallback chord.
    pub fn create(ctx: &mut AudioContext) -> Result<Self> {
        let master = master_gain(ctx, MASTER)?;

        let chord = CHORD
            .iter()
            .map(|&(freq, level)| {
                Tone::new(Waveform::Sine, freq)
                    .envelope(Envelope::Sustain { level })
                    .play(ctx, Destination::Node(master), 0.0)
            })
            .collect::<Result<Vec<_>>>()?;

        let lfo = Modulator::start(
            ctx,
            Waveform::Sine,
            LFO_RATE,
            LFO_DEPTH,
            &[Destination::Param(master, ParamKind::Gain)],
        )?;

        tracing::debug!(nodes = ctx.node_count(), "fallback built");
        Ok(Self { master, chord, lfo })
    }

    /// Master gain node.
    pub fn master(&self) -> NodeId {
        self.master
    }

    /// Stop the chord and LFO and release the master gain.
    ///
    /// Every stop is attempted; the first failure is returned.
    pub fn stop(self, ctx: &mut AudioContext) -> Result<()> {
        let now = ctx.current_time();
        let mut results = Vec::with_capacity(self.chord.len() + 2);
        for voice in &self.chord {
            results.push(voice.stop(ctx, now));
        }
        results.push(self.lfo.stop(ctx, now));
        results.push(ctx.release(self.master).map_err(SynthError::from));
        results.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keytone_core::ContextOptions;

    #[test]
    fn fallback_plays_and_tears_down() {
        let mut ctx = AudioContext::new(ContextOptions::default());
        ctx.resume();
        let handle = FallbackHandle::create(&mut ctx).unwrap();
        assert_eq!(ctx.live_oscillators(), 5);

        let mut block = vec![0.0f32; 4800];
        ctx.render(&mut block);
        assert!(block.iter().any(|&s| s != 0.0));

        handle.stop(&mut ctx).unwrap();
        assert_eq!(ctx.live_oscillators(), 0);
        ctx.render(&mut block);
        assert_eq!(ctx.node_count(), 0);
    }
}
