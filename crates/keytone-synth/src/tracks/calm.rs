//! Calm Vibes: G9 pad of sine voices doubled an octave up by a triangle.

use keytone_core::{AudioContext, Destination, NodeId, ParamKind, Waveform};

use super::{TrackBody, TrackHandle, TrackKind, master_gain};
use crate::error::Result;
use crate::tone::{Tone, Voice};

const MASTER: f32 = 0.15;
const VOICE_GAIN: f32 = 0.08;
const CUTOFF: f32 = 1000.0;
const Q: f32 = 0.8;
/// The octave-up triangle sits slightly flat of the sine.
const SHIMMER_DETUNE: f32 = -5.0;

/// (frequency Hz, detune cents): G3, B3, D4, F#4, A4.
const VOICES: [(f32, f32); 5] = [
    (196.00, 0.0),
    (246.94, 4.0),
    (293.66, -4.0),
    (370.00, 0.0),
    (440.00, 3.0),
];

/// Sine and octave triangle sharing one filter and gain stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairedVoice {
    /// Sine at the voice pitch.
    pub primary: Voice,
    /// Triangle an octave up.
    pub shimmer: Voice,
    /// Shared low-pass stage.
    pub filter: NodeId,
    /// Shared voice gain.
    pub gain: NodeId,
}

impl PairedVoice {
    /// Stop both oscillators at `at`, attempting the second even if the first
    /// fails.
    pub fn stop(&self, ctx: &mut AudioContext, at: f64) -> Result<()> {
        let primary = self.primary.stop(ctx, at);
        let shimmer = self.shimmer.stop(ctx, at);
        primary.and(shimmer)
    }
}

fn paired_voice(ctx: &mut AudioContext, master: NodeId, freq: f32, cents: f32) -> Result<PairedVoice> {
    let filter = ctx.create_lowpass()?;
    ctx.set_param(filter, ParamKind::Frequency, CUTOFF)?;
    ctx.set_param(filter, ParamKind::Q, Q)?;
    let gain = ctx.create_gain()?;
    ctx.set_param(gain, ParamKind::Gain, VOICE_GAIN)?;
    ctx.connect(filter, Destination::Node(gain))?;
    ctx.connect(gain, Destination::Node(master))?;

    let primary = Tone::new(Waveform::Sine, freq)
        .detune(cents)
        .play(ctx, Destination::Node(filter), 0.0)?;
    let shimmer = Tone::new(Waveform::Triangle, freq * 2.0)
        .detune(cents + SHIMMER_DETUNE)
        .play(ctx, Destination::Node(filter), 0.0)?;

    ctx.release(filter)?;
    ctx.release(gain)?;

    Ok(PairedVoice {
        primary,
        shimmer,
        filter,
        gain,
    })
}

pub(super) fn create(ctx: &mut AudioContext) -> Result<TrackHandle> {
    let master = master_gain(ctx, MASTER)?;

    let voices = VOICES
        .iter()
        .map(|&(freq, cents)| paired_voice(ctx, master, freq, cents))
        .collect::<Result<Vec<_>>>()?;

    Ok(TrackHandle::new(
        TrackKind::Calm,
        master,
        TrackBody::PairedPads { voices },
    ))
}
