//! Deep Meditation: drones in fifths with a very slow triangle filter sweep.

use keytone_core::{AudioContext, Destination, ParamKind, Waveform};

use super::{Modulator, TrackBody, TrackHandle, TrackKind, master_gain};
use crate::error::Result;
use crate::tone::{Envelope, Tone};

const MASTER: f32 = 0.15;
const VOICE_GAIN: f32 = 0.1;
const CUTOFF: f32 = 800.0;
const Q: f32 = 1.0;
const LFO_RATE: f32 = 0.03;
const LFO_DEPTH: f32 = 100.0;

/// A2, E3, A3, D4.
const DRONES: [f32; 4] = [110.0, 164.81, 220.0, 293.66];

pub(super) fn create(ctx: &mut AudioContext) -> Result<TrackHandle> {
    let master = master_gain(ctx, MASTER)?;

    let voices = DRONES
        .iter()
        .map(|&freq| {
            Tone::new(Waveform::Sine, freq)
                .lowpass(CUTOFF, Q)
                .envelope(Envelope::Sustain { level: VOICE_GAIN })
                .play(ctx, Destination::Node(master), 0.0)
        })
        .collect::<Result<Vec<_>>>()?;

    let targets: Vec<Destination> = voices
        .iter()
        .filter_map(|v| v.filter)
        .map(|filter| Destination::Param(filter, ParamKind::Frequency))
        .collect();
    let lfo = Modulator::start(ctx, Waveform::Triangle, LFO_RATE, LFO_DEPTH, &targets)?;

    Ok(TrackHandle::new(
        TrackKind::Meditation,
        master,
        TrackBody::Drones { voices, lfo },
    ))
}
