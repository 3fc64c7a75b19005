//! Ambient Atmosphere: sustained Fm9 pad under a slow filter sweep.

use keytone_core::{AudioContext, Destination, ParamKind, Waveform};

use super::{Modulator, TrackBody, TrackHandle, TrackKind, master_gain};
use crate::error::Result;
use crate::tone::{Envelope, Tone};

const MASTER: f32 = 0.15;
const VOICE_GAIN: f32 = 0.1;
const CUTOFF: f32 = 1000.0;
const Q: f32 = 1.5;
const LFO_RATE: f32 = 0.05;
const LFO_DEPTH: f32 = 100.0;

/// (frequency Hz, detune cents): F3, F4, Ab4, C5, D5.
const PADS: [(f32, f32); 5] = [
    (174.61, 0.0),
    (349.23, 5.0),
    (415.30, -5.0),
    (523.25, 0.0),
    (587.33, 4.0),
];

pub(super) fn create(ctx: &mut AudioContext) -> Result<TrackHandle> {
    let master = master_gain(ctx, MASTER)?;

    let voices = PADS
        .iter()
        .map(|&(freq, cents)| {
            Tone::new(Waveform::Sine, freq)
                .detune(cents)
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
    let lfo = Modulator::start(ctx, Waveform::Sine, LFO_RATE, LFO_DEPTH, &targets)?;

    Ok(TrackHandle::new(
        TrackKind::Ambient,
        master,
        TrackBody::Pads { voices, lfo },
    ))
}
