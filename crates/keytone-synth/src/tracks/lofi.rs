//! Lofi Beats: Cmaj7, Am7, Fmaj7, G7, one chord per second, looped.

use keytone_core::{AudioContext, Destination, NodeId, Waveform};

use super::{TrackBody, TrackHandle, TrackKind, master_gain};
use crate::error::Result;
use crate::scheduler::Scheduler;
use crate::tone::{Envelope, Tone};

const MASTER: f32 = 0.25;
const CUTOFF: f32 = 1200.0;
const Q: f32 = 1.0;
const LOOP_SECONDS: f64 = 4.0;
const CHORD_SPACING: f64 = 1.0;

const NOTE: Envelope = Envelope::Gate {
    peak: 0.1,
    attack: 0.02,
    duration: 0.8,
    release: 0.05,
};

const PROGRESSION: [[f32; 4]; 4] = [
    [261.63, 329.63, 392.00, 493.88],
    [220.00, 261.63, 329.63, 392.00],
    [174.61, 220.00, 261.63, 349.23],
    [196.00, 246.94, 293.66, 349.23],
];

fn schedule_bar(ctx: &mut AudioContext, master: NodeId) -> Result<()> {
    for (i, chord) in PROGRESSION.iter().enumerate() {
        let offset = i as f64 * CHORD_SPACING;
        for &freq in chord {
            Tone::new(Waveform::Triangle, freq)
                .lowpass(CUTOFF, Q)
                .envelope(NOTE)
                .play(ctx, Destination::Node(master), offset)?;
        }
    }
    Ok(())
}

pub(super) fn create(ctx: &mut AudioContext, scheduler: &mut Scheduler) -> Result<TrackHandle> {
    let master = master_gain(ctx, MASTER)?;
    schedule_bar(ctx, master)?;

    let next = ctx.current_time() + LOOP_SECONDS;
    let loop_token = scheduler.repeat(
        "lofi",
        next,
        LOOP_SECONDS,
        Box::new(move |ctx| schedule_bar(ctx, master)),
    );

    Ok(TrackHandle::new(
        TrackKind::Lofi,
        master,
        TrackBody::Sequence { loop_token },
    ))
}
