//! Piano Meditation: A-minor arpeggio up and back down, looped.

use keytone_core::{AudioContext, Destination, NodeId, Waveform};

use super::{TrackBody, TrackHandle, TrackKind, master_gain};
use crate::error::Result;
use crate::scheduler::Scheduler;
use crate::tone::{Envelope, Tone};

const MASTER: f32 = 0.2;
const LOOP_SECONDS: f64 = 4.0;
const NOTE_SPACING: f64 = 0.5;

const NOTE: Envelope = Envelope::Pluck {
    peak: 0.2,
    attack: 0.02,
    length: 1.5,
};

/// A3, C4, E4, A4, C5, E5, A4, E4.
const ARPEGGIO: [f32; 8] = [220.0, 261.63, 329.63, 440.0, 523.25, 659.26, 440.0, 329.63];

fn schedule_bar(ctx: &mut AudioContext, master: NodeId) -> Result<()> {
    for (i, &freq) in ARPEGGIO.iter().enumerate() {
        Tone::new(Waveform::Sine, freq).envelope(NOTE).play(
            ctx,
            Destination::Node(master),
            i as f64 * NOTE_SPACING,
        )?;
    }
    Ok(())
}

pub(super) fn create(ctx: &mut AudioContext, scheduler: &mut Scheduler) -> Result<TrackHandle> {
    let master = master_gain(ctx, MASTER)?;
    schedule_bar(ctx, master)?;

    let next = ctx.current_time() + LOOP_SECONDS;
    let loop_token = scheduler.repeat(
        "piano",
        next,
        LOOP_SECONDS,
        Box::new(move |ctx| schedule_bar(ctx, master)),
    );

    Ok(TrackHandle::new(
        TrackKind::Piano,
        master,
        TrackBody::Sequence { loop_token },
    ))
}
