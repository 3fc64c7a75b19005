//! Generative background tracks.
//!
//! Five structurally different tracks share one shape: a master gain on the
//! context output, a body of voices feeding it, and a [`TrackHandle`] that
//! knows how to stop exactly what it built.
//!
//! | Track | Body | Stop |
//! |-------|------|------|
//! | Ambient Atmosphere | 5 filtered sine pads + filter LFO | stop pads and LFO |
//! | Lofi Beats | 4-chord loop, re-scheduled every 4 s | cancel loop |
//! | Piano Meditation | 8-note arpeggio, re-scheduled every 4 s | cancel loop |
//! | Deep Meditation | 4 filtered drones + filter LFO | stop drones and LFO |
//! | Calm Vibes | 5 sine/triangle voice pairs | stop every oscillator |

mod ambient;
mod calm;
mod library;
mod lofi;
mod meditation;
mod piano;

use core::str::FromStr;

use keytone_core::{AudioContext, Destination, NodeId, ParamKind, Waveform};

use crate::error::{Result, SynthError};
use crate::scheduler::{CancelToken, Scheduler};
use crate::tone::Voice;

pub use calm::PairedVoice;
pub use library::{TrackFactory, TrackLibrary};

/// One of the built-in tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    /// Sustained 9th-chord pad with slow filter movement.
    Ambient,
    /// Looping four-chord progression.
    Lofi,
    /// Looping piano-like arpeggio.
    Piano,
    /// Drone in fifths with a very slow filter sweep.
    Meditation,
    /// Mellow dual-oscillator pad.
    Calm,
}

impl TrackKind {
    /// Every track, in library order.
    pub const ALL: [TrackKind; 5] = [
        TrackKind::Ambient,
        TrackKind::Lofi,
        TrackKind::Piano,
        TrackKind::Meditation,
        TrackKind::Calm,
    ];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            TrackKind::Ambient => "Ambient Atmosphere",
            TrackKind::Lofi => "Lofi Beats",
            TrackKind::Piano => "Piano Meditation",
            TrackKind::Meditation => "Deep Meditation",
            TrackKind::Calm => "Calm Vibes",
        }
    }

    /// Short identifier used on the command line.
    pub fn slug(self) -> &'static str {
        match self {
            TrackKind::Ambient => "ambient",
            TrackKind::Lofi => "lofi",
            TrackKind::Piano => "piano",
            TrackKind::Meditation => "meditation",
            TrackKind::Calm => "calm",
        }
    }

    /// Build the track on `ctx`, already sounding.
    ///
    /// Looping tracks register their loop with `scheduler`.
    pub fn create(self, ctx: &mut AudioContext, scheduler: &mut Scheduler) -> Result<TrackHandle> {
        let handle = match self {
            TrackKind::Ambient => ambient::create(ctx)?,
            TrackKind::Lofi => lofi::create(ctx, scheduler)?,
            TrackKind::Piano => piano::create(ctx, scheduler)?,
            TrackKind::Meditation => meditation::create(ctx)?,
            TrackKind::Calm => calm::create(ctx)?,
        };
        tracing::debug!(track = self.name(), nodes = ctx.node_count(), "track built");
        Ok(handle)
    }
}

impl core::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TrackKind {
    type Err = SynthError;

    /// Accepts the slug or the display name, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        TrackKind::ALL
            .into_iter()
            .find(|k| k.slug().eq_ignore_ascii_case(wanted) || k.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SynthError::UnknownTrack(s.to_string()))
    }
}

/// Slow oscillator driving a parameter through a depth gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modulator {
    /// The LFO itself, retained until stopped.
    pub oscillator: NodeId,
    /// Depth stage between the LFO and its targets.
    pub depth: NodeId,
}

impl Modulator {
    /// Start an LFO at `rate` Hz, scaled by `depth`, feeding every target.
    pub fn start(
        ctx: &mut AudioContext,
        waveform: Waveform,
        rate: f32,
        depth: f32,
        targets: &[Destination],
    ) -> Result<Self> {
        let oscillator = ctx.create_oscillator(waveform)?;
        ctx.set_param(oscillator, ParamKind::Frequency, rate)?;
        let depth_gain = ctx.create_gain()?;
        ctx.set_param(depth_gain, ParamKind::Gain, depth)?;
        ctx.connect(oscillator, Destination::Node(depth_gain))?;
        for &target in targets {
            ctx.connect(depth_gain, target)?;
        }
        let now = ctx.current_time();
        ctx.start(oscillator, now)?;
        ctx.release(depth_gain)?;
        Ok(Self {
            oscillator,
            depth: depth_gain,
        })
    }

    /// Stop the LFO at `at`.
    pub fn stop(&self, ctx: &mut AudioContext, at: f64) -> Result<()> {
        ctx.stop(self.oscillator, at)?;
        Ok(())
    }
}

/// The voices a track owns, shaped by how the track must be stopped.
#[derive(Debug)]
pub enum TrackBody {
    /// Sustained pads with a shared filter LFO.
    Pads {
        /// One voice per chord tone.
        voices: Vec<Voice>,
        /// Modulates every pad's cutoff.
        lfo: Modulator,
    },
    /// Self-rescheduling note sequence; in-flight notes stop on their own.
    Sequence {
        /// Cancels the loop.
        loop_token: CancelToken,
    },
    /// Sustained drones with a shared filter LFO.
    Drones {
        /// One voice per drone tone.
        voices: Vec<Voice>,
        /// Modulates every drone's cutoff.
        lfo: Modulator,
    },
    /// Two-oscillator voices.
    PairedPads {
        /// One pair per chord tone.
        voices: Vec<PairedVoice>,
    },
}

/// A sounding track and everything needed to silence it.
#[derive(Debug)]
pub struct TrackHandle {
    kind: TrackKind,
    master: NodeId,
    body: TrackBody,
}

impl TrackHandle {
    pub(crate) fn new(kind: TrackKind, master: NodeId, body: TrackBody) -> Self {
        Self { kind, master, body }
    }

    /// Which track this is.
    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Master gain node.
    pub fn master(&self) -> NodeId {
        self.master
    }

    /// The voices this handle owns.
    pub fn body(&self) -> &TrackBody {
        &self.body
    }

    /// Stop everything this track owns and release its master gain.
    ///
    /// Every stop is attempted even if an earlier one fails; the first
    /// failure is returned.
    pub fn stop(self, ctx: &mut AudioContext) -> Result<()> {
        let now = ctx.current_time();
        let mut first_err = None;
        let mut note = |result: Result<()>| {
            if let Err(err) = result {
                first_err.get_or_insert(err);
            }
        };

        match &self.body {
            TrackBody::Sequence { loop_token } => loop_token.cancel(),
            TrackBody::Pads { voices, lfo } | TrackBody::Drones { voices, lfo } => {
                for voice in voices {
                    note(voice.stop(ctx, now));
                }
                note(lfo.stop(ctx, now));
            }
            TrackBody::PairedPads { voices } => {
                for pair in voices {
                    note(pair.stop(ctx, now));
                }
            }
        }
        note(ctx.release(self.master).map_err(SynthError::from));

        tracing::debug!(track = self.name(), "track stopped");
        first_err.map_or(Ok(()), Err)
    }
}

/// Create a master gain at `level` feeding the context output.
pub(crate) fn master_gain(ctx: &mut AudioContext, level: f32) -> Result<NodeId> {
    let master = ctx.create_gain()?;
    ctx.set_param(master, ParamKind::Gain, level)?;
    ctx.connect(master, Destination::Output)?;
    Ok(master)
}
