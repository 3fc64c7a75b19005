//! Tone primitive builder.
//!
//! A [`Tone`] describes one oscillator with optional detune, low-pass filter,
//! pitch sweep and gain envelope. [`Tone::play`] wires the chain into a
//! context and starts it, so nothing it returns is ever silent by accident:
//!
//! ```text
//! Oscillator ──► [LowPass] ──► Gain (envelope) ──► destination
//! ```
//!
//! Sustained tones keep their oscillator retained for the caller to stop.
//! Enveloped tones schedule their own stop and release every node, so the
//! context collects them once they finish.

use keytone_core::{AudioContext, Destination, NodeId, ParamKind, Waveform};

use crate::error::Result;

/// Level reached at the end of exponential decays. Exponential ramps cannot
/// reach zero.
pub const DECAY_FLOOR: f32 = 0.01;

/// Time an enveloped oscillator keeps running after its release completes.
pub const STOP_MARGIN: f64 = 0.1;

/// Gain envelope applied to a tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Envelope {
    /// Constant level, running until the caller stops it.
    Sustain {
        /// Gain level.
        level: f32,
    },
    /// Linear attack, hold, linear release to silence.
    Gate {
        /// Level reached after the attack.
        peak: f32,
        /// Attack time in seconds.
        attack: f64,
        /// Total note length in seconds, release included.
        duration: f64,
        /// Release time in seconds.
        release: f64,
    },
    /// Linear attack, then exponential decay to [`DECAY_FLOOR`].
    Pluck {
        /// Level reached after the attack.
        peak: f32,
        /// Attack time in seconds.
        attack: f64,
        /// Time from note start to the end of the decay.
        length: f64,
    },
    /// Immediate peak, exponential decay to [`DECAY_FLOOR`], stop at the end.
    Decay {
        /// Starting level.
        peak: f32,
        /// Decay time in seconds.
        length: f64,
    },
}

impl Envelope {
    /// Time from note start until the envelope settles, or `None` if sustained.
    pub fn length(&self) -> Option<f64> {
        match *self {
            Envelope::Sustain { .. } => None,
            Envelope::Gate { duration, .. } => Some(duration),
            Envelope::Pluck { length, .. } | Envelope::Decay { length, .. } => Some(length),
        }
    }

    /// Time from note start until the oscillator stops, or `None` if sustained.
    pub fn stop_after(&self) -> Option<f64> {
        match *self {
            Envelope::Sustain { .. } => None,
            Envelope::Gate { duration, .. } => Some(duration + STOP_MARGIN),
            Envelope::Pluck { length, .. } => Some(length + STOP_MARGIN),
            Envelope::Decay { length, .. } => Some(length),
        }
    }

    fn apply(&self, ctx: &mut AudioContext, gain: NodeId, at: f64) -> Result<()> {
        match *self {
            Envelope::Sustain { level } => {
                ctx.set_param(gain, ParamKind::Gain, level)?;
            }
            Envelope::Gate {
                peak,
                attack,
                duration,
                release,
            } => {
                ctx.set_param(gain, ParamKind::Gain, 0.0)?;
                ctx.set_value_at_time(gain, ParamKind::Gain, 0.0, at)?;
                ctx.linear_ramp_to_value_at_time(gain, ParamKind::Gain, peak, at + attack)?;
                ctx.set_value_at_time(gain, ParamKind::Gain, peak, at + duration - release)?;
                ctx.linear_ramp_to_value_at_time(gain, ParamKind::Gain, 0.0, at + duration)?;
            }
            Envelope::Pluck {
                peak,
                attack,
                length,
            } => {
                ctx.set_param(gain, ParamKind::Gain, 0.0)?;
                ctx.set_value_at_time(gain, ParamKind::Gain, 0.0, at)?;
                ctx.linear_ramp_to_value_at_time(gain, ParamKind::Gain, peak, at + attack)?;
                ctx.exponential_ramp_to_value_at_time(
                    gain,
                    ParamKind::Gain,
                    DECAY_FLOOR,
                    at + length,
                )?;
            }
            Envelope::Decay { peak, length } => {
                ctx.set_value_at_time(gain, ParamKind::Gain, peak, at)?;
                ctx.exponential_ramp_to_value_at_time(
                    gain,
                    ParamKind::Gain,
                    DECAY_FLOOR,
                    at + length,
                )?;
            }
        }
        Ok(())
    }
}

/// Nodes making up one played tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voice {
    /// Source oscillator.
    pub oscillator: NodeId,
    /// Envelope gain stage.
    pub gain: NodeId,
    /// Low-pass stage, when the tone has one.
    pub filter: Option<NodeId>,
}

impl Voice {
    /// Stop the oscillator at `at`.
    pub fn stop(&self, ctx: &mut AudioContext, at: f64) -> Result<()> {
        ctx.stop(self.oscillator, at)?;
        Ok(())
    }
}

/// Description of a single oscillator note.
///
/// ```rust
/// use keytone_core::{AudioContext, ContextOptions, Destination, Waveform};
/// use keytone_synth::{Envelope, Tone};
///
/// let mut ctx = AudioContext::new(ContextOptions::default());
/// ctx.resume();
///
/// Tone::new(Waveform::Triangle, 261.63)
///     .lowpass(1200.0, 1.0)
///     .envelope(Envelope::Gate { peak: 0.1, attack: 0.02, duration: 0.8, release: 0.05 })
///     .play(&mut ctx, Destination::Output, 0.0)
///     .unwrap();
///
/// assert_eq!(ctx.live_oscillators(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    waveform: Waveform,
    frequency: f32,
    detune: f32,
    filter: Option<(f32, f32)>,
    envelope: Envelope,
    sweep_to: Option<f32>,
}

impl Tone {
    /// A sustained tone at unity gain.
    pub fn new(waveform: Waveform, frequency: f32) -> Self {
        Self {
            waveform,
            frequency,
            detune: 0.0,
            filter: None,
            envelope: Envelope::Sustain { level: 1.0 },
            sweep_to: None,
        }
    }

    /// Detune in cents.
    pub fn detune(mut self, cents: f32) -> Self {
        self.detune = cents;
        self
    }

    /// Route through a low-pass filter.
    pub fn lowpass(mut self, cutoff: f32, q: f32) -> Self {
        self.filter = Some((cutoff, q));
        self
    }

    /// Gain envelope.
    pub fn envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = envelope;
        self
    }

    /// Sweep the pitch exponentially to `frequency` over the envelope length.
    /// Ignored for sustained tones.
    pub fn sweep_to(mut self, frequency: f32) -> Self {
        self.sweep_to = Some(frequency);
        self
    }

    /// Build the chain, connect it to `destination` and start it `offset`
    /// seconds from now.
    ///
    /// On failure every node created for this tone is removed again.
    pub fn play(&self, ctx: &mut AudioContext, destination: Destination, offset: f64) -> Result<Voice> {
        let mark = ctx.mark();
        let result = self.build(ctx, destination, offset);
        if result.is_err() {
            ctx.rollback(mark);
        }
        result
    }

    fn build(&self, ctx: &mut AudioContext, destination: Destination, offset: f64) -> Result<Voice> {
        let at = ctx.current_time() + offset;

        let oscillator = ctx.create_oscillator(self.waveform)?;
        ctx.set_param(oscillator, ParamKind::Frequency, self.frequency)?;
        ctx.set_param(oscillator, ParamKind::Detune, self.detune)?;

        let filter = match self.filter {
            Some((cutoff, q)) => {
                let filter = ctx.create_lowpass()?;
                ctx.set_param(filter, ParamKind::Frequency, cutoff)?;
                ctx.set_param(filter, ParamKind::Q, q)?;
                ctx.connect(oscillator, Destination::Node(filter))?;
                Some(filter)
            }
            None => None,
        };

        let gain = ctx.create_gain()?;
        ctx.connect(filter.unwrap_or(oscillator), Destination::Node(gain))?;
        ctx.connect(gain, destination)?;
        self.envelope.apply(ctx, gain, at)?;

        if let (Some(target), Some(length)) = (self.sweep_to, self.envelope.length()) {
            ctx.set_value_at_time(oscillator, ParamKind::Frequency, self.frequency, at)?;
            ctx.exponential_ramp_to_value_at_time(
                oscillator,
                ParamKind::Frequency,
                target,
                at + length,
            )?;
        }

        ctx.start(oscillator, at)?;
        if let Some(after) = self.envelope.stop_after() {
            ctx.stop(oscillator, at + after)?;
            ctx.release(oscillator)?;
        }
        if let Some(filter) = filter {
            ctx.release(filter)?;
        }
        ctx.release(gain)?;

        Ok(Voice {
            oscillator,
            gain,
            filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SynthError;
    use keytone_core::{ContextOptions, GraphError, NodeType};

    fn context() -> AudioContext {
        let mut ctx = AudioContext::new(ContextOptions {
            sample_rate: 8000.0,
            max_nodes: 64,
        });
        ctx.resume();
        ctx
    }

    fn advance(ctx: &mut AudioContext, seconds: f32) -> Vec<f32> {
        let mut buf = vec![0.0f32; (seconds * ctx.sample_rate()) as usize];
        for block in buf.chunks_mut(128) {
            ctx.render(block);
        }
        buf
    }

    #[test]
    fn sustained_tone_keeps_running() {
        let mut ctx = context();
        let voice = Tone::new(Waveform::Sine, 220.0)
            .lowpass(1000.0, 1.5)
            .envelope(Envelope::Sustain { level: 0.1 })
            .play(&mut ctx, Destination::Output, 0.0)
            .unwrap();

        assert_eq!(ctx.node_type(voice.filter.unwrap()), Some(NodeType::LowPass));
        advance(&mut ctx, 2.0);
        assert_eq!(ctx.live_oscillators(), 1);
        assert_eq!(ctx.node_count(), 3);

        let now = ctx.current_time();
        voice.stop(&mut ctx, now).unwrap();
        advance(&mut ctx, 0.05);
        assert_eq!(ctx.node_count(), 0);
    }

    #[test]
    fn enveloped_tone_cleans_up() {
        let mut ctx = context();
        Tone::new(Waveform::Triangle, 261.63)
            .lowpass(1200.0, 1.0)
            .envelope(Envelope::Gate {
                peak: 0.1,
                attack: 0.02,
                duration: 0.8,
                release: 0.05,
            })
            .play(&mut ctx, Destination::Output, 0.5)
            .unwrap();

        assert_eq!(ctx.live_oscillators(), 1);
        let out = advance(&mut ctx, 0.4);
        assert!(out.iter().all(|&s| s == 0.0), "sounded before its offset");

        advance(&mut ctx, 1.1);
        assert_eq!(ctx.live_oscillators(), 0);
        assert_eq!(ctx.node_count(), 0);
    }

    #[test]
    fn decay_stops_at_end_of_envelope() {
        let env = Envelope::Decay {
            peak: 0.1,
            length: 0.1,
        };
        assert_eq!(env.stop_after(), Some(0.1));
        let pluck = Envelope::Pluck {
            peak: 0.2,
            attack: 0.02,
            length: 1.5,
        };
        assert_eq!(pluck.stop_after(), Some(1.6));
        assert_eq!(Envelope::Sustain { level: 1.0 }.stop_after(), None);
    }

    #[test]
    fn sweep_reaches_target() {
        let mut ctx = context();
        let voice = Tone::new(Waveform::Sine, 800.0)
            .sweep_to(1000.0)
            .envelope(Envelope::Decay {
                peak: 0.1,
                length: 0.1,
            })
            .play(&mut ctx, Destination::Output, 0.0)
            .unwrap();

        let freq = ctx.param(voice.oscillator, ParamKind::Frequency).unwrap();
        assert!((freq.value_at(0.1) - 1000.0).abs() < 1e-3);
        assert!((freq.value_at(0.0) - 800.0).abs() < 1e-3);
    }

    #[test]
    fn failed_build_leaves_nothing_behind() {
        let mut ctx = AudioContext::new(ContextOptions {
            sample_rate: 8000.0,
            max_nodes: 2,
        });
        let err = Tone::new(Waveform::Sine, 440.0)
            .lowpass(800.0, 1.0)
            .play(&mut ctx, Destination::Output, 0.0)
            .unwrap_err();
        assert_eq!(err, SynthError::Graph(GraphError::NodeLimit(2)));
        assert_eq!(ctx.node_count(), 0);
    }
}
