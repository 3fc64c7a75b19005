//! Node identifiers, connection targets and per-node processing state.

use libm::powf;

use crate::biquad::{Biquad, lowpass_coefficients};
use crate::oscillator::{Oscillator, Waveform};
use crate::param::{AudioParam, ParamKind};

/// Unique identifier for a node in an [`AudioContext`](super::AudioContext).
///
/// Ids are handed out sequentially and never reused, so an id held after its
/// node was collected reliably yields [`GraphError::NodeNotFound`](crate::GraphError::NodeNotFound).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw sequence number of this id.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a node's output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// The context's output bus.
    Output,
    /// Another node's audio input.
    Node(NodeId),
    /// Audio-rate modulation of another node's parameter, summed onto its
    /// automated value.
    Param(NodeId, ParamKind),
}

impl Destination {
    /// The node this destination points at, if any.
    pub fn node(self) -> Option<NodeId> {
        match self {
            Destination::Output => None,
            Destination::Node(id) | Destination::Param(id, _) => Some(id),
        }
    }
}

/// Public classification of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Waveform generator with start/stop scheduling.
    Oscillator,
    /// Multiplies its summed input by the `gain` parameter.
    Gain,
    /// Second-order low-pass filter.
    LowPass,
}

/// Lowest cutoff the filter will be driven to, in Hz.
const MIN_CUTOFF: f32 = 10.0;

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Oscillator {
        osc: Oscillator,
        start: Option<f64>,
        stop: Option<f64>,
    },
    Gain,
    LowPass {
        filter: Biquad,
        /// Cutoff and Q the current coefficients were computed for.
        tuned: (f32, f32),
    },
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) params: [Option<AudioParam>; ParamKind::COUNT],
    pub(crate) outputs: Vec<Destination>,
    /// Cleared by `release`; unretained nodes are eligible for collection.
    pub(crate) retained: bool,
}

impl NodeData {
    pub(crate) fn oscillator(sample_rate: f32, waveform: Waveform) -> Self {
        let mut params: [Option<AudioParam>; ParamKind::COUNT] = Default::default();
        params[ParamKind::Frequency.slot()] = Some(AudioParam::new(440.0));
        params[ParamKind::Detune.slot()] = Some(AudioParam::new(0.0));
        Self {
            kind: NodeKind::Oscillator {
                osc: Oscillator::new(sample_rate, waveform),
                start: None,
                stop: None,
            },
            params,
            outputs: Vec::new(),
            retained: true,
        }
    }

    pub(crate) fn gain() -> Self {
        let mut params: [Option<AudioParam>; ParamKind::COUNT] = Default::default();
        params[ParamKind::Gain.slot()] = Some(AudioParam::new(1.0));
        Self {
            kind: NodeKind::Gain,
            params,
            outputs: Vec::new(),
            retained: true,
        }
    }

    pub(crate) fn lowpass() -> Self {
        let mut params: [Option<AudioParam>; ParamKind::COUNT] = Default::default();
        params[ParamKind::Frequency.slot()] = Some(AudioParam::new(350.0));
        params[ParamKind::Q.slot()] = Some(AudioParam::new(1.0));
        Self {
            kind: NodeKind::LowPass {
                filter: Biquad::new(),
                tuned: (f32::NAN, f32::NAN),
            },
            params,
            outputs: Vec::new(),
            retained: true,
        }
    }

    pub(crate) fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Oscillator { .. } => NodeType::Oscillator,
            NodeKind::Gain => NodeType::Gain,
            NodeKind::LowPass { .. } => NodeType::LowPass,
        }
    }

    pub(crate) fn accepts_input(&self) -> bool {
        !matches!(self.kind, NodeKind::Oscillator { .. })
    }

    pub(crate) fn param(&self, kind: ParamKind) -> Option<&AudioParam> {
        self.params[kind.slot()].as_ref()
    }

    pub(crate) fn param_mut(&mut self, kind: ParamKind) -> Option<&mut AudioParam> {
        self.params[kind.slot()].as_mut()
    }

    /// Started oscillator whose stop time has passed.
    pub(crate) fn has_ended(&self, now: f64) -> bool {
        match self.kind {
            NodeKind::Oscillator { stop, .. } => stop.is_some_and(|s| now >= s),
            _ => false,
        }
    }

    /// Started (possibly in the future) and not yet past its stop time.
    pub(crate) fn is_live_oscillator(&self, now: f64) -> bool {
        match self.kind {
            NodeKind::Oscillator { start, .. } => start.is_some() && !self.has_ended(now),
            _ => false,
        }
    }

    pub(crate) fn was_started(&self) -> bool {
        matches!(self.kind, NodeKind::Oscillator { start: Some(_), .. })
    }

    fn automated(&self, kind: ParamKind, t: f64, modulation: &[f32; ParamKind::COUNT]) -> f32 {
        self.param(kind).map_or(0.0, |p| p.value_at(t)) + modulation[kind.slot()]
    }

    /// Produce one output sample at time `t`.
    pub(crate) fn tick(
        &mut self,
        t: f64,
        input: f32,
        modulation: &[f32; ParamKind::COUNT],
        sample_rate: f32,
    ) -> f32 {
        match self.kind {
            NodeKind::Oscillator { start, stop, .. } => {
                let playing = start.is_some_and(|s| t >= s) && !stop.is_some_and(|s| t >= s);
                if !playing {
                    return 0.0;
                }
                let frequency = self.automated(ParamKind::Frequency, t, modulation);
                let detune = self.automated(ParamKind::Detune, t, modulation);
                let hz = frequency * cents_to_ratio(detune);
                if let NodeKind::Oscillator { osc, .. } = &mut self.kind {
                    osc.set_frequency(hz);
                    osc.advance()
                } else {
                    0.0
                }
            }
            NodeKind::Gain => input * self.automated(ParamKind::Gain, t, modulation),
            NodeKind::LowPass { .. } => {
                let nyquist = sample_rate * 0.5;
                let cutoff = self
                    .automated(ParamKind::Frequency, t, modulation)
                    .clamp(MIN_CUTOFF, nyquist * 0.99);
                let q = self.automated(ParamKind::Q, t, modulation).max(1e-4);
                if let NodeKind::LowPass { filter, tuned } = &mut self.kind {
                    if *tuned != (cutoff, q) {
                        let (b0, b1, b2, a0, a1, a2) = lowpass_coefficients(cutoff, q, sample_rate);
                        filter.set_coefficients(b0, b1, b2, a0, a1, a2);
                        *tuned = (cutoff, q);
                    }
                    filter.process(input)
                } else {
                    0.0
                }
            }
        }
    }
}

/// Frequency ratio for a detune in cents.
#[inline]
fn cents_to_ratio(cents: f32) -> f32 {
    powf(2.0, cents / 1200.0)
}
