//! [`AudioContext`]: node ownership, mutation API, rendering and collection.

use std::collections::BTreeMap;

use super::node::{Destination, NodeData, NodeId, NodeKind, NodeType};
use super::plan::RenderPlan;
use crate::error::{GraphError, Result};
use crate::oscillator::Waveform;
use crate::param::{AudioParam, ParamKind};

/// Construction options for an [`AudioContext`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextOptions {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Maximum number of nodes alive at once.
    pub max_nodes: usize,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            max_nodes: 4096,
        }
    }
}

/// Whether the context is producing sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextState {
    /// Rendering outputs silence and time stands still.
    #[default]
    Suspended,
    /// Rendering advances time and mixes every node reaching the output.
    Running,
}

/// Position in the node id sequence, used to discard a partially built graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphMark(pub(crate) u32);

/// Owner of every audio node and the clock they are scheduled against.
///
/// Nodes are created *retained*; the creator either keeps the id to stop or
/// reconfigure the node later, or calls [`release`](Self::release) to let the
/// context collect it once it falls silent. Collection runs after every
/// rendered block:
///
/// - oscillators past their stop time are removed,
/// - released oscillators that were never started are removed,
/// - released gain and filter nodes with no incoming connection are removed,
///
/// repeating until nothing else qualifies, so a stopped voice takes its
/// filter and gain stages with it.
///
/// # Example
///
/// ```rust
/// use keytone_core::{AudioContext, ContextOptions, Destination, ParamKind, Waveform};
///
/// let mut ctx = AudioContext::new(ContextOptions::default());
/// ctx.resume();
///
/// let osc = ctx.create_oscillator(Waveform::Sine).unwrap();
/// let gain = ctx.create_gain().unwrap();
/// ctx.set_param(osc, ParamKind::Frequency, 220.0).unwrap();
/// ctx.set_param(gain, ParamKind::Gain, 0.2).unwrap();
/// ctx.connect(osc, Destination::Node(gain)).unwrap();
/// ctx.connect(gain, Destination::Output).unwrap();
/// ctx.start(osc, 0.0).unwrap();
///
/// let mut block = [0.0f32; 256];
/// ctx.render(&mut block);
/// assert!(block.iter().any(|s| s.abs() > 0.0));
/// ```
#[derive(Debug)]
pub struct AudioContext {
    sample_rate: f32,
    max_nodes: usize,
    state: ContextState,
    frames: u64,
    next_id: u32,
    nodes: BTreeMap<NodeId, NodeData>,
    /// Cached evaluation order; `None` after any topology change.
    plan: Option<RenderPlan>,
    scratch: Vec<f32>,
    mono: Vec<f32>,
}

impl AudioContext {
    /// Create a suspended context.
    pub fn new(options: ContextOptions) -> Self {
        Self {
            sample_rate: options.sample_rate,
            max_nodes: options.max_nodes,
            state: ContextState::Suspended,
            frames: 0,
            next_id: 0,
            nodes: BTreeMap::new(),
            plan: None,
            scratch: Vec::new(),
            mono: Vec::new(),
        }
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Context clock in seconds: frames rendered while running.
    pub fn current_time(&self) -> f64 {
        self.frames as f64 / f64::from(self.sample_rate)
    }

    /// Current state.
    pub fn state(&self) -> ContextState {
        self.state
    }

    /// Start producing sound. Idempotent.
    pub fn resume(&mut self) {
        if self.state != ContextState::Running {
            #[cfg(feature = "tracing")]
            tracing::debug!(time = self.current_time(), "audio context resumed");
            self.state = ContextState::Running;
        }
    }

    /// Stop producing sound and freeze the clock. Idempotent.
    pub fn suspend(&mut self) {
        self.state = ContextState::Suspended;
    }

    /// Number of nodes currently alive.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Maximum number of nodes alive at once.
    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    /// Whether `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Type of the node behind `id`, if it is still alive.
    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.nodes.get(&id).map(NodeData::node_type)
    }

    /// Oscillators that have been started and have not reached their stop time.
    pub fn live_oscillators(&self) -> usize {
        let now = self.current_time();
        self.nodes
            .values()
            .filter(|n| n.is_live_oscillator(now))
            .count()
    }

    // --- Node creation ---

    /// Create an oscillator (440 Hz, no detune). It is silent until started.
    pub fn create_oscillator(&mut self, waveform: Waveform) -> Result<NodeId> {
        let node = NodeData::oscillator(self.sample_rate, waveform);
        self.insert(node)
    }

    /// Create a gain stage (unity gain).
    pub fn create_gain(&mut self) -> Result<NodeId> {
        self.insert(NodeData::gain())
    }

    /// Create a low-pass filter (350 Hz cutoff, Q 1).
    pub fn create_lowpass(&mut self) -> Result<NodeId> {
        self.insert(NodeData::lowpass())
    }

    fn insert(&mut self, node: NodeData) -> Result<NodeId> {
        if self.nodes.len() >= self.max_nodes {
            return Err(GraphError::NodeLimit(self.max_nodes));
        }
        let id = NodeId(self.next_id);
        self.next_id += 1;

        #[cfg(feature = "tracing")]
        tracing::debug!(node = %id, kind = ?node.node_type(), "node created");

        self.nodes.insert(id, node);
        self.plan = None;
        Ok(id)
    }

    // --- Connections ---

    /// Route `from`'s output to `to`.
    ///
    /// Connecting the same pair twice is a no-op. Connections that would close
    /// a cycle fail with [`GraphError::CycleDetected`].
    pub fn connect(&mut self, from: NodeId, to: Destination) -> Result<()> {
        self.node(from)?;
        match to {
            Destination::Output => {}
            Destination::Node(target) => {
                if !self.node(target)?.accepts_input() {
                    return Err(GraphError::NoInput(target));
                }
            }
            Destination::Param(target, kind) => {
                if self.node(target)?.param(kind).is_none() {
                    return Err(GraphError::NoSuchParam(target, kind));
                }
            }
        }

        if let Some(target) = to.node()
            && self.can_reach(target, from)
        {
            return Err(GraphError::CycleDetected);
        }

        let node = self.node_mut(from)?;
        if !node.outputs.contains(&to) {
            node.outputs.push(to);
            self.plan = None;
            #[cfg(feature = "tracing")]
            tracing::debug!(from = %from, to = ?to, "connected");
        }
        Ok(())
    }

    /// Whether `to` is reachable from `from` through existing connections.
    fn can_reach(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = Vec::new();
        let mut stack = vec![from];

        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if visited.contains(&current) {
                continue;
            }
            visited.push(current);

            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.outputs.iter().filter_map(|d| d.node()));
            }
        }
        false
    }

    // --- Parameters ---

    /// Parameter of a node, for inspection.
    pub fn param(&self, id: NodeId, kind: ParamKind) -> Result<&AudioParam> {
        self.node(id)?
            .param(kind)
            .ok_or(GraphError::NoSuchParam(id, kind))
    }

    fn param_mut(&mut self, id: NodeId, kind: ParamKind) -> Result<&mut AudioParam> {
        self.node_mut(id)?
            .param_mut(kind)
            .ok_or(GraphError::NoSuchParam(id, kind))
    }

    /// Automated value of a parameter at the current time, before modulation.
    pub fn param_value(&self, id: NodeId, kind: ParamKind) -> Result<f32> {
        let now = self.current_time();
        Ok(self.param(id, kind)?.value_at(now))
    }

    /// Set a parameter's intrinsic value.
    pub fn set_param(&mut self, id: NodeId, kind: ParamKind, value: f32) -> Result<()> {
        self.param_mut(id, kind)?.set_value(value);
        Ok(())
    }

    /// Schedule a jump to `value` at `time`.
    pub fn set_value_at_time(
        &mut self,
        id: NodeId,
        kind: ParamKind,
        value: f32,
        time: f64,
    ) -> Result<()> {
        self.param_mut(id, kind)?.set_value_at_time(value, time)
    }

    /// Schedule a linear ramp arriving at `value` at `time`.
    pub fn linear_ramp_to_value_at_time(
        &mut self,
        id: NodeId,
        kind: ParamKind,
        value: f32,
        time: f64,
    ) -> Result<()> {
        let now = self.current_time();
        self.param_mut(id, kind)?
            .linear_ramp_to_value_at_time(value, time, now)
    }

    /// Schedule an exponential ramp arriving at `value` at `time`.
    ///
    /// `value` must be strictly positive.
    pub fn exponential_ramp_to_value_at_time(
        &mut self,
        id: NodeId,
        kind: ParamKind,
        value: f32,
        time: f64,
    ) -> Result<()> {
        let now = self.current_time();
        self.param_mut(id, kind)?
            .exponential_ramp_to_value_at_time(value, time, now)
    }

    // --- Oscillator lifecycle ---

    /// Schedule an oscillator to start at `at` seconds. Only once per node.
    pub fn start(&mut self, id: NodeId, at: f64) -> Result<()> {
        if !at.is_finite() || at < 0.0 {
            return Err(GraphError::InvalidTime(at));
        }
        match &mut self.node_mut(id)?.kind {
            NodeKind::Oscillator { start: Some(_), .. } => Err(GraphError::AlreadyStarted(id)),
            NodeKind::Oscillator { start, .. } => {
                *start = Some(at);
                Ok(())
            }
            _ => Err(GraphError::NotAnOscillator(id)),
        }
    }

    /// Schedule a started oscillator to stop at `at` seconds.
    ///
    /// A later call may move the stop time earlier, never later.
    pub fn stop(&mut self, id: NodeId, at: f64) -> Result<()> {
        if !at.is_finite() || at < 0.0 {
            return Err(GraphError::InvalidTime(at));
        }
        match &mut self.node_mut(id)?.kind {
            NodeKind::Oscillator { start: None, .. } => Err(GraphError::NotStarted(id)),
            NodeKind::Oscillator { stop, .. } => {
                *stop = Some(stop.map_or(at, |s| s.min(at)));
                Ok(())
            }
            _ => Err(GraphError::NotAnOscillator(id)),
        }
    }

    /// Drop the creator's hold on `id` so it can be collected once silent.
    pub fn release(&mut self, id: NodeId) -> Result<()> {
        self.node_mut(id)?.retained = false;
        Ok(())
    }

    // --- Marks ---

    /// Record the current position in the id sequence.
    pub fn mark(&self) -> GraphMark {
        GraphMark(self.next_id)
    }

    /// Remove every node created since `mark`. Returns how many were removed.
    pub fn rollback(&mut self, mark: GraphMark) -> usize {
        let doomed: Vec<NodeId> = self
            .nodes
            .range(NodeId(mark.0)..)
            .map(|(&id, _)| id)
            .collect();
        self.remove_nodes(&doomed);

        #[cfg(feature = "tracing")]
        if !doomed.is_empty() {
            tracing::debug!(removed = doomed.len(), "graph rolled back");
        }

        doomed.len()
    }

    // --- Rendering ---

    /// Render mono samples into `out`, then advance the clock and collect
    /// finished nodes.
    ///
    /// While suspended the block is silence and the clock does not move.
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        if self.state != ContextState::Running || out.is_empty() {
            return;
        }

        let plan = match self.plan.take() {
            Some(plan) => plan,
            None => RenderPlan::build(&self.nodes),
        };

        let mut values = core::mem::take(&mut self.scratch);
        values.clear();
        values.resize(plan.steps.len(), 0.0);

        let sr = f64::from(self.sample_rate);
        for (i, sample) in out.iter_mut().enumerate() {
            let t = (self.frames + i as u64) as f64 / sr;
            let mut mix = 0.0;

            for (step_idx, step) in plan.steps.iter().enumerate() {
                let input: f32 = step.audio_inputs.iter().map(|&j| values[j]).sum();
                let mut modulation = [0.0f32; ParamKind::COUNT];
                for &(kind, j) in &step.param_inputs {
                    modulation[kind.slot()] += values[j];
                }

                let y = match self.nodes.get_mut(&step.id) {
                    Some(node) => node.tick(t, input, &modulation, self.sample_rate),
                    None => 0.0,
                };
                values[step_idx] = y;
                if step.to_output {
                    mix += y;
                }
            }

            *sample = mix;
        }

        self.scratch = values;
        self.plan = Some(plan);
        self.frames += out.len() as u64;

        let now = self.current_time();
        for node in self.nodes.values_mut() {
            for param in node.params.iter_mut().flatten() {
                param.prune(now);
            }
        }
        self.collect_garbage();
    }

    /// Render into an interleaved buffer, duplicating the mono mix across
    /// `channels`.
    pub fn render_interleaved(&mut self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let frames = out.len() / channels;

        let mut mono = core::mem::take(&mut self.mono);
        mono.clear();
        mono.resize(frames, 0.0);
        self.render(&mut mono);

        for (frame, &sample) in out.chunks_mut(channels).zip(mono.iter()) {
            frame.fill(sample);
        }
        // Trailing partial frame, if any.
        for s in out.iter_mut().skip(frames * channels) {
            *s = 0.0;
        }
        self.mono = mono;
    }

    /// Remove finished nodes until nothing else qualifies.
    ///
    /// Returns the number of nodes removed.
    pub fn collect_garbage(&mut self) -> usize {
        let now = self.current_time();
        let mut total = 0;

        loop {
            let mut fed: Vec<NodeId> = self
                .nodes
                .values()
                .flat_map(|n| n.outputs.iter().filter_map(|d| d.node()))
                .collect();
            fed.sort_unstable();
            fed.dedup();

            let doomed: Vec<NodeId> = self
                .nodes
                .iter()
                .filter(|(id, node)| match node.kind {
                    NodeKind::Oscillator { .. } => {
                        node.has_ended(now) || (!node.retained && !node.was_started())
                    }
                    NodeKind::Gain | NodeKind::LowPass { .. } => {
                        !node.retained && fed.binary_search(id).is_err()
                    }
                })
                .map(|(&id, _)| id)
                .collect();

            if doomed.is_empty() {
                break;
            }
            total += doomed.len();
            self.remove_nodes(&doomed);
        }

        #[cfg(feature = "tracing")]
        if total > 0 {
            tracing::debug!(
                removed = total,
                remaining = self.nodes.len(),
                "collected finished nodes"
            );
        }

        total
    }

    fn remove_nodes(&mut self, ids: &[NodeId]) {
        if ids.is_empty() {
            return;
        }
        for id in ids {
            self.nodes.remove(id);
        }
        for node in self.nodes.values_mut() {
            node.outputs
                .retain(|d| d.node().is_none_or(|target| !ids.contains(&target)));
        }
        self.plan = None;
    }

    fn node(&self, id: NodeId) -> Result<&NodeData> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))
    }
}
