//! Error types for graph operations.

use crate::graph::NodeId;
use crate::param::ParamKind;

/// Errors that can occur while building or mutating an audio graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// The node id does not refer to a live node.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// The node exists but has no parameter of that kind.
    #[error("node {0} has no {1} parameter")]
    NoSuchParam(NodeId, ParamKind),

    /// Oscillators generate signal and take no audio input.
    #[error("node {0} accepts no audio input")]
    NoInput(NodeId),

    /// Start/stop was requested on a node that is not an oscillator.
    #[error("node {0} is not an oscillator")]
    NotAnOscillator(NodeId),

    /// `start` was called twice on the same oscillator.
    #[error("oscillator {0} already started")]
    AlreadyStarted(NodeId),

    /// `stop` was called on an oscillator that was never started.
    #[error("oscillator {0} was never started")]
    NotStarted(NodeId),

    /// Adding the connection would create a cycle.
    #[error("connection would create a cycle")]
    CycleDetected,

    /// The context already holds its maximum number of nodes.
    #[error("node limit of {0} reached")]
    NodeLimit(usize),

    /// Exponential ramps need a strictly positive target.
    #[error("exponential ramp target must be positive, got {0}")]
    NonPositiveRampTarget(f32),

    /// A scheduled time was negative or not finite.
    #[error("invalid automation time {0}")]
    InvalidTime(f64),

    /// Another thread panicked while holding the shared context.
    #[error("audio context lock poisoned")]
    Poisoned,
}

/// Result alias for graph operations.
pub type Result<T> = core::result::Result<T, GraphError>;
