//! Software audio graph with Web-Audio-style semantics.
//!
//! An [`AudioContext`] owns oscillator, gain and low-pass nodes. Nodes are
//! wired with [`AudioContext::connect`] to each other, to each other's
//! parameters (audio-rate modulation), or to the output bus. Rendering walks a
//! cached topological plan one sample at a time, so parameter automation and
//! modulation are sample accurate.
//!
//! # Architecture
//!
//! ```text
//!   Oscillator ──► LowPass ──► Gain ──► Gain (master) ──► Output
//!                    ▲
//!   Oscillator ──► Gain ─┘ (Param: Frequency)
//! ```
//!
//! Every node carries a retained flag. Creators that no longer need to address
//! a node release it, and the context collects it once it can no longer make
//! sound. This keeps a long session of scheduled notes from accumulating
//! nodes without callers tracking each one.

mod context;
mod node;
mod plan;
mod shared;

pub use context::{AudioContext, ContextOptions, ContextState, GraphMark};
pub use node::{Destination, NodeId, NodeType};
pub use shared::SharedContext;
