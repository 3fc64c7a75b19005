//! Keytone Core - software audio graph for procedural sound
//!
//! This crate provides the synthesis substrate the rest of keytone builds on:
//! a sample-accurate audio graph modelled on the Web Audio API, with automation
//! timelines and automatic collection of finished nodes.
//!
//! # Core Abstractions
//!
//! ## Graph
//!
//! - [`AudioContext`] - Owns nodes, the clock and the render loop
//! - [`SharedContext`] - `Arc<Mutex<_>>` handle for real-time callbacks
//! - [`Destination`] - Output bus, node input, or node parameter
//! - [`GraphMark`] - Rollback point for discarding half-built graphs
//!
//! ## Parameters
//!
//! - [`AudioParam`] - Intrinsic value plus set/linear/exponential automation
//! - [`ParamKind`] - Frequency, detune, gain, Q
//!
//! ## Signal Primitives
//!
//! - [`Oscillator`] - PolyBLEP sine/square/sawtooth/triangle generator
//! - [`Biquad`] - Second-order IIR filter with RBJ cookbook coefficients
//!
//! # Example
//!
//! ```rust
//! use keytone_core::{AudioContext, ContextOptions, Destination, ParamKind, Waveform};
//!
//! let mut ctx = AudioContext::new(ContextOptions::default());
//! ctx.resume();
//!
//! let osc = ctx.create_oscillator(Waveform::Sine).unwrap();
//! let env = ctx.create_gain().unwrap();
//! ctx.connect(osc, Destination::Node(env)).unwrap();
//! ctx.connect(env, Destination::Output).unwrap();
//!
//! // 10 ms attack, exponential decay to 0.01 over half a second.
//! ctx.set_value_at_time(env, ParamKind::Gain, 0.0, 0.0).unwrap();
//! ctx.linear_ramp_to_value_at_time(env, ParamKind::Gain, 0.2, 0.01).unwrap();
//! ctx.exponential_ramp_to_value_at_time(env, ParamKind::Gain, 0.01, 0.5).unwrap();
//! ctx.start(osc, 0.0).unwrap();
//! ctx.stop(osc, 0.5).unwrap();
//!
//! let mut block = vec![0.0f32; 48000];
//! ctx.render(&mut block);
//! assert_eq!(ctx.live_oscillators(), 0);
//! ```

pub mod biquad;
pub mod error;
pub mod graph;
pub mod oscillator;
pub mod param;

pub use biquad::{Biquad, lowpass_coefficients};
pub use error::{GraphError, Result};
pub use graph::{
    AudioContext, ContextOptions, ContextState, Destination, GraphMark, NodeId, NodeType,
    SharedContext,
};
pub use oscillator::{Oscillator, Waveform};
pub use param::{AudioParam, AutomationEvent, ParamKind};
