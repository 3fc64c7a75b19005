//! Keytone Synth - generative music and feedback sounds
//!
//! This crate composes the [`keytone_core`] audio graph into everything the
//! engine plays: background tracks, a fallback chord, one-shot effects and
//! the keystroke click.
//!
//! # Core Components
//!
//! ## Tone Builder
//!
//! - [`Tone`] - One oscillator chain with detune, filter, sweep and envelope
//! - [`Envelope`] - Sustain, gate, pluck and decay shapes
//! - [`Voice`] - Node ids of a played tone
//!
//! ## Tracks
//!
//! - [`TrackKind`] - The five built-in tracks
//! - [`TrackHandle`] / [`TrackBody`] - A sounding track and how to stop it
//! - [`TrackLibrary`] - Ordered registry of track factories
//! - [`FallbackHandle`] - Fixed chord used when a track fails to build
//!
//! ## Scheduling
//!
//! - [`Scheduler`] - Repeating tasks keyed to the context clock
//! - [`CancelToken`] - Cancels exactly one repeating task
//!
//! ## Effects
//!
//! - [`SoundEffect`] - `correct`, `incorrect`, `complete`, `levelup`
//! - [`play_keystroke`] - Typing click
//!
//! # Example
//!
//! ```rust
//! use keytone_core::{AudioContext, ContextOptions};
//! use keytone_synth::{Scheduler, TrackKind};
//!
//! let mut ctx = AudioContext::new(ContextOptions::default());
//! let mut scheduler = Scheduler::new();
//! ctx.resume();
//!
//! let track = TrackKind::Ambient.create(&mut ctx, &mut scheduler).unwrap();
//! let mut block = vec![0.0f32; 128];
//! ctx.render(&mut block);
//! scheduler.poll(&mut ctx);
//!
//! track.stop(&mut ctx).unwrap();
//! assert_eq!(ctx.live_oscillators(), 0);
//! ```

pub mod effects;
pub mod error;
pub mod fallback;
pub mod scheduler;
pub mod tone;
pub mod tracks;

pub use effects::{SoundEffect, play_keystroke};
pub use error::{Result, SynthError};
pub use fallback::FallbackHandle;
pub use scheduler::{CancelToken, Scheduler, Task};
pub use tone::{DECAY_FLOOR, Envelope, STOP_MARGIN, Tone, Voice};
pub use tracks::{
    Modulator, PairedVoice, TrackBody, TrackFactory, TrackHandle, TrackKind, TrackLibrary,
};
