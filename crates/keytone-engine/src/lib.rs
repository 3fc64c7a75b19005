//! Keytone Engine - snapshot-driven sound for a typing game
//!
//! The host reports its state as a [`Snapshot`] on every re-render. The
//! [`SoundEngine`] reconciles each one against what it remembers and plays
//! exactly what changed: background music on or off, one keystroke click per
//! typing position, and each one-shot event once.
//!
//! # Components
//!
//! - [`Snapshot`] / [`GameState`] - Host state, from JSON or DOM-style
//!   attributes
//! - [`reconcile`] / [`Decision`] - Pure snapshot-to-actions step
//! - [`EngineState`] - Flags, reconciler memory and the music slot
//! - [`SoundEngine`] - Executes decisions against a shared audio context
//!
//! # Example
//!
//! ```rust
//! use keytone_config::EngineConfig;
//! use keytone_engine::{Decision, Snapshot, SoundEngine};
//!
//! let mut engine = SoundEngine::from_config(&EngineConfig::default());
//! let snapshot = Snapshot {
//!     sound_enabled: true,
//!     typing_sound_enabled: true,
//!     key_pressed: true,
//!     current_index: 1,
//!     ..Snapshot::default()
//! };
//!
//! assert_eq!(engine.update(&snapshot), [Decision::Keystroke]);
//! // Same position again: no second click.
//! assert!(engine.update(&snapshot).is_empty());
//! ```

pub mod engine;
pub mod reconciler;
pub mod snapshot;
pub mod state;

pub use engine::SoundEngine;
pub use reconciler::{Decision, reconcile};
pub use snapshot::{GameState, Snapshot};
pub use state::{ActiveMusic, EngineState, ReconcilerMemory, SoundFlags};
