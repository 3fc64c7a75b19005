//! CLI command implementations.

pub mod common;
pub mod devices;
pub mod effect;
pub mod play;
pub mod render;
pub mod replay;
pub mod tracks;
