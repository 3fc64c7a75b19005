//! Error types for tone, track and effect construction.

use keytone_core::GraphError;

/// Errors raised while building sound on an audio context.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SynthError {
    /// The underlying graph rejected an operation.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// No one-shot effect has this name.
    #[error("unknown sound effect `{0}`")]
    UnknownEffect(String),

    /// No track has this name.
    #[error("unknown track `{0}`")]
    UnknownTrack(String),
}

/// Result alias for synthesis operations.
pub type Result<T> = core::result::Result<T, SynthError>;
