//! Audio output for keytone.
//!
//! This crate provides:
//!
//! - **Live output**: [`start_output`] drives a [`SharedContext`] from an
//!   [`AudioBackend`] callback; [`CpalBackend`] is the desktop backend
//! - **Device listing**: [`list_output_devices`] and [`default_output_device`]
//! - **WAV files**: [`write_wav`] and [`read_wav`] for offline renders
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use keytone_core::{AudioContext, ContextOptions, SharedContext};
//! use keytone_io::{BackendStreamConfig, CpalBackend, start_output};
//!
//! let shared = SharedContext::new(AudioContext::new(ContextOptions::default()));
//! let backend = CpalBackend::new();
//! let _stream = start_output(&backend, &BackendStreamConfig::default(), shared.clone())?;
//! // Audio plays until `_stream` is dropped.
//! ```
//!
//! [`SharedContext`]: keytone_core::SharedContext

pub mod backend;
pub mod cpal_backend;
mod stream;
mod wav;

pub use backend::{AudioBackend, BackendStreamConfig, ErrorCallback, OutputCallback, StreamHandle};
pub use cpal_backend::CpalBackend;
pub use stream::{
    AudioDevice, context_callback, default_output_device, list_output_devices, start_output,
};
pub use wav::{WavSpec, read_wav, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested sample format is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
