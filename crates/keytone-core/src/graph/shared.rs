//! Thread-shared handle to an [`AudioContext`].

use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

use super::AudioContext;
use crate::error::{GraphError, Result};

/// An [`AudioContext`] shared between the control thread and an audio
/// callback.
///
/// The control side takes the lock to build or tear down nodes. The audio
/// callback only ever uses [`try_render_interleaved`](Self::try_render_interleaved),
/// which never blocks: on contention it writes silence for that buffer.
#[derive(Debug, Clone)]
pub struct SharedContext {
    inner: Arc<Mutex<AudioContext>>,
}

impl SharedContext {
    /// Wrap a context for sharing.
    pub fn new(context: AudioContext) -> Self {
        Self {
            inner: Arc::new(Mutex::new(context)),
        }
    }

    /// Lock the context for mutation.
    pub fn lock(&self) -> Result<MutexGuard<'_, AudioContext>> {
        self.inner.lock().map_err(|_| GraphError::Poisoned)
    }

    /// Render into an interleaved buffer without blocking.
    ///
    /// Returns `false` (and fills `out` with silence) if the context was busy
    /// or poisoned.
    pub fn try_render_interleaved(&self, out: &mut [f32], channels: usize) -> bool {
        match self.inner.try_lock() {
            Ok(mut ctx) => {
                ctx.render_interleaved(out, channels);
                true
            }
            Err(TryLockError::WouldBlock | TryLockError::Poisoned(_)) => {
                out.fill(0.0);
                false
            }
        }
    }
}
