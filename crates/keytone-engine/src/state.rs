//! Mutable engine state shared by the reconciler and the controller.

use keytone_config::DefaultFlags;
use keytone_core::AudioContext;
use keytone_synth::{FallbackHandle, Result as SynthResult, TrackHandle};

/// The enable flags, as last reported by a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundFlags {
    /// Master sound switch.
    pub sound_enabled: bool,
    /// Keystroke clicks.
    pub typing_sound_enabled: bool,
    /// Background music.
    pub background_music_enabled: bool,
}

impl Default for SoundFlags {
    fn default() -> Self {
        DefaultFlags::default().into()
    }
}

impl From<DefaultFlags> for SoundFlags {
    fn from(d: DefaultFlags) -> Self {
        Self {
            sound_enabled: d.sound_enabled,
            typing_sound_enabled: d.typing_sound_enabled,
            background_music_enabled: d.background_music_enabled,
        }
    }
}

/// What the reconciler remembers between snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilerMemory {
    /// `backgroundMusicEnabled` from the previous snapshot.
    pub previous_music_enabled: bool,
    /// Last observed typing position; `None` before the first snapshot.
    pub last_index: Option<i64>,
    /// A keystroke already sounded for `last_index`.
    pub keystroke_played: bool,
    /// The last event that actually played.
    pub last_sound_event: Option<String>,
}

/// The single music slot.
#[derive(Debug)]
pub enum ActiveMusic {
    /// A library track.
    Track(TrackHandle),
    /// The fallback chord.
    Fallback(FallbackHandle),
}

impl ActiveMusic {
    /// Display name of what is playing.
    pub fn name(&self) -> &str {
        match self {
            ActiveMusic::Track(handle) => handle.name(),
            ActiveMusic::Fallback(_) => FallbackHandle::NAME,
        }
    }

    /// Stop whichever variant this is.
    pub fn stop(self, ctx: &mut AudioContext) -> SynthResult<()> {
        match self {
            ActiveMusic::Track(handle) => handle.stop(ctx),
            ActiveMusic::Fallback(handle) => handle.stop(ctx),
        }
    }
}

/// Everything the engine mutates in response to snapshots.
#[derive(Debug, Default)]
pub struct EngineState {
    /// Current enable flags.
    pub flags: SoundFlags,
    /// Reconciler memory.
    pub memory: ReconcilerMemory,
    pub(crate) music: Option<ActiveMusic>,
}

impl EngineState {
    /// Fresh state starting from the given flags.
    pub fn new(flags: SoundFlags) -> Self {
        Self {
            flags,
            memory: ReconcilerMemory {
                previous_music_enabled: flags.background_music_enabled,
                ..ReconcilerMemory::default()
            },
            music: None,
        }
    }

    /// The music slot.
    pub fn music(&self) -> Option<&ActiveMusic> {
        self.music.as_ref()
    }

    /// Whether the music slot is occupied.
    pub fn is_music_playing(&self) -> bool {
        self.music.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_follow_config_defaults() {
        let flags = SoundFlags::default();
        assert!(flags.sound_enabled);
        assert!(flags.typing_sound_enabled);
        assert!(!flags.background_music_enabled);
    }

    #[test]
    fn memory_starts_from_music_flag() {
        let state = EngineState::new(SoundFlags {
            background_music_enabled: true,
            ..SoundFlags::default()
        });
        assert!(state.memory.previous_music_enabled);
        assert_eq!(state.memory.last_index, None);
        assert!(!state.is_music_playing());
    }
}
