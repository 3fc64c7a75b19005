//! Playback controller.

use keytone_config::EngineConfig;
use keytone_core::{AudioContext, ContextOptions, SharedContext};
use keytone_synth::{FallbackHandle, Scheduler, SoundEffect, TrackLibrary, play_keystroke};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::reconciler::{Decision, reconcile};
use crate::snapshot::Snapshot;
use crate::state::{ActiveMusic, EngineState, SoundFlags};

/// Owns the music slot and turns snapshots into sound.
///
/// Every operation degrades to silence instead of failing: a missing
/// context, a track that fails to build, a fallback that fails too, or a
/// teardown error are all logged and absorbed.
///
/// # Example
///
/// ```rust
/// use keytone_config::EngineConfig;
/// use keytone_engine::{GameState, Snapshot, SoundEngine};
///
/// let mut engine = SoundEngine::from_config(&EngineConfig::default());
/// engine.update(&Snapshot {
///     sound_enabled: true,
///     background_music_enabled: true,
///     game_state: GameState::Playing,
///     ..Snapshot::default()
/// });
/// assert!(engine.is_music_playing());
///
/// let audio = engine.render_offline(0.1);
/// assert_eq!(audio.len(), 4800);
/// ```
pub struct SoundEngine {
    context: Option<SharedContext>,
    scheduler: Scheduler,
    library: TrackLibrary,
    rng: Pcg32,
    state: EngineState,
    block_size: usize,
    warned_detached: bool,
}

impl core::fmt::Debug for SoundEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SoundEngine")
            .field("attached", &self.context.is_some())
            .field("library", &self.library)
            .field("state", &self.state)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

impl SoundEngine {
    /// Engine driving `context`, with flags, seed and block size from
    /// `config`.
    pub fn new(context: SharedContext, config: &EngineConfig) -> Self {
        Self::build(Some(context), config)
    }

    /// Engine with a fresh context sized from `config`.
    pub fn from_config(config: &EngineConfig) -> Self {
        let context = AudioContext::new(ContextOptions {
            sample_rate: config.audio.sample_rate as f32,
            max_nodes: config.engine.max_nodes,
        });
        Self::new(SharedContext::new(context), config)
    }

    /// Engine with no audio backend; every operation is a silent no-op.
    pub fn detached() -> Self {
        Self::build(None, &EngineConfig::default())
    }

    fn build(context: Option<SharedContext>, config: &EngineConfig) -> Self {
        let rng = match config.engine.seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_rng(&mut rand::rng()),
        };
        Self {
            context,
            scheduler: Scheduler::new(),
            library: TrackLibrary::standard(),
            rng,
            state: EngineState::new(SoundFlags::from(config.defaults)),
            block_size: config.engine.block_size.max(1),
            warned_detached: false,
        }
    }

    /// Replace the track library.
    pub fn with_library(mut self, library: TrackLibrary) -> Self {
        self.library = library;
        self
    }

    /// The shared context, if attached.
    pub fn context(&self) -> Option<&SharedContext> {
        self.context.as_ref()
    }

    /// Current engine state.
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// The track library.
    pub fn library(&self) -> &TrackLibrary {
        &self.library
    }

    /// Whether the music slot is occupied.
    pub fn is_music_playing(&self) -> bool {
        self.state.is_music_playing()
    }

    /// Name of the track (or fallback) in the music slot.
    pub fn current_track(&self) -> Option<&str> {
        self.state.music().map(ActiveMusic::name)
    }

    /// Repeating tasks still scheduled.
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.active()
    }

    /// Reconcile one snapshot and carry out the result.
    ///
    /// Returns the decisions in the order they were executed.
    pub fn update(&mut self, snapshot: &Snapshot) -> Vec<Decision> {
        let decisions = reconcile(&mut self.state, snapshot);
        for decision in &decisions {
            tracing::debug!(?decision, "executing");
            match decision {
                Decision::StartMusic => self.start_background_music(),
                Decision::StopMusic => self.stop_background_music(),
                Decision::Keystroke => self.play_keystroke(),
                Decision::Effect(name) => self.play_effect(name),
            }
        }
        decisions
    }

    /// Start a random track from the library.
    ///
    /// Does nothing unless sound and music are enabled and the slot is
    /// empty. If the chosen track fails to build, its partial graph is rolled
    /// back and the fallback chord is tried once.
    pub fn start_background_music(&mut self) {
        let flags = self.state.flags;
        if !flags.sound_enabled || !flags.background_music_enabled || self.state.music.is_some() {
            return;
        }
        let Some(shared) = self.context.as_ref() else {
            if !self.warned_detached {
                tracing::warn!("no audio backend, background music disabled");
                self.warned_detached = true;
            }
            return;
        };
        let mut ctx = match shared.lock() {
            Ok(ctx) => ctx,
            Err(err) => {
                tracing::error!(%err, "cannot start background music");
                return;
            }
        };
        ctx.resume();

        if !self.library.is_empty() {
            let index = self.rng.random_range(0..self.library.len());
            let name = self.library.name(index).unwrap_or_default().to_string();
            let mark = ctx.mark();
            match self.library.create(index, &mut ctx, &mut self.scheduler) {
                Some(Ok(handle)) => {
                    tracing::info!(track = %name, nodes = ctx.node_count(), "background music started");
                    self.state.music = Some(ActiveMusic::Track(handle));
                    return;
                }
                Some(Err(err)) => {
                    let discarded = ctx.rollback(mark);
                    tracing::error!(track = %name, %err, discarded, "track failed to start, trying fallback");
                }
                None => {}
            }
        }

        let mark = ctx.mark();
        match FallbackHandle::create(&mut ctx) {
            Ok(handle) => {
                tracing::info!(track = FallbackHandle::NAME, "background music started");
                self.state.music = Some(ActiveMusic::Fallback(handle));
            }
            Err(err) => {
                ctx.rollback(mark);
                tracing::error!(%err, "fallback failed, staying silent");
            }
        }
    }

    /// Stop whatever is in the music slot. Safe to call repeatedly.
    ///
    /// The slot is emptied before teardown, so a failing teardown can never
    /// leave the engine believing music is still playing.
    pub fn stop_background_music(&mut self) {
        let Some(music) = self.state.music.take() else {
            return;
        };
        let name = music.name().to_string();
        let Some(shared) = self.context.as_ref() else {
            return;
        };
        match shared.lock() {
            Ok(mut ctx) => match music.stop(&mut ctx) {
                Ok(()) => tracing::info!(track = %name, "background music stopped"),
                Err(err) => tracing::error!(track = %name, %err, "teardown failed, handle discarded"),
            },
            Err(err) => tracing::error!(track = %name, %err, "teardown failed, handle discarded"),
        }
    }

    /// Play the keystroke click if sound and typing sound are enabled.
    pub fn play_keystroke(&mut self) {
        let flags = self.state.flags;
        if !flags.sound_enabled || !flags.typing_sound_enabled {
            return;
        }
        let Some(shared) = self.context.as_ref() else {
            return;
        };
        let result = shared
            .lock()
            .map_err(keytone_synth::SynthError::from)
            .and_then(|mut ctx| play_keystroke(&mut ctx));
        if let Err(err) = result {
            tracing::error!(%err, "keystroke failed");
        }
    }

    /// Play a one-shot effect by name if sound is enabled.
    ///
    /// Unknown names are ignored.
    pub fn play_effect(&mut self, name: &str) {
        if !self.state.flags.sound_enabled {
            return;
        }
        let effect = match name.parse::<SoundEffect>() {
            Ok(effect) => effect,
            Err(err) => {
                tracing::debug!(%err, "ignoring sound event");
                return;
            }
        };
        let Some(shared) = self.context.as_ref() else {
            return;
        };
        let result = shared
            .lock()
            .map_err(keytone_synth::SynthError::from)
            .and_then(|mut ctx| effect.play(&mut ctx));
        if let Err(err) = result {
            tracing::error!(%effect, %err, "effect failed");
        }
    }

    /// Run repeating tasks that have come due. Returns how many ran.
    pub fn tick(&mut self) -> usize {
        let Some(shared) = self.context.as_ref() else {
            return 0;
        };
        match shared.lock() {
            Ok(mut ctx) => self.scheduler.poll(&mut ctx),
            Err(err) => {
                tracing::error!(%err, "scheduler tick skipped");
                0
            }
        }
    }

    /// Render `seconds` of mono output, ticking between blocks.
    ///
    /// Returns an empty buffer when detached.
    pub fn render_offline(&mut self, seconds: f64) -> Vec<f32> {
        let frames = (seconds.max(0.0) * f64::from(self.sample_rate())) as usize;
        self.render_frames(frames)
    }

    /// Render exactly `frames` mono samples, ticking between blocks.
    ///
    /// Returns an empty buffer when detached.
    pub fn render_frames(&mut self, frames: usize) -> Vec<f32> {
        let Some(shared) = self.context.as_ref() else {
            return Vec::new();
        };
        let mut out = vec![0.0f32; frames];
        for block in out.chunks_mut(self.block_size) {
            match shared.lock() {
                Ok(mut ctx) => {
                    ctx.render(block);
                    self.scheduler.poll(&mut ctx);
                }
                Err(err) => {
                    tracing::error!(%err, "offline render aborted");
                    break;
                }
            }
        }
        out
    }

    /// Sample rate of the context, or 0 when detached.
    pub fn sample_rate(&self) -> f32 {
        self.context
            .as_ref()
            .and_then(|shared| shared.lock().ok())
            .map_or(0.0, |ctx| ctx.sample_rate())
    }
}

impl Drop for SoundEngine {
    fn drop(&mut self) {
        self.stop_background_music();
    }
}
