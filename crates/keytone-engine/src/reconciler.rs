//! Snapshot reconciliation.
//!
//! [`reconcile`] turns one snapshot into an ordered list of [`Decision`]s and
//! updates [`EngineState`] so the same snapshot seen twice decides nothing
//! new. It never touches audio; the controller executes the decisions.
//!
//! Order per update:
//!
//! 1. Background music. Two rules vote: the enable-flag edge and the game
//!    phase. A stop vote from either wins, and only an actual change of the
//!    music slot is emitted.
//! 2. Typing position. A new `currentIndex` re-arms the keystroke click.
//! 3. Keystroke. At most one click per position.
//! 4. One-shot event. Played when it differs from the last event that
//!    played.

use crate::snapshot::Snapshot;
use crate::state::EngineState;

/// One action for the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Start background music.
    StartMusic,
    /// Stop background music.
    StopMusic,
    /// Play the keystroke click.
    Keystroke,
    /// Play the named one-shot effect.
    Effect(String),
}

/// Votes cast by the two music rules for one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct MusicVotes {
    start: bool,
    stop: bool,
}

fn music_votes(snapshot: &Snapshot, previous_enabled: bool, playing: bool) -> MusicVotes {
    let enabled = snapshot.background_music_enabled;
    let sound = snapshot.sound_enabled;
    let mut votes = MusicVotes::default();

    // Enable-flag edge.
    if enabled != previous_enabled {
        if enabled && sound {
            votes.start = true;
        } else {
            votes.stop = true;
        }
    }

    // Game phase. Also vetoes a flag-edge start that it would undo at once.
    let wanted = enabled && sound && snapshot.game_state.is_active();
    if wanted && !playing {
        votes.start = true;
    } else if !wanted {
        votes.stop = true;
    }

    votes
}

/// Apply `snapshot` to `state` and return what should happen, in order.
pub fn reconcile(state: &mut EngineState, snapshot: &Snapshot) -> Vec<Decision> {
    let mut decisions = Vec::new();
    let playing = state.is_music_playing();

    state.flags.sound_enabled = snapshot.sound_enabled;
    state.flags.typing_sound_enabled = snapshot.typing_sound_enabled;
    state.flags.background_music_enabled = snapshot.background_music_enabled;

    let votes = music_votes(snapshot, state.memory.previous_music_enabled, playing);
    state.memory.previous_music_enabled = snapshot.background_music_enabled;
    if votes.stop {
        if playing {
            decisions.push(Decision::StopMusic);
        }
    } else if votes.start && !playing {
        decisions.push(Decision::StartMusic);
    }

    let memory = &mut state.memory;
    if memory.last_index != Some(snapshot.current_index) {
        memory.last_index = Some(snapshot.current_index);
        memory.keystroke_played = false;
    }

    if snapshot.key_pressed
        && snapshot.typing_sound_enabled
        && snapshot.sound_enabled
        && !memory.keystroke_played
    {
        memory.keystroke_played = true;
        decisions.push(Decision::Keystroke);
    }

    if let Some(event) = &snapshot.last_sound_event
        && !event.is_empty()
        && snapshot.sound_enabled
        && memory.last_sound_event.as_ref() != Some(event)
    {
        memory.last_sound_event = Some(event.clone());
        decisions.push(Decision::Effect(event.clone()));
    }

    decisions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::GameState;

    fn playing(sound: bool, music: bool) -> Snapshot {
        Snapshot {
            sound_enabled: sound,
            typing_sound_enabled: true,
            background_music_enabled: music,
            game_state: GameState::Playing,
            ..Snapshot::default()
        }
    }

    #[test]
    fn flag_edge_starts_during_play() {
        let mut state = EngineState::default();
        assert!(reconcile(&mut state, &playing(true, false)).is_empty());
        assert_eq!(
            reconcile(&mut state, &playing(true, true)),
            [Decision::StartMusic]
        );
        assert!(state.flags.background_music_enabled);
    }

    #[test]
    fn flag_edge_outside_play_is_vetoed() {
        let mut state = EngineState::default();
        let snap = Snapshot {
            background_music_enabled: true,
            sound_enabled: true,
            game_state: GameState::Other("lobby".to_string()),
            ..Snapshot::default()
        };
        assert!(reconcile(&mut state, &snap).is_empty());
    }

    #[test]
    fn start_is_requested_again_while_slot_is_empty() {
        // The controller may fail to fill the slot; the game rule then asks
        // again on the next snapshot.
        let mut state = EngineState::default();
        reconcile(&mut state, &playing(true, true));
        assert_eq!(
            reconcile(&mut state, &playing(true, true)),
            [Decision::StartMusic]
        );
    }

    #[test]
    fn keystroke_rearms_on_index_change() {
        let mut state = EngineState::default();
        let mut snap = Snapshot {
            sound_enabled: true,
            typing_sound_enabled: true,
            key_pressed: true,
            current_index: 3,
            ..Snapshot::default()
        };
        assert_eq!(reconcile(&mut state, &snap), [Decision::Keystroke]);
        assert!(reconcile(&mut state, &snap).is_empty());

        snap.current_index = 4;
        assert_eq!(reconcile(&mut state, &snap), [Decision::Keystroke]);
    }

    #[test]
    fn keystroke_needs_both_flags() {
        let mut state = EngineState::default();
        let snap = Snapshot {
            sound_enabled: true,
            typing_sound_enabled: false,
            key_pressed: true,
            ..Snapshot::default()
        };
        assert!(reconcile(&mut state, &snap).is_empty());
        assert!(!state.memory.keystroke_played);
    }

    #[test]
    fn muted_event_is_not_recorded() {
        let mut state = EngineState::default();
        let mut snap = Snapshot {
            sound_enabled: false,
            last_sound_event: Some("correct".to_string()),
            ..Snapshot::default()
        };
        assert!(reconcile(&mut state, &snap).is_empty());
        assert_eq!(state.memory.last_sound_event, None);

        snap.sound_enabled = true;
        assert_eq!(
            reconcile(&mut state, &snap),
            [Decision::Effect("correct".to_string())]
        );
    }

    #[test]
    fn decisions_come_in_fixed_order() {
        let mut state = EngineState::default();
        let snap = Snapshot {
            key_pressed: true,
            last_sound_event: Some("levelup".to_string()),
            ..playing(true, true)
        };
        assert_eq!(
            reconcile(&mut state, &snap),
            [
                Decision::StartMusic,
                Decision::Keystroke,
                Decision::Effect("levelup".to_string()),
            ]
        );
    }

    #[test]
    fn empty_event_is_neither_played_nor_recorded() {
        let mut state = EngineState::default();
        let with_event = |event: &str| Snapshot {
            last_sound_event: Some(event.to_string()),
            ..playing(true, false)
        };

        assert_eq!(
            reconcile(&mut state, &with_event("correct")),
            [Decision::Effect("correct".to_string())]
        );
        assert!(reconcile(&mut state, &with_event("")).is_empty());
        assert_eq!(state.memory.last_sound_event.as_deref(), Some("correct"));
        assert!(reconcile(&mut state, &with_event("correct")).is_empty());
    }
}
