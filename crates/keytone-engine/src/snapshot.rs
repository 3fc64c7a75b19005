//! Point-in-time view of the host's sound state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Derived game phase. Music only plays while the phase is active.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GameState {
    /// The player is typing.
    Playing,
    /// The round just finished.
    Complete,
    /// Any other token, including the empty one.
    Other(String),
}

impl Default for GameState {
    fn default() -> Self {
        GameState::Other(String::new())
    }
}

impl GameState {
    /// Whether background music should be allowed to play.
    pub fn is_active(&self) -> bool {
        matches!(self, GameState::Playing | GameState::Complete)
    }

    /// Token as it appears in the host markup.
    pub fn as_str(&self) -> &str {
        match self {
            GameState::Playing => "playing",
            GameState::Complete => "complete",
            GameState::Other(s) => s,
        }
    }
}

impl From<String> for GameState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "playing" => GameState::Playing,
            "complete" => GameState::Complete,
            _ => GameState::Other(s),
        }
    }
}

impl From<&str> for GameState {
    fn from(s: &str) -> Self {
        GameState::from(s.to_string())
    }
}

impl From<GameState> for String {
    fn from(state: GameState) -> Self {
        state.as_str().to_string()
    }
}

/// Immutable read of the host state, consumed once per update.
///
/// Serializes as camelCase JSON:
///
/// ```json
/// {
///   "soundEnabled": true,
///   "typingSoundEnabled": true,
///   "backgroundMusicEnabled": false,
///   "lastSoundEvent": "correct",
///   "keyPressed": true,
///   "currentIndex": 12,
///   "gameState": "playing"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    /// Master sound switch.
    pub sound_enabled: bool,
    /// Keystroke clicks.
    pub typing_sound_enabled: bool,
    /// Background music.
    pub background_music_enabled: bool,
    /// Most recent one-shot event name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sound_event: Option<String>,
    /// A key press is being reported.
    pub key_pressed: bool,
    /// Typing position; only ever increases within a round.
    pub current_index: i64,
    /// Derived game phase.
    pub game_state: GameState,
}

/// Attribute names read by [`Snapshot::from_attributes`].
pub mod attr {
    /// `"true"` enables all sound.
    pub const SOUND_ENABLED: &str = "data-sound-enabled";
    /// `"true"` enables keystroke clicks.
    pub const TYPING_SOUND_ENABLED: &str = "data-typing-sound-enabled";
    /// `"true"` enables background music.
    pub const BACKGROUND_MUSIC_ENABLED: &str = "data-background-music-enabled";
    /// Name of the latest one-shot event.
    pub const LAST_SOUND_EVENT: &str = "data-last-sound-event";
    /// Present while a key press is reported; the value is ignored.
    pub const KEY_PRESSED: &str = "data-key-pressed";
    /// Typing position as a decimal integer.
    pub const CURRENT_INDEX: &str = "data-current-index";
    /// Game phase token.
    pub const GAME_STATE: &str = "data-game-state";
    /// Present once the round is complete; forces [`GameState::Complete`](super::GameState::Complete).
    pub const GAME_COMPLETE: &str = "game-complete";
}

impl Snapshot {
    /// Build a snapshot from DOM-dataset-style attributes.
    ///
    /// Booleans are true only for the literal `"true"`. A missing or
    /// unparsable index reads as 0 and an empty event reads as absent.
    pub fn from_attributes(attrs: &HashMap<String, String>) -> Self {
        let flag = |name: &str| attrs.get(name).is_some_and(|v| v == "true");

        let game_state = if attrs.contains_key(attr::GAME_COMPLETE) {
            GameState::Complete
        } else {
            attrs
                .get(attr::GAME_STATE)
                .map_or_else(GameState::default, |s| GameState::from(s.as_str()))
        };

        Self {
            sound_enabled: flag(attr::SOUND_ENABLED),
            typing_sound_enabled: flag(attr::TYPING_SOUND_ENABLED),
            background_music_enabled: flag(attr::BACKGROUND_MUSIC_ENABLED),
            last_sound_event: attrs
                .get(attr::LAST_SOUND_EVENT)
                .filter(|e| !e.is_empty())
                .cloned(),
            key_pressed: attrs.contains_key(attr::KEY_PRESSED),
            current_index: attrs
                .get(attr::CURRENT_INDEX)
                .map_or(0, |s| parse_index(s)),
            game_state,
        }
    }
}

/// Parse the leading integer of `s`, or 0 when there is none.
///
/// Digit runs beyond the `i64` range saturate.
fn parse_index(s: &str) -> i64 {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return 0;
    }
    let saturated = if sign < 0 { i64::MIN } else { i64::MAX };
    digits.parse::<i64>().map_or(saturated, |n| sign * n)
}
