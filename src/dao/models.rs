//! Persisted blob layouts. Keys are camelCase to stay readable by the
//! browser overlay that shares the same storage.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::state::{player::Player, rack::GameMode, ring_engine::DetectionMode};

/// Storage key of the player roster.
pub const ROSTER_KEY: &str = "barako-players";
/// Storage key of the 2-player match.
pub const MATCH_STATE_KEY: &str = "barako-match-state";
/// Storage key of the 3-player ring game.
pub const RING_STATE_KEY: &str = "barako-ring-state";

/// 2-player match blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchBlob {
    pub player1: Player,
    pub player2: Player,
    pub player1_score: u32,
    pub player2_score: u32,
    pub race_to: u32,
    pub game_mode: GameMode,
    /// Pocketed ball numbers in ascending order.
    #[serde(default)]
    pub pocketed: Vec<u8>,
}

impl MatchBlob {
    /// Decode a stored blob key by key; any missing or mistyped field keeps
    /// its default instead of discarding the whole blob.
    pub fn from_value(value: &Value, default_race_to: u32) -> Self {
        Self {
            player1: field(value, "player1").unwrap_or_else(|| Player::placeholder(1)),
            player2: field(value, "player2").unwrap_or_else(|| Player::placeholder(2)),
            player1_score: field(value, "player1Score").unwrap_or_default(),
            player2_score: field(value, "player2Score").unwrap_or_default(),
            race_to: race_to_field(value, default_race_to),
            game_mode: field(value, "gameMode").unwrap_or_default(),
            pocketed: field(value, "pocketed").unwrap_or_default(),
        }
    }
}

/// 3-player ring game blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RingBlob {
    pub player1: Player,
    pub player2: Player,
    pub player3: Player,
    pub p1_score: u32,
    pub p2_score: u32,
    pub p3_score: u32,
    pub race_to: u32,
    pub game_mode: GameMode,
    pub p1_playing: bool,
    pub p2_playing: bool,
    pub p3_playing: bool,
    #[serde(default)]
    pub pocketed: Vec<u8>,
    #[serde(default)]
    pub detection_mode: DetectionMode,
}

impl RingBlob {
    /// Decode a stored blob key by key, like [`MatchBlob::from_value`].
    pub fn from_value(value: &Value, default_race_to: u32) -> Self {
        Self {
            player1: field(value, "player1").unwrap_or_else(|| Player::placeholder(1)),
            player2: field(value, "player2").unwrap_or_else(|| Player::placeholder(2)),
            player3: field(value, "player3").unwrap_or_else(|| Player::placeholder(3)),
            p1_score: field(value, "p1Score").unwrap_or_default(),
            p2_score: field(value, "p2Score").unwrap_or_default(),
            p3_score: field(value, "p3Score").unwrap_or_default(),
            race_to: race_to_field(value, default_race_to),
            game_mode: field(value, "gameMode").unwrap_or_default(),
            p1_playing: field(value, "p1Playing").unwrap_or_default(),
            p2_playing: field(value, "p2Playing").unwrap_or_default(),
            p3_playing: field(value, "p3Playing").unwrap_or_default(),
            pocketed: field(value, "pocketed").unwrap_or_default(),
            detection_mode: field(value, "detectionMode").unwrap_or_default(),
        }
    }
}

/// Decode the stored roster, dropping individual records that do not parse.
///
/// Returns `None` when the blob is not a list at all.
pub fn roster_from_value(value: &Value) -> Option<Vec<Player>> {
    let entries = value.as_array()?;
    Some(
        entries
            .iter()
            .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
            .collect(),
    )
}

fn field<T: DeserializeOwned>(value: &Value, key: &str) -> Option<T> {
    value
        .get(key)
        .cloned()
        .and_then(|raw| serde_json::from_value(raw).ok())
}

/// A stored race target of zero counts as unset.
fn race_to_field(value: &Value, default_race_to: u32) -> u32 {
    field::<u32>(value, "raceTo")
        .filter(|race_to| *race_to != 0)
        .unwrap_or(default_race_to)
}
