use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const NINE_BALL_RACK: [u8; 9] = [1, 2, 3, 4, 5, 6, 7, 8, 9];
const TEN_BALL_RACK: [u8; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

/// Game variant selected on a table, which determines the tracked rack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum GameMode {
    /// 9-ball: balls 1 through 9 are tracked.
    #[default]
    #[serde(rename = "9")]
    NineBall,
    /// 10-ball: balls 1 through 10 are tracked.
    #[serde(rename = "10")]
    TenBall,
    /// 15-ball: no numbered sidebar, nothing is tracked.
    #[serde(rename = "15")]
    FifteenBall,
}

impl GameMode {
    /// Ordered ball numbers in play for this mode.
    pub fn rack(self) -> &'static [u8] {
        match self {
            GameMode::NineBall => &NINE_BALL_RACK,
            GameMode::TenBall => &TEN_BALL_RACK,
            GameMode::FifteenBall => &[],
        }
    }

    /// Whether `ball` belongs to the rack of this mode.
    pub fn contains(self, ball: u8) -> bool {
        self.rack().contains(&ball)
    }

    /// Tag used by clients and persisted blobs ("9", "10" or "15").
    pub fn tag(self) -> &'static str {
        match self {
            GameMode::NineBall => "9",
            GameMode::TenBall => "10",
            GameMode::FifteenBall => "15",
        }
    }
}

/// Balls of the rack that are not visible on the table.
pub fn derive_pocketed(mode: GameMode, visible: &BTreeSet<u8>) -> BTreeSet<u8> {
    mode.rack()
        .iter()
        .copied()
        .filter(|ball| !visible.contains(ball))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn racks_match_game_modes() {
        assert_eq!(GameMode::NineBall.rack(), &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(GameMode::TenBall.rack().len(), 10);
        assert!(GameMode::TenBall.contains(10));
        assert!(!GameMode::NineBall.contains(10));
        assert!(GameMode::FifteenBall.rack().is_empty());
    }

    #[test]
    fn pocketed_is_rack_minus_visible() {
        let visible = BTreeSet::from([2, 5, 9]);
        let pocketed = derive_pocketed(GameMode::NineBall, &visible);
        assert_eq!(pocketed, BTreeSet::from([1, 3, 4, 6, 7, 8]));
    }

    #[test]
    fn visible_balls_outside_rack_are_ignored() {
        let visible = BTreeSet::from([1, 2, 3, 4, 5, 6, 7, 8, 9, 14]);
        assert!(derive_pocketed(GameMode::NineBall, &visible).is_empty());
        assert!(derive_pocketed(GameMode::FifteenBall, &BTreeSet::new()).is_empty());
    }

    #[test]
    fn game_mode_uses_numeric_tags() {
        assert_eq!(serde_json::to_string(&GameMode::TenBall).unwrap(), "\"10\"");
        let parsed: GameMode = serde_json::from_str("\"15\"").unwrap();
        assert_eq!(parsed, GameMode::FifteenBall);
        assert_eq!(parsed.tag(), "15");
    }
}
