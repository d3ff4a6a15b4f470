use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dao::models::RingBlob,
    state::{
        player::Player,
        rack::{GameMode, derive_pocketed},
        table::{InvalidTransition, Seat, Table},
    },
};

/// How the ring game's pocketed set is maintained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMode {
    /// Operators toggle balls by hand.
    #[default]
    Manual,
    /// Pocketed balls follow the detection feed.
    Automatic,
}

impl DetectionMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            DetectionMode::Manual => DetectionMode::Automatic,
            DetectionMode::Automatic => DetectionMode::Manual,
        }
    }
}

/// Events accepted by the 3-player ring game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RingEvent {
    /// Add `delta` to a seat's score (floored at zero).
    AdjustScore {
        /// Seat whose score changes.
        seat: Seat,
        /// Signed change.
        delta: i32,
    },
    /// Set the race target (clamped).
    SetRaceTo(i64),
    /// Move the race target by a signed step (clamped).
    StepRaceTo(i32),
    /// Flip a ball; in automatic mode this is a manual override that lasts
    /// until the next detection update.
    ToggleBall(u8),
    /// Empty the pocketed set.
    ClearBalls,
    /// Flip a seat's "at table" flag.
    TogglePlaying(Seat),
    /// Choose manual or automatic detection.
    SetMode(DetectionMode),
    /// Flip between manual and automatic detection.
    ToggleMode,
    /// Bind a roster snapshot to a seat.
    BindPlayer {
        /// Seat to bind.
        seat: Seat,
        /// Snapshot copied from the roster.
        player: Player,
    },
    /// Switch between 9, 10 and 15-ball.
    SelectGameMode(GameMode),
    /// Flip the live flag.
    ToggleLive,
    /// Zero scores and clear the pocketed set.
    Reset,
    /// Balls currently visible on the table, as reported by the detection feed.
    Detection(BTreeSet<u8>),
}

/// 3-player ring game with playing flags and automatic ball detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingEngine {
    table: Table<3>,
    playing: [bool; 3],
    mode: DetectionMode,
    visible: Option<BTreeSet<u8>>,
}

impl RingEngine {
    /// Fresh ring game in manual mode.
    pub fn new(race_to: u32) -> Self {
        Self {
            table: Table::new(race_to),
            playing: [false; 3],
            mode: DetectionMode::Manual,
            visible: None,
        }
    }

    /// Shared scoreboard state.
    pub fn table(&self) -> &Table<3> {
        &self.table
    }

    /// "At table" flags per seat.
    pub fn playing(&self) -> &[bool; 3] {
        &self.playing
    }

    /// Active detection mode.
    pub fn mode(&self) -> DetectionMode {
        self.mode
    }

    /// Last visible set received from the detection feed.
    pub fn visible(&self) -> Option<&BTreeSet<u8>> {
        self.visible.as_ref()
    }

    /// Apply an event, returning whether anything changed.
    ///
    /// For [`RingEvent::Detection`] the result reports whether `pocketed`
    /// changed; a new visible set alone still bumps the version so clients
    /// see the update.
    pub fn apply(&mut self, event: RingEvent) -> Result<bool, InvalidTransition> {
        match event {
            RingEvent::AdjustScore { seat, delta } => self.table.adjust_score(seat, delta),
            RingEvent::SetRaceTo(race_to) => self.table.set_race_to(race_to),
            RingEvent::StepRaceTo(delta) => self.table.step_race_to(delta),
            RingEvent::ToggleBall(ball) => Ok(self.table.toggle_ball(ball)),
            RingEvent::ClearBalls => Ok(self.table.clear_balls()),
            RingEvent::TogglePlaying(seat) => {
                let index = self.table.seat_index(seat)?;
                self.playing[index] = !self.playing[index];
                self.table.touch();
                Ok(true)
            }
            RingEvent::SetMode(mode) => Ok(self.set_mode(mode)),
            RingEvent::ToggleMode => Ok(self.set_mode(self.mode.toggled())),
            RingEvent::BindPlayer { seat, player } => self.table.bind_player(seat, player),
            RingEvent::SelectGameMode(mode) => {
                let changed = self.table.select_game_mode(mode)?;
                if changed {
                    self.derive_pocketed();
                }
                Ok(changed)
            }
            RingEvent::ToggleLive => Ok(self.table.toggle_live()),
            RingEvent::Reset => Ok(self.table.reset()),
            RingEvent::Detection(visible) => {
                if self.visible.as_ref() != Some(&visible) {
                    self.visible = Some(visible);
                    self.table.touch();
                }
                Ok(self.derive_pocketed())
            }
        }
    }

    fn set_mode(&mut self, mode: DetectionMode) -> bool {
        if self.mode == mode {
            return false;
        }

        self.mode = mode;
        self.table.touch();
        self.derive_pocketed();
        true
    }

    /// Recompute `pocketed = rack - visible` when automatic mode is active and
    /// a detection has been received.
    fn derive_pocketed(&mut self) -> bool {
        if self.mode != DetectionMode::Automatic {
            return false;
        }
        let Some(visible) = self.visible.as_ref() else {
            return false;
        };

        let derived = derive_pocketed(self.table.game_mode(), visible);
        self.table.replace_pocketed(derived)
    }
}

impl From<RingBlob> for RingEngine {
    fn from(blob: RingBlob) -> Self {
        Self {
            table: Table::restore(
                [blob.player1, blob.player2, blob.player3],
                [blob.p1_score, blob.p2_score, blob.p3_score],
                blob.race_to,
                blob.game_mode,
                blob.pocketed.into_iter().collect(),
            ),
            playing: [blob.p1_playing, blob.p2_playing, blob.p3_playing],
            mode: blob.detection_mode,
            visible: None,
        }
    }
}

impl From<&RingEngine> for RingBlob {
    fn from(engine: &RingEngine) -> Self {
        let table = engine.table();
        let [player1, player2, player3] = table.players().clone();
        let [p1_score, p2_score, p3_score] = *table.scores();
        let [p1_playing, p2_playing, p3_playing] = *engine.playing();
        Self {
            player1,
            player2,
            player3,
            p1_score,
            p2_score,
            p3_score,
            race_to: table.race_to(),
            game_mode: table.game_mode(),
            p1_playing,
            p2_playing,
            p3_playing,
            pocketed: table.pocketed().iter().copied().collect(),
            detection_mode: engine.mode(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn automatic() -> RingEngine {
        let mut engine = RingEngine::new(7);
        engine.apply(RingEvent::SetMode(DetectionMode::Automatic)).unwrap();
        engine
    }

    #[test]
    fn detection_derives_pocketed_in_automatic_mode() {
        let mut engine = automatic();
        engine
            .apply(RingEvent::Detection(BTreeSet::from([2, 5, 9])))
            .unwrap();
        assert_eq!(
            engine.table().pocketed(),
            &BTreeSet::from([1, 3, 4, 6, 7, 8])
        );
    }

    #[test]
    fn detection_is_stored_but_ignored_in_manual_mode() {
        let mut engine = RingEngine::new(7);
        engine.apply(RingEvent::ToggleBall(4)).unwrap();
        assert_eq!(
            engine.apply(RingEvent::Detection(BTreeSet::from([1, 2]))),
            Ok(false)
        );
        assert_eq!(engine.table().pocketed(), &BTreeSet::from([4]));

        engine.apply(RingEvent::ToggleMode).unwrap();
        assert_eq!(
            engine.table().pocketed(),
            &BTreeSet::from([3, 4, 5, 6, 7, 8, 9])
        );
    }

    #[test]
    fn new_visible_set_bumps_version_even_in_manual_mode() {
        let mut engine = RingEngine::new(7);
        let before = engine.table().version();

        engine
            .apply(RingEvent::Detection(BTreeSet::from([3, 4])))
            .unwrap();
        let after = engine.table().version();
        assert!(after > before);
        assert!(engine.table().pocketed().is_empty());

        engine
            .apply(RingEvent::Detection(BTreeSet::from([3, 4])))
            .unwrap();
        assert_eq!(engine.table().version(), after);
    }

    #[test]
    fn manual_override_lasts_until_next_detection() {
        let mut engine = automatic();
        engine
            .apply(RingEvent::Detection(BTreeSet::from([1, 2, 3, 4, 5, 6, 7, 8, 9])))
            .unwrap();
        assert!(engine.table().pocketed().is_empty());

        engine.apply(RingEvent::ToggleBall(6)).unwrap();
        assert_eq!(engine.table().pocketed(), &BTreeSet::from([6]));

        engine
            .apply(RingEvent::Detection(BTreeSet::from([1, 2, 3, 4, 5, 6, 7, 8, 9])))
            .unwrap();
        assert!(engine.table().pocketed().is_empty());
    }

    #[test]
    fn automatic_mode_without_detection_keeps_pocketed() {
        let mut engine = RingEngine::new(7);
        engine.apply(RingEvent::ToggleBall(2)).unwrap();
        engine.apply(RingEvent::ToggleMode).unwrap();
        assert_eq!(engine.mode(), DetectionMode::Automatic);
        assert_eq!(engine.table().pocketed(), &BTreeSet::from([2]));
    }

    #[test]
    fn game_mode_change_recomputes_from_last_detection() {
        let mut engine = automatic();
        engine
            .apply(RingEvent::Detection(BTreeSet::from([1, 2, 3, 4, 5, 6, 7, 8, 9])))
            .unwrap();
        engine
            .apply(RingEvent::SelectGameMode(GameMode::TenBall))
            .unwrap();
        assert_eq!(engine.table().pocketed(), &BTreeSet::from([10]));

        engine
            .apply(RingEvent::SelectGameMode(GameMode::FifteenBall))
            .unwrap();
        assert!(engine.table().pocketed().is_empty());
    }

    #[test]
    fn playing_flags_do_not_gate_scoring() {
        let mut engine = RingEngine::new(7);
        engine.apply(RingEvent::TogglePlaying(Seat::Three)).unwrap();
        assert_eq!(engine.playing(), &[false, false, true]);

        engine
            .apply(RingEvent::AdjustScore {
                seat: Seat::One,
                delta: 1,
            })
            .unwrap();
        assert_eq!(engine.table().scores(), &[1, 0, 0]);
    }

    #[test]
    fn reset_keeps_mode_and_flags() {
        let mut engine = automatic();
        engine.apply(RingEvent::TogglePlaying(Seat::Two)).unwrap();
        engine
            .apply(RingEvent::Detection(BTreeSet::from([9])))
            .unwrap();
        engine
            .apply(RingEvent::AdjustScore {
                seat: Seat::Three,
                delta: 7,
            })
            .unwrap();
        assert_eq!(engine.table().winner(), Some(Seat::Three));

        engine.apply(RingEvent::Reset).unwrap();
        assert_eq!(engine.table().scores(), &[0, 0, 0]);
        assert!(engine.table().pocketed().is_empty());
        assert_eq!(engine.mode(), DetectionMode::Automatic);
        assert_eq!(engine.playing(), &[false, true, false]);
    }

    #[test]
    fn blob_round_trip_keeps_flags_and_mode() {
        let mut engine = automatic();
        engine.apply(RingEvent::TogglePlaying(Seat::One)).unwrap();
        engine
            .apply(RingEvent::Detection(BTreeSet::from([1, 2, 3])))
            .unwrap();

        let restored = RingEngine::from(RingBlob::from(&engine));
        assert_eq!(restored.playing(), &[true, false, false]);
        assert_eq!(restored.mode(), DetectionMode::Automatic);
        assert_eq!(restored.table().pocketed(), engine.table().pocketed());
        assert!(restored.visible().is_none());
    }
}
