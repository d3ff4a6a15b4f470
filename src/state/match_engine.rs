use std::collections::BTreeSet;

use crate::{
    dao::models::MatchBlob,
    state::{
        player::Player,
        rack::GameMode,
        table::{InvalidTransition, Seat, Table},
    },
};

/// Events accepted by the 2-player match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEvent {
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
    /// Flip a ball in the pocketed set.
    ToggleBall(u8),
    /// Empty the pocketed set.
    ClearBalls,
    /// Mark whose turn it is, or nobody's.
    SetTurn(Option<Seat>),
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
}

/// 2-player match: the shared table plus a turn indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEngine {
    table: Table<2>,
    turn: Option<Seat>,
}

impl MatchEngine {
    /// Fresh match with placeholder players; player 1 breaks.
    pub fn new(race_to: u32) -> Self {
        Self {
            table: Table::new(race_to),
            turn: Some(Seat::One),
        }
    }

    /// Shared scoreboard state.
    pub fn table(&self) -> &Table<2> {
        &self.table
    }

    /// Seat whose turn it is.
    pub fn turn(&self) -> Option<Seat> {
        self.turn
    }

    /// Apply an event, returning whether anything changed.
    pub fn apply(&mut self, event: MatchEvent) -> Result<bool, InvalidTransition> {
        match event {
            MatchEvent::AdjustScore { seat, delta } => self.table.adjust_score(seat, delta),
            MatchEvent::SetRaceTo(race_to) => self.table.set_race_to(race_to),
            MatchEvent::StepRaceTo(delta) => self.table.step_race_to(delta),
            MatchEvent::ToggleBall(ball) => Ok(self.table.toggle_ball(ball)),
            MatchEvent::ClearBalls => Ok(self.table.clear_balls()),
            MatchEvent::SetTurn(turn) => self.set_turn(turn),
            MatchEvent::BindPlayer { seat, player } => self.table.bind_player(seat, player),
            MatchEvent::SelectGameMode(mode) => self.table.select_game_mode(mode),
            MatchEvent::ToggleLive => Ok(self.table.toggle_live()),
            MatchEvent::Reset => Ok(self.table.reset()),
        }
    }

    fn set_turn(&mut self, turn: Option<Seat>) -> Result<bool, InvalidTransition> {
        if let Some(seat) = turn {
            self.table.seat_index(seat)?;
        }
        if self.turn == turn {
            return Ok(false);
        }

        self.turn = turn;
        self.table.touch();
        Ok(true)
    }
}

impl From<MatchBlob> for MatchEngine {
    fn from(blob: MatchBlob) -> Self {
        Self {
            table: Table::restore(
                [blob.player1, blob.player2],
                [blob.player1_score, blob.player2_score],
                blob.race_to,
                blob.game_mode,
                blob.pocketed.into_iter().collect::<BTreeSet<_>>(),
            ),
            turn: Some(Seat::One),
        }
    }
}

impl From<&MatchEngine> for MatchBlob {
    fn from(engine: &MatchEngine) -> Self {
        let table = engine.table();
        let [player1, player2] = table.players().clone();
        let [player1_score, player2_score] = *table.scores();
        Self {
            player1,
            player2,
            player1_score,
            player2_score,
            race_to: table.race_to(),
            game_mode: table.game_mode(),
            pocketed: table.pocketed().iter().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_can_be_cleared_and_reassigned() {
        let mut engine = MatchEngine::new(9);
        assert_eq!(engine.turn(), Some(Seat::One));
        assert_eq!(engine.apply(MatchEvent::SetTurn(None)), Ok(true));
        assert_eq!(engine.turn(), None);
        assert_eq!(engine.apply(MatchEvent::SetTurn(Some(Seat::Two))), Ok(true));
        assert_eq!(engine.apply(MatchEvent::SetTurn(Some(Seat::Two))), Ok(false));
        assert_eq!(
            engine.apply(MatchEvent::SetTurn(Some(Seat::Three))),
            Err(InvalidTransition::NoSuchSeat(Seat::Three))
        );
    }

    #[test]
    fn race_to_five_completes_and_reset_reopens() {
        let mut engine = MatchEngine::new(5);
        for _ in 0..5 {
            engine
                .apply(MatchEvent::AdjustScore {
                    seat: Seat::One,
                    delta: 1,
                })
                .unwrap();
        }
        assert_eq!(engine.table().winner(), Some(Seat::One));
        assert!(
            engine
                .apply(MatchEvent::AdjustScore {
                    seat: Seat::Two,
                    delta: 1
                })
                .is_err()
        );

        engine.apply(MatchEvent::Reset).unwrap();
        assert!(!engine.table().is_complete());
        assert_eq!(engine.table().scores(), &[0, 0]);
        assert_eq!(engine.table().race_to(), 5);
    }

    #[test]
    fn bound_player_is_an_independent_snapshot() {
        let mut engine = MatchEngine::new(9);
        let mut roster_copy = Player {
            id: "p-12".into(),
            name: "Dennis".into(),
            points: 702,
            photo_url: None,
        };
        engine
            .apply(MatchEvent::BindPlayer {
                seat: Seat::Two,
                player: roster_copy.clone(),
            })
            .unwrap();

        roster_copy.name = "Dennis R.".into();
        assert_eq!(engine.table().players()[1].name, "Dennis");
    }

    #[test]
    fn blob_round_trip_keeps_scores_and_balls() {
        let mut engine = MatchEngine::new(9);
        engine.apply(MatchEvent::SelectGameMode(GameMode::TenBall)).unwrap();
        engine
            .apply(MatchEvent::AdjustScore {
                seat: Seat::Two,
                delta: 3,
            })
            .unwrap();
        engine.apply(MatchEvent::ToggleBall(10)).unwrap();
        engine.apply(MatchEvent::ToggleBall(1)).unwrap();
        engine.apply(MatchEvent::SetRaceTo(11)).unwrap();

        let restored = MatchEngine::from(MatchBlob::from(&engine));
        assert_eq!(restored.table().scores(), &[0, 3]);
        assert_eq!(restored.table().race_to(), 11);
        assert_eq!(restored.table().pocketed(), &BTreeSet::from([1, 10]));
        assert_eq!(restored.table().game_mode(), GameMode::TenBall);
    }
}
