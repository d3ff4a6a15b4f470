use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::state::{player::Player, rack::GameMode};

/// Lowest accepted race target.
pub const MIN_RACE_TO: u32 = 1;
/// Highest accepted race target.
pub const MAX_RACE_TO: u32 = 50;

/// Seat at a table; the 2-player match only uses the first two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Seat {
    /// First seat (left side of the scoreboard).
    #[serde(rename = "player1")]
    One,
    /// Second seat.
    #[serde(rename = "player2")]
    Two,
    /// Third seat (ring game only).
    #[serde(rename = "player3")]
    Three,
}

impl Seat {
    /// Every seat in scoreboard order.
    pub const ALL: [Seat; 3] = [Seat::One, Seat::Two, Seat::Three];

    /// Zero-based position of the seat.
    pub fn index(self) -> usize {
        match self {
            Seat::One => 0,
            Seat::Two => 1,
            Seat::Three => 2,
        }
    }

    /// One-based seat number as shown to players.
    pub fn number(self) -> usize {
        self.index() + 1
    }
}

static SEAT_ORDER: [Seat; 3] = Seat::ALL;

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player{}", self.number())
    }
}

/// Lifecycle of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TablePhase {
    /// Scores are being tracked.
    InProgress,
    /// A seat reached the race target; terminal until reset.
    Complete {
        /// Seat that reached the race target first.
        winner: Seat,
    },
}

/// Reasons an event is refused by a table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTransition {
    /// The seat does not exist at this table.
    #[error("{0} has no seat at this table")]
    NoSuchSeat(Seat),
    /// The match is over and only a reset can change the given field.
    #[error("match is complete; reset it before changing the {0}")]
    MatchComplete(&'static str),
    /// The rack cannot be switched while the table is live.
    #[error("game mode cannot change while the table is live")]
    LiveGameModeChange,
}

/// Shared scoreboard core for a table with `SEATS` players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table<const SEATS: usize> {
    players: [Player; SEATS],
    scores: [u32; SEATS],
    race_to: u32,
    game_mode: GameMode,
    pocketed: BTreeSet<u8>,
    live: bool,
    phase: TablePhase,
    version: usize,
}

impl<const SEATS: usize> Table<SEATS> {
    /// Fresh table with placeholder players and zero scores.
    pub fn new(race_to: u32) -> Self {
        Self::restore(
            std::array::from_fn(|index| Player::placeholder(index + 1)),
            [0; SEATS],
            race_to,
            GameMode::default(),
            BTreeSet::new(),
        )
    }

    /// Rebuild a table from persisted values, enforcing every invariant.
    ///
    /// The race target is clamped, pocketed balls outside the rack are dropped
    /// and the phase is re-evaluated, so a stored finished match reopens
    /// complete.
    pub fn restore(
        players: [Player; SEATS],
        scores: [u32; SEATS],
        race_to: u32,
        game_mode: GameMode,
        mut pocketed: BTreeSet<u8>,
    ) -> Self {
        const { assert!(SEATS >= 2 && SEATS <= Seat::ALL.len()) };

        pocketed.retain(|ball| game_mode.contains(*ball));
        let mut table = Self {
            players,
            scores,
            race_to: clamp_race_to(i64::from(race_to)),
            game_mode,
            pocketed,
            live: false,
            phase: TablePhase::InProgress,
            version: 0,
        };
        table.evaluate_phase();
        table
    }

    /// Seats used by this table, in order.
    pub fn seats(&self) -> &'static [Seat] {
        &SEAT_ORDER[..SEATS]
    }

    /// Player snapshots bound to each seat.
    pub fn players(&self) -> &[Player; SEATS] {
        &self.players
    }

    /// Current scores, indexed like [`Table::seats`].
    pub fn scores(&self) -> &[u32; SEATS] {
        &self.scores
    }

    /// Race target.
    pub fn race_to(&self) -> u32 {
        self.race_to
    }

    /// Selected game mode.
    pub fn game_mode(&self) -> GameMode {
        self.game_mode
    }

    /// Pocketed balls, always a subset of the active rack.
    pub fn pocketed(&self) -> &BTreeSet<u8> {
        &self.pocketed
    }

    /// Whether the table is flagged as broadcasting live.
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> TablePhase {
        self.phase
    }

    /// Counter bumped on every accepted change.
    pub fn version(&self) -> usize {
        self.version
    }

    /// Winning seat once the table is complete.
    pub fn winner(&self) -> Option<Seat> {
        match self.phase {
            TablePhase::Complete { winner } => Some(winner),
            TablePhase::InProgress => None,
        }
    }

    /// Whether a seat has reached the race target.
    pub fn is_complete(&self) -> bool {
        self.winner().is_some()
    }

    pub(crate) fn seat_index(&self, seat: Seat) -> Result<usize, InvalidTransition> {
        let index = seat.index();
        if index < SEATS {
            Ok(index)
        } else {
            Err(InvalidTransition::NoSuchSeat(seat))
        }
    }

    /// Add `delta` to a seat's score, flooring at zero.
    pub fn adjust_score(&mut self, seat: Seat, delta: i32) -> Result<bool, InvalidTransition> {
        let index = self.seat_index(seat)?;
        if self.is_complete() {
            return Err(InvalidTransition::MatchComplete("scores"));
        }

        let current = self.scores[index];
        let next = (i64::from(current) + i64::from(delta)).clamp(0, i64::from(u32::MAX)) as u32;
        if next == current {
            return Ok(false);
        }

        self.scores[index] = next;
        self.evaluate_phase();
        self.touch();
        Ok(true)
    }

    /// Set the race target, clamped to [`MIN_RACE_TO`]..=[`MAX_RACE_TO`].
    pub fn set_race_to(&mut self, race_to: i64) -> Result<bool, InvalidTransition> {
        if self.is_complete() {
            return Err(InvalidTransition::MatchComplete("race target"));
        }

        let next = clamp_race_to(race_to);
        if next == self.race_to {
            return Ok(false);
        }

        self.race_to = next;
        self.evaluate_phase();
        self.touch();
        Ok(true)
    }

    /// Move the race target by `delta`, clamped like [`Table::set_race_to`].
    pub fn step_race_to(&mut self, delta: i32) -> Result<bool, InvalidTransition> {
        self.set_race_to(i64::from(self.race_to) + i64::from(delta))
    }

    /// Flip membership of `ball`; balls outside the rack are ignored.
    pub fn toggle_ball(&mut self, ball: u8) -> bool {
        if !self.game_mode.contains(ball) {
            return false;
        }

        if !self.pocketed.remove(&ball) {
            self.pocketed.insert(ball);
        }
        self.touch();
        true
    }

    /// Empty the pocketed set.
    pub fn clear_balls(&mut self) -> bool {
        if self.pocketed.is_empty() {
            return false;
        }

        self.pocketed.clear();
        self.touch();
        true
    }

    /// Replace the pocketed set, keeping only balls of the active rack.
    pub fn replace_pocketed(&mut self, mut pocketed: BTreeSet<u8>) -> bool {
        pocketed.retain(|ball| self.game_mode.contains(*ball));
        if pocketed == self.pocketed {
            return false;
        }

        self.pocketed = pocketed;
        self.touch();
        true
    }

    /// Bind a player snapshot to a seat without touching scores.
    pub fn bind_player(&mut self, seat: Seat, player: Player) -> Result<bool, InvalidTransition> {
        let index = self.seat_index(seat)?;
        if self.players[index] == player {
            return Ok(false);
        }

        self.players[index] = player;
        self.touch();
        Ok(true)
    }

    /// Switch the game mode; pocketed balls outside the new rack are dropped.
    pub fn select_game_mode(&mut self, mode: GameMode) -> Result<bool, InvalidTransition> {
        if self.live {
            return Err(InvalidTransition::LiveGameModeChange);
        }
        if self.game_mode == mode {
            return Ok(false);
        }

        self.game_mode = mode;
        self.pocketed.retain(|ball| mode.contains(*ball));
        self.touch();
        Ok(true)
    }

    /// Flip the live flag.
    pub fn toggle_live(&mut self) -> bool {
        self.live = !self.live;
        self.touch();
        true
    }

    /// Zero the scores and empty the pocketed set; players, race target and
    /// game mode stay.
    pub fn reset(&mut self) -> bool {
        self.scores = [0; SEATS];
        self.pocketed.clear();
        self.phase = TablePhase::InProgress;
        self.touch();
        true
    }

    pub(crate) fn touch(&mut self) {
        self.version += 1;
    }

    /// Enter `Complete` when a seat reaches the race target. Seats are checked
    /// in order, so player 1 wins a simultaneous crossing.
    fn evaluate_phase(&mut self) {
        if self.is_complete() {
            return;
        }

        if let Some(index) = self.scores.iter().position(|score| *score >= self.race_to) {
            self.phase = TablePhase::Complete {
                winner: Seat::ALL[index],
            };
        }
    }
}

fn clamp_race_to(race_to: i64) -> u32 {
    race_to.clamp(i64::from(MIN_RACE_TO), i64::from(MAX_RACE_TO)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nine_ball(race_to: u32) -> Table<2> {
        Table::new(race_to)
    }

    #[test]
    fn new_table_is_in_progress_with_placeholders() {
        let table = nine_ball(9);
        assert_eq!(table.phase(), TablePhase::InProgress);
        assert_eq!(table.players()[1].name, "Player 2");
        assert_eq!(table.scores(), &[0, 0]);
        assert_eq!(table.seats(), &[Seat::One, Seat::Two]);
    }

    #[test]
    fn scores_never_drop_below_zero() {
        let mut table = nine_ball(9);
        assert_eq!(table.adjust_score(Seat::One, -1), Ok(false));
        table.adjust_score(Seat::One, 2).unwrap();
        table.adjust_score(Seat::One, -5).unwrap();
        assert_eq!(table.scores()[0], 0);
    }

    #[test]
    fn reaching_race_target_completes_and_freezes_scores() {
        let mut table = nine_ball(5);
        for _ in 0..4 {
            table.adjust_score(Seat::Two, 1).unwrap();
        }
        assert!(!table.is_complete());

        table.adjust_score(Seat::Two, 1).unwrap();
        assert_eq!(table.winner(), Some(Seat::Two));
        assert_eq!(
            table.adjust_score(Seat::One, 1),
            Err(InvalidTransition::MatchComplete("scores"))
        );
        assert_eq!(
            table.adjust_score(Seat::Two, -1),
            Err(InvalidTransition::MatchComplete("scores"))
        );
        assert!(table.set_race_to(20).is_err());
        assert_eq!(table.scores(), &[0, 5]);
    }

    #[test]
    fn simultaneous_crossing_favours_first_seat() {
        let table = Table::<3>::restore(
            std::array::from_fn(|i| Player::placeholder(i + 1)),
            [0, 7, 7],
            7,
            GameMode::NineBall,
            BTreeSet::new(),
        );
        assert_eq!(table.winner(), Some(Seat::Two));

        let mut table = nine_ball(9);
        table.adjust_score(Seat::One, 4).unwrap();
        table.adjust_score(Seat::Two, 4).unwrap();
        table.set_race_to(4).unwrap();
        assert_eq!(table.winner(), Some(Seat::One));
    }

    #[test]
    fn race_target_is_clamped() {
        let mut table = nine_ball(9);
        table.set_race_to(0).unwrap();
        assert_eq!(table.race_to(), MIN_RACE_TO);
        table.set_race_to(99).unwrap();
        assert_eq!(table.race_to(), MAX_RACE_TO);
        assert_eq!(table.step_race_to(1), Ok(false));
        assert_eq!(Table::<2>::new(0).race_to(), MIN_RACE_TO);
    }

    #[test]
    fn toggling_twice_restores_membership() {
        let mut table = nine_ball(9);
        assert!(table.toggle_ball(4));
        assert!(table.pocketed().contains(&4));
        assert!(table.toggle_ball(4));
        assert!(table.pocketed().is_empty());
    }

    #[test]
    fn toggling_outside_rack_is_ignored() {
        let mut table = nine_ball(9);
        let version = table.version();
        assert!(!table.toggle_ball(10));
        assert!(!table.toggle_ball(0));
        assert!(table.pocketed().is_empty());
        assert_eq!(table.version(), version);
    }

    #[test]
    fn reset_keeps_players_and_race_target() {
        let mut table = nine_ball(3);
        let siva = Player {
            id: "p-43".into(),
            name: "Siva".into(),
            points: 812,
            photo_url: None,
        };
        table.bind_player(Seat::One, siva.clone()).unwrap();
        table.toggle_ball(2);
        table.adjust_score(Seat::One, 3).unwrap();
        assert!(table.is_complete());

        table.reset();
        assert_eq!(table.phase(), TablePhase::InProgress);
        assert_eq!(table.scores(), &[0, 0]);
        assert!(table.pocketed().is_empty());
        assert_eq!(table.players()[0], siva);
        assert_eq!(table.race_to(), 3);
    }

    #[test]
    fn unknown_seat_is_refused() {
        let mut table = nine_ball(9);
        assert_eq!(
            table.adjust_score(Seat::Three, 1),
            Err(InvalidTransition::NoSuchSeat(Seat::Three))
        );
        assert!(table.bind_player(Seat::Three, Player::placeholder(3)).is_err());
    }

    #[test]
    fn game_mode_change_drops_balls_outside_new_rack() {
        let mut table = nine_ball(9);
        table.select_game_mode(GameMode::TenBall).unwrap();
        table.toggle_ball(10);
        table.toggle_ball(3);
        table.select_game_mode(GameMode::NineBall).unwrap();
        assert_eq!(table.pocketed(), &BTreeSet::from([3]));

        table.toggle_live();
        assert_eq!(
            table.select_game_mode(GameMode::FifteenBall),
            Err(InvalidTransition::LiveGameModeChange)
        );
    }

    #[test]
    fn restore_filters_pocketed_and_reopens_complete() {
        let table = Table::<2>::restore(
            [Player::placeholder(1), Player::placeholder(2)],
            [9, 3],
            9,
            GameMode::NineBall,
            BTreeSet::from([1, 12]),
        );
        assert_eq!(table.pocketed(), &BTreeSet::from([1]));
        assert_eq!(table.winner(), Some(Seat::One));
    }
}
