use serde::Serialize;
use utoipa::ToSchema;

use crate::state::{
    match_engine::MatchEngine,
    player::Player,
    rack::GameMode,
    ring_engine::{DetectionMode, RingEngine},
    table::{Seat, Table, TablePhase},
};

/// Phase of a table as exposed to clients.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisiblePhase {
    /// Scores are still being tracked.
    InProgress,
    /// Someone reached the race target.
    Complete,
}

impl From<TablePhase> for VisiblePhase {
    fn from(value: TablePhase) -> Self {
        match value {
            TablePhase::InProgress => VisiblePhase::InProgress,
            TablePhase::Complete { .. } => VisiblePhase::Complete,
        }
    }
}

/// One seat on the scoreboard.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeatSnapshot {
    pub seat: Seat,
    pub player: Player,
    pub score: u32,
    /// "At table" flag; ring game only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playing: Option<bool>,
}

/// Terminal view of a finished table.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WinnerView {
    pub seat: Seat,
    pub winner: Player,
    pub score: u32,
    pub race_to: u32,
    /// "Defeated A" or "Defeated A & B".
    pub defeated: String,
    /// Final score line of every seat, winner included.
    pub seats: Vec<SeatSnapshot>,
}

/// Full 2-player match state.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MatchSnapshot {
    pub seats: Vec<SeatSnapshot>,
    pub turn: Option<Seat>,
    pub race_to: u32,
    pub game_mode: GameMode,
    /// Ball numbers of the active rack, in display order.
    pub rack: Vec<u8>,
    pub pocketed: Vec<u8>,
    pub live: bool,
    pub phase: VisiblePhase,
    pub winner: Option<WinnerView>,
    pub version: usize,
}

/// Full ring game state.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RingSnapshot {
    pub seats: Vec<SeatSnapshot>,
    pub race_to: u32,
    pub game_mode: GameMode,
    pub rack: Vec<u8>,
    pub pocketed: Vec<u8>,
    pub detection_mode: DetectionMode,
    /// Last visible set reported by the detection feed, if any arrived.
    pub visible: Option<Vec<u8>>,
    pub live: bool,
    pub phase: VisiblePhase,
    pub winner: Option<WinnerView>,
    pub version: usize,
}

impl From<&MatchEngine> for MatchSnapshot {
    fn from(engine: &MatchEngine) -> Self {
        let table = engine.table();
        let seats = seat_snapshots(table, None);
        Self {
            winner: winner_view(table, &seats),
            seats,
            turn: engine.turn(),
            race_to: table.race_to(),
            game_mode: table.game_mode(),
            rack: table.game_mode().rack().to_vec(),
            pocketed: table.pocketed().iter().copied().collect(),
            live: table.is_live(),
            phase: table.phase().into(),
            version: table.version(),
        }
    }
}

impl From<&RingEngine> for RingSnapshot {
    fn from(engine: &RingEngine) -> Self {
        let table = engine.table();
        let seats = seat_snapshots(table, Some(engine.playing()));
        Self {
            winner: winner_view(table, &seats),
            seats,
            race_to: table.race_to(),
            game_mode: table.game_mode(),
            rack: table.game_mode().rack().to_vec(),
            pocketed: table.pocketed().iter().copied().collect(),
            detection_mode: engine.mode(),
            visible: engine
                .visible()
                .map(|visible| visible.iter().copied().collect()),
            live: table.is_live(),
            phase: table.phase().into(),
            version: table.version(),
        }
    }
}

/// Winner view of a 2-player match, if it is over.
pub fn match_winner(engine: &MatchEngine) -> Option<WinnerView> {
    let table = engine.table();
    winner_view(table, &seat_snapshots(table, None))
}

/// Winner view of a ring game, if it is over.
pub fn ring_winner(engine: &RingEngine) -> Option<WinnerView> {
    let table = engine.table();
    winner_view(table, &seat_snapshots(table, Some(engine.playing())))
}

fn seat_snapshots<const SEATS: usize>(
    table: &Table<SEATS>,
    playing: Option<&[bool; SEATS]>,
) -> Vec<SeatSnapshot> {
    table
        .seats()
        .iter()
        .enumerate()
        .map(|(index, seat)| SeatSnapshot {
            seat: *seat,
            player: table.players()[index].clone(),
            score: table.scores()[index],
            playing: playing.map(|flags| flags[index]),
        })
        .collect()
}

fn winner_view<const SEATS: usize>(
    table: &Table<SEATS>,
    seats: &[SeatSnapshot],
) -> Option<WinnerView> {
    let winner_seat = table.winner()?;
    let winner = seats.iter().find(|entry| entry.seat == winner_seat)?;
    let losers: Vec<&str> = seats
        .iter()
        .filter(|entry| entry.seat != winner_seat)
        .map(|entry| entry.player.name.as_str())
        .collect();

    Some(WinnerView {
        seat: winner_seat,
        winner: winner.player.clone(),
        score: winner.score,
        race_to: table.race_to(),
        defeated: format!("Defeated {}", losers.join(" & ")),
        seats: seats.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{match_engine::MatchEvent, ring_engine::RingEvent};

    fn named(id: &str, name: &str) -> Player {
        Player {
            id: id.into(),
            name: name.into(),
            points: 700,
            photo_url: None,
        }
    }

    #[test]
    fn match_winner_names_the_single_opponent() {
        let mut engine = MatchEngine::new(3);
        engine
            .apply(MatchEvent::BindPlayer {
                seat: Seat::One,
                player: named("p-1", "Efren"),
            })
            .unwrap();
        engine
            .apply(MatchEvent::BindPlayer {
                seat: Seat::Two,
                player: named("p-2", "Django"),
            })
            .unwrap();
        assert!(match_winner(&engine).is_none());

        engine
            .apply(MatchEvent::AdjustScore {
                seat: Seat::Two,
                delta: 3,
            })
            .unwrap();

        let view = match_winner(&engine).unwrap();
        assert_eq!(view.seat, Seat::Two);
        assert_eq!(view.winner.name, "Django");
        assert_eq!(view.defeated, "Defeated Efren");
        assert_eq!(view.score, 3);

        let snapshot = MatchSnapshot::from(&engine);
        assert_eq!(snapshot.phase, VisiblePhase::Complete);
        assert_eq!(snapshot.winner, Some(view));
        assert!(snapshot.seats.iter().all(|seat| seat.playing.is_none()));
    }

    #[test]
    fn ring_winner_lists_both_opponents() {
        let mut engine = RingEngine::new(2);
        engine
            .apply(RingEvent::AdjustScore {
                seat: Seat::Three,
                delta: 2,
            })
            .unwrap();

        let view = ring_winner(&engine).unwrap();
        assert_eq!(view.defeated, "Defeated Player 1 & Player 2");
        assert_eq!(view.seats.len(), 3);
    }

    #[test]
    fn ring_snapshot_exposes_rack_and_flags() {
        let mut engine = RingEngine::new(7);
        engine.apply(RingEvent::TogglePlaying(Seat::Two)).unwrap();
        engine
            .apply(RingEvent::SelectGameMode(GameMode::TenBall))
            .unwrap();

        let snapshot = RingSnapshot::from(&engine);
        assert_eq!(snapshot.rack, (1..=10).collect::<Vec<u8>>());
        assert_eq!(snapshot.seats[1].playing, Some(true));
        assert_eq!(snapshot.visible, None);
        assert_eq!(snapshot.phase, VisiblePhase::InProgress);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["detectionMode"], "manual");
        assert_eq!(json["gameMode"], "10");
    }
}
