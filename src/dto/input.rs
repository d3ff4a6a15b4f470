use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::state::{
    match_engine::MatchEvent,
    rack::GameMode,
    ring_engine::{DetectionMode, RingEvent},
    table::Seat,
};

/// Discrete scoreboard command posted by a control surface.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TableCommand {
    /// Add a signed delta to a seat's score.
    AdjustScore { seat: Seat, delta: i32 },
    /// Set the race target; out-of-range values are clamped.
    SetRaceTo {
        #[serde(rename = "raceTo")]
        race_to: i64,
    },
    /// Move the race target by a signed step.
    StepRaceTo { delta: i32 },
    /// Flip a ball in the pocketed set.
    ToggleBall { ball: u8 },
    /// Empty the pocketed set.
    ClearBalls,
    /// Set or clear the turn indicator (match only).
    SetTurn { seat: Option<Seat> },
    /// Flip a seat's "at table" flag (ring only).
    TogglePlaying { seat: Seat },
    /// Choose the detection mode (ring only).
    SetMode { mode: DetectionMode },
    /// Flip the detection mode (ring only).
    ToggleMode,
    /// Switch rack.
    SelectGameMode {
        #[serde(rename = "gameMode")]
        game_mode: GameMode,
    },
    /// Flip the live flag.
    ToggleLive,
    /// Zero the scores and clear the pocketed set.
    Reset,
}

/// Command that the addressed table does not understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("`{command}` is not supported by the {table}")]
pub struct UnsupportedCommand {
    /// Command tag.
    pub command: &'static str,
    /// Table that refused it.
    pub table: &'static str,
}

impl TryFrom<TableCommand> for MatchEvent {
    type Error = UnsupportedCommand;

    fn try_from(command: TableCommand) -> Result<Self, Self::Error> {
        let unsupported = |command| UnsupportedCommand {
            command,
            table: "match",
        };
        Ok(match command {
            TableCommand::AdjustScore { seat, delta } => MatchEvent::AdjustScore { seat, delta },
            TableCommand::SetRaceTo { race_to } => MatchEvent::SetRaceTo(race_to),
            TableCommand::StepRaceTo { delta } => MatchEvent::StepRaceTo(delta),
            TableCommand::ToggleBall { ball } => MatchEvent::ToggleBall(ball),
            TableCommand::ClearBalls => MatchEvent::ClearBalls,
            TableCommand::SetTurn { seat } => MatchEvent::SetTurn(seat),
            TableCommand::SelectGameMode { game_mode } => MatchEvent::SelectGameMode(game_mode),
            TableCommand::ToggleLive => MatchEvent::ToggleLive,
            TableCommand::Reset => MatchEvent::Reset,
            TableCommand::TogglePlaying { .. } => return Err(unsupported("togglePlaying")),
            TableCommand::SetMode { .. } => return Err(unsupported("setMode")),
            TableCommand::ToggleMode => return Err(unsupported("toggleMode")),
        })
    }
}

impl TryFrom<TableCommand> for RingEvent {
    type Error = UnsupportedCommand;

    fn try_from(command: TableCommand) -> Result<Self, Self::Error> {
        Ok(match command {
            TableCommand::AdjustScore { seat, delta } => RingEvent::AdjustScore { seat, delta },
            TableCommand::SetRaceTo { race_to } => RingEvent::SetRaceTo(race_to),
            TableCommand::StepRaceTo { delta } => RingEvent::StepRaceTo(delta),
            TableCommand::ToggleBall { ball } => RingEvent::ToggleBall(ball),
            TableCommand::ClearBalls => RingEvent::ClearBalls,
            TableCommand::TogglePlaying { seat } => RingEvent::TogglePlaying(seat),
            TableCommand::SetMode { mode } => RingEvent::SetMode(mode),
            TableCommand::ToggleMode => RingEvent::ToggleMode,
            TableCommand::SelectGameMode { game_mode } => RingEvent::SelectGameMode(game_mode),
            TableCommand::ToggleLive => RingEvent::ToggleLive,
            TableCommand::Reset => RingEvent::Reset,
            TableCommand::SetTurn { .. } => {
                return Err(UnsupportedCommand {
                    command: "setTurn",
                    table: "ring game",
                });
            }
        })
    }
}

/// Key press forwarded from a scoreboard page.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyPress {
    /// `KeyboardEvent.key` value, e.g. `q`, `0`, `Backspace`.
    pub key: String,
    /// Whether a text input had focus; shortcuts are ignored when it did.
    #[serde(default)]
    pub text_input_focused: bool,
}

/// Outcome of a key press or pointer click.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InputResponse {
    /// The input mapped to a shortcut.
    pub handled: bool,
    /// The table state changed.
    pub changed: bool,
    /// Table version after the input.
    pub version: usize,
}

/// Mouse button of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    /// Left click: +1.
    Primary,
    /// Right click: -1.
    Secondary,
}

impl PointerButton {
    /// Step applied by this button.
    pub fn delta(self) -> i32 {
        match self {
            PointerButton::Primary => 1,
            PointerButton::Secondary => -1,
        }
    }
}

/// Element a pointer event landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerTarget {
    /// A seat's score.
    Score { seat: Seat },
    /// The race target badge.
    RaceTo,
}

/// Click on a scoreboard element.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct PointerRequest {
    pub target: PointerTarget,
    pub button: PointerButton,
}

/// Roster player to copy into a seat.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BindPlayerRequest {
    pub player_id: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn commands_decode_from_tagged_json() {
        let command: TableCommand =
            serde_json::from_value(json!({"type": "adjustScore", "seat": "player2", "delta": -1}))
                .unwrap();
        assert_eq!(
            command,
            TableCommand::AdjustScore {
                seat: Seat::Two,
                delta: -1
            }
        );

        let command: TableCommand =
            serde_json::from_value(json!({"type": "selectGameMode", "gameMode": "15"})).unwrap();
        assert_eq!(
            command,
            TableCommand::SelectGameMode {
                game_mode: GameMode::FifteenBall
            }
        );

        let command: TableCommand =
            serde_json::from_value(json!({"type": "setTurn", "seat": null})).unwrap();
        assert_eq!(command, TableCommand::SetTurn { seat: None });
    }

    #[test]
    fn ring_only_commands_are_refused_by_the_match() {
        let err = MatchEvent::try_from(TableCommand::ToggleMode).unwrap_err();
        assert_eq!(err.command, "toggleMode");
        assert!(RingEvent::try_from(TableCommand::SetTurn { seat: None }).is_err());
        assert_eq!(
            RingEvent::try_from(TableCommand::TogglePlaying { seat: Seat::Three }),
            Ok(RingEvent::TogglePlaying(Seat::Three))
        );
    }

    #[test]
    fn pointer_requests_decode() {
        let request: PointerRequest = serde_json::from_value(json!({
            "target": {"kind": "score", "seat": "player1"},
            "button": "secondary"
        }))
        .unwrap();
        assert_eq!(request.target, PointerTarget::Score { seat: Seat::One });
        assert_eq!(request.button.delta(), -1);

        let key: KeyPress = serde_json::from_value(json!({"key": "q"})).unwrap();
        assert!(!key.text_input_focused);
    }
}
