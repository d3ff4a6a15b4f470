//! Keyboard shortcuts of the scoreboard pages.
//!
//! Letter keys are matched case-insensitively; named keys (`Delete`,
//! `Backspace`) are matched exactly as the browser reports them.

use crate::state::{match_engine::MatchEvent, ring_engine::RingEvent, table::Seat};

/// Map a key of the 2-player page to an event.
pub fn match_key(key: &str) -> Option<MatchEvent> {
    let event = match normalize(key)?.as_str() {
        "q" => score(Seat::One, 1),
        "a" => score(Seat::One, -1),
        "e" => score(Seat::Two, 1),
        "d" => score(Seat::Two, -1),
        "z" => MatchEvent::SetTurn(Some(Seat::One)),
        "c" => MatchEvent::SetTurn(Some(Seat::Two)),
        "x" => MatchEvent::SetTurn(None),
        _ => return None,
    };
    Some(event)
}

/// Map a key of the ring page to an event.
pub fn ring_key(key: &str) -> Option<RingEvent> {
    let adjust = |seat, delta| RingEvent::AdjustScore { seat, delta };
    let event = match normalize(key)?.as_str() {
        "q" => adjust(Seat::One, 1),
        "a" => adjust(Seat::One, -1),
        "w" => adjust(Seat::Two, 1),
        "s" => adjust(Seat::Two, -1),
        "e" => adjust(Seat::Three, 1),
        "d" => adjust(Seat::Three, -1),
        "z" => RingEvent::TogglePlaying(Seat::One),
        "x" => RingEvent::TogglePlaying(Seat::Two),
        "c" => RingEvent::TogglePlaying(Seat::Three),
        "+" | "=" => RingEvent::StepRaceTo(1),
        "-" | "_" => RingEvent::StepRaceTo(-1),
        "Delete" | "Backspace" => RingEvent::ClearBalls,
        "m" => RingEvent::ToggleMode,
        "0" => RingEvent::ToggleBall(10),
        digit @ ("1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9") => {
            RingEvent::ToggleBall(digit.parse().ok()?)
        }
        _ => return None,
    };
    Some(event)
}

fn score(seat: Seat, delta: i32) -> MatchEvent {
    MatchEvent::AdjustScore { seat, delta }
}

/// Lowercase single characters, keep named keys verbatim.
fn normalize(key: &str) -> Option<String> {
    let mut chars = key.chars();
    let first = chars.next()?;
    if chars.next().is_none() {
        Some(first.to_lowercase().collect())
    } else {
        Some(key.to_string())
    }
}
