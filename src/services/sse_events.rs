use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        roster::RosterResponse,
        scoreboard::{MatchSnapshot, RingSnapshot, WinnerView},
        sse::ServerEvent,
    },
    state::{SharedState, player::Player},
};

const EVENT_MATCH_UPDATED: &str = "match.updated";
const EVENT_MATCH_WINNER: &str = "match.winner";
const EVENT_RING_UPDATED: &str = "ring.updated";
const EVENT_RING_WINNER: &str = "ring.winner";
const EVENT_ROSTER_UPDATED: &str = "roster.updated";

/// Broadcast the full 2-player match state.
pub fn broadcast_match_updated(state: &SharedState, snapshot: &MatchSnapshot) {
    send_public_event(state, EVENT_MATCH_UPDATED, snapshot);
}

/// Broadcast that the 2-player match just ended.
pub fn broadcast_match_winner(state: &SharedState, winner: &WinnerView) {
    send_public_event(state, EVENT_MATCH_WINNER, winner);
}

/// Broadcast the full ring game state.
pub fn broadcast_ring_updated(state: &SharedState, snapshot: &RingSnapshot) {
    send_public_event(state, EVENT_RING_UPDATED, snapshot);
}

/// Broadcast that the ring game just ended.
pub fn broadcast_ring_winner(state: &SharedState, winner: &WinnerView) {
    send_public_event(state, EVENT_RING_WINNER, winner);
}

/// Broadcast the ranked roster after any change.
pub fn broadcast_roster_updated(state: &SharedState, players: &[Player]) {
    let payload = RosterResponse {
        players: players.to_vec(),
    };
    send_public_event(state, EVENT_ROSTER_UPDATED, &payload);
}

fn send_public_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.public_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize public SSE payload"),
    }
}
