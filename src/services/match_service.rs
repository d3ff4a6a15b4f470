use tracing::{debug, info};

use crate::{
    config::AppConfig,
    dao::{
        models::{MATCH_STATE_KEY, MatchBlob},
        persistence::Persistence,
    },
    dto::{
        input::{InputResponse, KeyPress, PointerRequest, PointerTarget, TableCommand},
        scoreboard::{MatchSnapshot, WinnerView, match_winner},
    },
    error::ServiceError,
    services::{keymap, roster_service, sse_events},
    state::{
        SharedState,
        match_engine::{MatchEngine, MatchEvent},
        table::{InvalidTransition, Seat},
    },
};

/// Restore the match from storage, or start a fresh one.
pub async fn hydrate(persistence: &Persistence, config: &AppConfig) -> MatchEngine {
    match persistence.load(MATCH_STATE_KEY).await {
        Some(value) => {
            let engine = MatchEngine::from(MatchBlob::from_value(&value, config.match_race_to()));
            debug!(
                scores = ?engine.table().scores(),
                race_to = engine.table().race_to(),
                "restored match state"
            );
            engine
        }
        None => MatchEngine::new(config.match_race_to()),
    }
}

/// Current match state.
pub async fn snapshot(state: &SharedState) -> MatchSnapshot {
    let engine = state.match_engine().read().await;
    MatchSnapshot::from(&*engine)
}

/// Apply one event, flushing and broadcasting the new state when it changed.
pub async fn apply_event(
    state: &SharedState,
    event: MatchEvent,
) -> Result<MatchSnapshot, ServiceError> {
    let (_, snapshot) = mutate(state, event).await?;
    Ok(snapshot)
}

/// Apply a command posted by a control surface.
pub async fn apply_command(
    state: &SharedState,
    command: TableCommand,
) -> Result<MatchSnapshot, ServiceError> {
    let event = MatchEvent::try_from(command)?;
    apply_event(state, event).await
}

/// Translate a key press into an event.
///
/// Unmapped keys and keys typed into a text field are reported as not
/// handled; refused transitions are silently ignored.
pub async fn handle_key(state: &SharedState, key: KeyPress) -> InputResponse {
    let event = if key.text_input_focused {
        None
    } else {
        keymap::match_key(&key.key)
    };

    match event {
        Some(event) => run_input(state, event).await,
        None => InputResponse {
            handled: false,
            changed: false,
            version: state.match_engine().read().await.table().version(),
        },
    }
}

/// Left click adds one, right click removes one.
pub async fn handle_pointer(state: &SharedState, request: PointerRequest) -> InputResponse {
    let delta = request.button.delta();
    let event = match request.target {
        PointerTarget::Score { seat } => MatchEvent::AdjustScore { seat, delta },
        PointerTarget::RaceTo => MatchEvent::StepRaceTo(delta),
    };
    run_input(state, event).await
}

/// Copy a roster player into a seat.
pub async fn bind_player(
    state: &SharedState,
    seat: Seat,
    player_id: &str,
) -> Result<MatchSnapshot, ServiceError> {
    let player = roster_service::find(state, player_id).await?;
    apply_event(state, MatchEvent::BindPlayer { seat, player }).await
}

/// Winner presentation's reset action.
pub async fn reset(state: &SharedState) -> Result<MatchSnapshot, ServiceError> {
    apply_event(state, MatchEvent::Reset).await
}

/// Winner of a finished match.
pub async fn winner(state: &SharedState) -> Result<WinnerView, ServiceError> {
    let engine = state.match_engine().read().await;
    match_winner(&engine).ok_or_else(|| ServiceError::NotFound("match is still in progress".into()))
}

async fn run_input(state: &SharedState, event: MatchEvent) -> InputResponse {
    match mutate(state, event).await {
        Ok((changed, snapshot)) => InputResponse {
            handled: true,
            changed,
            version: snapshot.version,
        },
        Err(err) => {
            debug!(error = %err, "ignoring refused match input");
            InputResponse {
                handled: true,
                changed: false,
                version: state.match_engine().read().await.table().version(),
            }
        }
    }
}

async fn mutate(
    state: &SharedState,
    event: MatchEvent,
) -> Result<(bool, MatchSnapshot), InvalidTransition> {
    let mut engine = state.match_engine().write().await;
    let was_complete = engine.table().is_complete();
    let changed = engine.apply(event)?;
    let snapshot = MatchSnapshot::from(&*engine);

    // Flush and broadcast while the lock is held so writes land in version order.
    if changed {
        state
            .writer()
            .enqueue(MATCH_STATE_KEY, &MatchBlob::from(&*engine));
        sse_events::broadcast_match_updated(state, &snapshot);
        if let (false, Some(winner)) = (was_complete, snapshot.winner.as_ref()) {
            info!(seat = %winner.seat, player = %winner.winner.name, "match won");
            sse_events::broadcast_match_winner(state, winner);
        }
    }

    Ok((changed, snapshot))
}
