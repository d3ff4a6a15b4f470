use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::{
    config::AppConfig,
    dao::{
        models::{RING_STATE_KEY, RingBlob},
        persistence::Persistence,
    },
    dto::{
        input::{InputResponse, KeyPress, PointerRequest, PointerTarget, TableCommand},
        scoreboard::{RingSnapshot, WinnerView, ring_winner},
    },
    error::ServiceError,
    services::{keymap, roster_service, sse_events},
    state::{
        SharedState,
        ring_engine::{RingEngine, RingEvent},
        table::{InvalidTransition, Seat},
    },
};

/// Restore the ring game from storage, or start a fresh one.
pub async fn hydrate(persistence: &Persistence, config: &AppConfig) -> RingEngine {
    match persistence.load(RING_STATE_KEY).await {
        Some(value) => {
            let engine = RingEngine::from(RingBlob::from_value(&value, config.ring_race_to()));
            debug!(
                scores = ?engine.table().scores(),
                mode = ?engine.mode(),
                "restored ring state"
            );
            engine
        }
        None => RingEngine::new(config.ring_race_to()),
    }
}

/// Current ring state.
pub async fn snapshot(state: &SharedState) -> RingSnapshot {
    let engine = state.ring_engine().read().await;
    RingSnapshot::from(&*engine)
}

/// Apply one event, flushing and broadcasting the new state when it changed.
pub async fn apply_event(
    state: &SharedState,
    event: RingEvent,
) -> Result<RingSnapshot, ServiceError> {
    let (_, snapshot) = mutate(state, event).await?;
    Ok(snapshot)
}

/// Apply a command posted by a control surface.
pub async fn apply_command(
    state: &SharedState,
    command: TableCommand,
) -> Result<RingSnapshot, ServiceError> {
    let event = RingEvent::try_from(command)?;
    apply_event(state, event).await
}

/// Translate a key press into an event, like the match page does.
pub async fn handle_key(state: &SharedState, key: KeyPress) -> InputResponse {
    let event = if key.text_input_focused {
        None
    } else {
        keymap::ring_key(&key.key)
    };

    match event {
        Some(event) => run_input(state, event).await,
        None => InputResponse {
            handled: false,
            changed: false,
            version: state.ring_engine().read().await.table().version(),
        },
    }
}

/// Left click adds one, right click removes one.
pub async fn handle_pointer(state: &SharedState, request: PointerRequest) -> InputResponse {
    let delta = request.button.delta();
    let event = match request.target {
        PointerTarget::Score { seat } => RingEvent::AdjustScore { seat, delta },
        PointerTarget::RaceTo => RingEvent::StepRaceTo(delta),
    };
    run_input(state, event).await
}

/// Copy a roster player into a seat.
pub async fn bind_player(
    state: &SharedState,
    seat: Seat,
    player_id: &str,
) -> Result<RingSnapshot, ServiceError> {
    let player = roster_service::find(state, player_id).await?;
    apply_event(state, RingEvent::BindPlayer { seat, player }).await
}

/// Winner presentation's reset action.
pub async fn reset(state: &SharedState) -> Result<RingSnapshot, ServiceError> {
    apply_event(state, RingEvent::Reset).await
}

/// Winner of a finished ring game.
pub async fn winner(state: &SharedState) -> Result<WinnerView, ServiceError> {
    let engine = state.ring_engine().read().await;
    ring_winner(&engine).ok_or_else(|| ServiceError::NotFound("ring game is still in progress".into()))
}

/// Feed a visible set from the detection bridge.
///
/// The set is always remembered; `pocketed` only follows it in automatic
/// mode. Returns whether anything observable changed.
pub async fn apply_detection(state: &SharedState, visible: BTreeSet<u8>) -> bool {
    let mut engine = state.ring_engine().write().await;
    let visible_changed = engine.visible() != Some(&visible);
    let was_complete = engine.table().is_complete();

    let changed = match engine.apply(RingEvent::Detection(visible)) {
        Ok(changed) => changed,
        Err(err) => {
            debug!(error = %err, "detection update refused");
            false
        }
    };

    if changed {
        publish(state, &engine, was_complete);
    } else if visible_changed {
        sse_events::broadcast_ring_updated(state, &RingSnapshot::from(&*engine));
    }
    changed || visible_changed
}

async fn run_input(state: &SharedState, event: RingEvent) -> InputResponse {
    match mutate(state, event).await {
        Ok((changed, snapshot)) => InputResponse {
            handled: true,
            changed,
            version: snapshot.version,
        },
        Err(err) => {
            debug!(error = %err, "ignoring refused ring input");
            InputResponse {
                handled: true,
                changed: false,
                version: state.ring_engine().read().await.table().version(),
            }
        }
    }
}

async fn mutate(
    state: &SharedState,
    event: RingEvent,
) -> Result<(bool, RingSnapshot), InvalidTransition> {
    let mut engine = state.ring_engine().write().await;
    let was_complete = engine.table().is_complete();
    let changed = engine.apply(event)?;
    let snapshot = if changed {
        publish(state, &engine, was_complete)
    } else {
        RingSnapshot::from(&*engine)
    };
    Ok((changed, snapshot))
}

/// Flush and broadcast; callers hold the write lock so writes land in order.
fn publish(state: &SharedState, engine: &RingEngine, was_complete: bool) -> RingSnapshot {
    let snapshot = RingSnapshot::from(engine);
    state.writer().enqueue(RING_STATE_KEY, &RingBlob::from(engine));
    sse_events::broadcast_ring_updated(state, &snapshot);
    if let (false, Some(winner)) = (was_complete, snapshot.winner.as_ref()) {
        info!(seat = %winner.seat, player = %winner.winner.name, "ring game won");
        sse_events::broadcast_ring_winner(state, winner);
    }
    snapshot
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        dao::kv_store::{KeyValueStore, MemoryStore},
        dto::input::PointerButton,
        state::{AppState, rack::GameMode, ring_engine::DetectionMode},
    };

    async fn fresh_state() -> (SharedState, Arc<dyn KeyValueStore>) {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let state = AppState::hydrate(AppConfig::default(), store.clone()).await;
        (state, store)
    }

    fn key(key: &str) -> KeyPress {
        KeyPress {
            key: key.into(),
            text_input_focused: false,
        }
    }

    #[tokio::test]
    async fn keys_cover_scores_flags_balls_and_race() {
        let (state, _) = fresh_state().await;
        for k in ["w", "w", "s", "x", "3", "0", "+", "+", "-"] {
            assert!(handle_key(&state, key(k)).await.handled, "{k}");
        }

        let snapshot = snapshot(&state).await;
        assert_eq!(snapshot.seats[1].score, 1);
        assert_eq!(snapshot.seats[1].playing, Some(true));
        assert_eq!(snapshot.race_to, 8);
        // ball 10 is outside the 9-ball rack
        assert_eq!(snapshot.pocketed, [3]);

        handle_key(&state, key("Delete")).await;
        assert!(snapshot_pocketed(&state).await.is_empty());
    }

    async fn snapshot_pocketed(state: &SharedState) -> Vec<u8> {
        snapshot(state).await.pocketed
    }

    #[tokio::test]
    async fn detection_drives_pocketed_only_in_automatic_mode() {
        let (state, _) = fresh_state().await;

        assert!(apply_detection(&state, BTreeSet::from([2, 5, 9])).await);
        assert!(snapshot_pocketed(&state).await.is_empty());

        handle_key(&state, key("m")).await;
        let snapshot = snapshot(&state).await;
        assert_eq!(snapshot.detection_mode, DetectionMode::Automatic);
        assert_eq!(snapshot.pocketed, [1, 3, 4, 6, 7, 8]);

        assert!(!apply_detection(&state, BTreeSet::from([2, 5, 9])).await);
    }

    #[tokio::test]
    async fn manual_mode_detection_broadcasts_a_newer_version() {
        let (state, _) = fresh_state().await;
        let before = snapshot(&state).await.version;
        let mut events = state.public_sse().subscribe();

        assert!(apply_detection(&state, BTreeSet::from([1, 2])).await);

        let event = events.try_recv().unwrap();
        assert_eq!(event.event.as_deref(), Some("ring.updated"));
        let current = snapshot(&state).await;
        assert!(current.version > before);
        assert_eq!(current.visible, Some(vec![1, 2]));
    }

    #[tokio::test]
    async fn pointer_on_race_badge_steps_target() {
        let (state, _) = fresh_state().await;
        let request = PointerRequest {
            target: PointerTarget::RaceTo,
            button: PointerButton::Primary,
        };
        assert!(handle_pointer(&state, request).await.changed);
        assert_eq!(snapshot(&state).await.race_to, 8);
    }

    #[tokio::test]
    async fn live_table_refuses_rack_change() {
        let (state, _) = fresh_state().await;
        apply_command(&state, TableCommand::ToggleLive).await.unwrap();

        let err = apply_command(
            &state,
            TableCommand::SelectGameMode {
                game_mode: GameMode::TenBall,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn winner_reports_both_defeated_players() {
        let (state, _) = fresh_state().await;
        apply_event(
            &state,
            RingEvent::AdjustScore {
                seat: Seat::Two,
                delta: 7,
            },
        )
        .await
        .unwrap();

        let view = winner(&state).await.unwrap();
        assert_eq!(view.defeated, "Defeated Player 1 & Player 3");
    }

    #[tokio::test]
    async fn flags_and_mode_survive_rehydration() {
        let (state, store) = fresh_state().await;
        handle_key(&state, key("z")).await;
        handle_key(&state, key("m")).await;
        handle_key(&state, key("e")).await;
        state.shutdown().await;

        let reloaded = AppState::hydrate(AppConfig::default(), store).await;
        let snapshot = snapshot(&reloaded).await;
        assert_eq!(snapshot.seats[0].playing, Some(true));
        assert_eq!(snapshot.seats[2].score, 1);
        assert_eq!(snapshot.detection_mode, DetectionMode::Automatic);
        assert_eq!(snapshot.visible, None);
    }
}
