use tracing::{info, warn};

use crate::{
    config::AppConfig,
    dao::{
        models::{ROSTER_KEY, roster_from_value},
        persistence::{Persistence, PersistenceWriter},
    },
    dto::roster::{DEFAULT_NEW_PLAYER_POINTS, PlayerInput},
    error::ServiceError,
    services::sse_events,
    state::{SharedState, player::Player, roster::Roster},
};

/// Load the stored roster; an absent or unreadable one is replaced by the
/// seed list, which is written back right away.
pub async fn hydrate(
    persistence: &Persistence,
    writer: &PersistenceWriter,
    config: &AppConfig,
) -> Roster {
    if let Some(value) = persistence.load(ROSTER_KEY).await {
        match roster_from_value(&value) {
            Some(players) => return Roster::from_players(players),
            None => warn!("stored roster is not a list; reseeding"),
        }
    }

    let roster = Roster::seeded(config.roster_seed());
    info!(players = roster.list().len(), "seeded player roster");
    writer.enqueue(ROSTER_KEY, roster.list());
    roster
}

/// Players ranked by points.
pub async fn list(state: &SharedState) -> Vec<Player> {
    state.roster().read().await.list().to_vec()
}

/// Snapshot of one player, for binding into a seat.
pub async fn find(state: &SharedState, id: &str) -> Result<Player, ServiceError> {
    state
        .roster()
        .read()
        .await
        .find(id)
        .cloned()
        .ok_or_else(|| not_found(id))
}

/// Add a player; input is expected to be validated already.
pub async fn create(state: &SharedState, input: PlayerInput) -> Player {
    let mut roster = state.roster().write().await;
    let player = roster.create(
        input.name.trim().to_string(),
        input.points.unwrap_or(DEFAULT_NEW_PLAYER_POINTS),
        input.photo_url,
    );
    info!(id = %player.id, name = %player.name, "player created");
    publish(state, &roster);
    player
}

/// Replace a player's fields.
///
/// Unknown ids leave the roster untouched and report `NotFound`.
pub async fn update(
    state: &SharedState,
    id: &str,
    input: PlayerInput,
) -> Result<Player, ServiceError> {
    let mut roster = state.roster().write().await;
    let current_points = roster.find(id).map(|player| player.points);
    let player = roster
        .update(
            id,
            input.name.trim().to_string(),
            input
                .points
                .or(current_points)
                .unwrap_or(DEFAULT_NEW_PLAYER_POINTS),
            input.photo_url,
        )
        .ok_or_else(|| not_found(id))?;
    publish(state, &roster);
    Ok(player)
}

/// Remove a player. The caller must confirm explicitly.
pub async fn delete(state: &SharedState, id: &str, confirmed: bool) -> Result<(), ServiceError> {
    if !confirmed {
        return Err(ServiceError::InvalidInput(
            "deleting a player requires confirm=true".into(),
        ));
    }

    let mut roster = state.roster().write().await;
    if !roster.delete(id) {
        return Err(not_found(id));
    }
    info!(id, "player deleted");
    publish(state, &roster);
    Ok(())
}

/// Player picker: name-sorted, filtered by a case-insensitive substring.
pub async fn picker(state: &SharedState, search: &str) -> Vec<Player> {
    state.roster().read().await.search(search)
}

fn publish(state: &SharedState, roster: &Roster) {
    state.writer().enqueue(ROSTER_KEY, roster.list());
    sse_events::broadcast_roster_updated(state, roster.list());
}

fn not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("player `{id}` not found"))
}
