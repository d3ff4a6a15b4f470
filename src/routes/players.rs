use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use axum_valid::Valid;

use crate::{
    dto::roster::{DeleteQuery, PickerQuery, PlayerInput, RosterResponse},
    error::AppError,
    services::roster_service,
    state::{SharedState, player::Player},
};

/// Routes managing the player roster.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/players", get(list_players).post(create_player))
        .route("/players/picker", get(pick_players))
        .route("/players/{id}", put(update_player).delete(delete_player))
}

/// Roster ranked by points.
#[utoipa::path(
    get,
    path = "/players",
    tag = "players",
    responses((status = 200, description = "Ranked roster", body = RosterResponse))
)]
pub async fn list_players(State(state): State<SharedState>) -> Json<RosterResponse> {
    Json(RosterResponse {
        players: roster_service::list(&state).await,
    })
}

/// Add a player.
#[utoipa::path(
    post,
    path = "/players",
    tag = "players",
    request_body = PlayerInput,
    responses(
        (status = 201, description = "Player created", body = Player),
        (status = 400, description = "Invalid name or photo")
    )
)]
pub async fn create_player(
    State(state): State<SharedState>,
    Valid(Json(input)): Valid<Json<PlayerInput>>,
) -> (StatusCode, Json<Player>) {
    let player = roster_service::create(&state, input).await;
    (StatusCode::CREATED, Json(player))
}

/// Edit a player.
#[utoipa::path(
    put,
    path = "/players/{id}",
    tag = "players",
    params(("id" = String, Path, description = "Player identifier")),
    request_body = PlayerInput,
    responses(
        (status = 200, description = "Player updated", body = Player),
        (status = 404, description = "Unknown player")
    )
)]
pub async fn update_player(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(input)): Valid<Json<PlayerInput>>,
) -> Result<Json<Player>, AppError> {
    let player = roster_service::update(&state, &id, input).await?;
    Ok(Json(player))
}

/// Remove a player; requires `?confirm=true`.
#[utoipa::path(
    delete,
    path = "/players/{id}",
    tag = "players",
    params(("id" = String, Path, description = "Player identifier"), DeleteQuery),
    responses(
        (status = 204, description = "Player deleted"),
        (status = 400, description = "Deletion not confirmed"),
        (status = 404, description = "Unknown player")
    )
)]
pub async fn delete_player(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<StatusCode, AppError> {
    roster_service::delete(&state, &id, query.confirm).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Player picker: name-sorted search over the roster.
#[utoipa::path(
    get,
    path = "/players/picker",
    tag = "players",
    params(PickerQuery),
    responses((status = 200, description = "Matching players", body = RosterResponse))
)]
pub async fn pick_players(
    State(state): State<SharedState>,
    Query(query): Query<PickerQuery>,
) -> Json<RosterResponse> {
    Json(RosterResponse {
        players: roster_service::picker(&state, &query.search).await,
    })
}
