use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};

use crate::{
    dto::{
        input::{BindPlayerRequest, InputResponse, KeyPress, PointerRequest, TableCommand},
        scoreboard::{RingSnapshot, WinnerView},
    },
    error::AppError,
    services::ring_service,
    state::{SharedState, table::Seat},
};

/// Routes driving the 3-player ring game.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/ring", get(get_ring))
        .route("/ring/events", post(post_event))
        .route("/ring/keys", post(post_key))
        .route("/ring/pointer", post(post_pointer))
        .route("/ring/players/{seat}", put(bind_player))
        .route("/ring/reset", post(reset_ring))
        .route("/ring/winner", get(get_winner))
}

/// Current ring game state.
#[utoipa::path(
    get,
    path = "/ring",
    tag = "ring",
    responses((status = 200, description = "Ring state", body = RingSnapshot))
)]
pub async fn get_ring(State(state): State<SharedState>) -> Json<RingSnapshot> {
    Json(ring_service::snapshot(&state).await)
}

/// Apply a scoreboard command.
#[utoipa::path(
    post,
    path = "/ring/events",
    tag = "ring",
    request_body = TableCommand,
    responses(
        (status = 200, description = "Command applied", body = RingSnapshot),
        (status = 400, description = "Command not supported by the ring game"),
        (status = 409, description = "Refused in the current state")
    )
)]
pub async fn post_event(
    State(state): State<SharedState>,
    Json(command): Json<TableCommand>,
) -> Result<Json<RingSnapshot>, AppError> {
    let snapshot = ring_service::apply_command(&state, command).await?;
    Ok(Json(snapshot))
}

/// Forward a key press.
#[utoipa::path(
    post,
    path = "/ring/keys",
    tag = "ring",
    request_body = KeyPress,
    responses((status = 200, description = "Key processed", body = InputResponse))
)]
pub async fn post_key(
    State(state): State<SharedState>,
    Json(key): Json<KeyPress>,
) -> Json<InputResponse> {
    Json(ring_service::handle_key(&state, key).await)
}

/// Forward a click on a score or on the race target.
#[utoipa::path(
    post,
    path = "/ring/pointer",
    tag = "ring",
    request_body = PointerRequest,
    responses((status = 200, description = "Click processed", body = InputResponse))
)]
pub async fn post_pointer(
    State(state): State<SharedState>,
    Json(request): Json<PointerRequest>,
) -> Json<InputResponse> {
    Json(ring_service::handle_pointer(&state, request).await)
}

/// Seat a roster player.
#[utoipa::path(
    put,
    path = "/ring/players/{seat}",
    tag = "ring",
    params(("seat" = Seat, Path, description = "`player1`, `player2` or `player3`")),
    request_body = BindPlayerRequest,
    responses(
        (status = 200, description = "Player seated", body = RingSnapshot),
        (status = 404, description = "Unknown player")
    )
)]
pub async fn bind_player(
    State(state): State<SharedState>,
    Path(seat): Path<Seat>,
    Json(request): Json<BindPlayerRequest>,
) -> Result<Json<RingSnapshot>, AppError> {
    let snapshot = ring_service::bind_player(&state, seat, &request.player_id).await?;
    Ok(Json(snapshot))
}

/// Zero the scores and clear the pocketed balls.
#[utoipa::path(
    post,
    path = "/ring/reset",
    tag = "ring",
    responses((status = 200, description = "Ring game reset", body = RingSnapshot))
)]
pub async fn reset_ring(State(state): State<SharedState>) -> Result<Json<RingSnapshot>, AppError> {
    Ok(Json(ring_service::reset(&state).await?))
}

/// Winner of the finished ring game.
#[utoipa::path(
    get,
    path = "/ring/winner",
    tag = "ring",
    responses(
        (status = 200, description = "Ring game is over", body = WinnerView),
        (status = 404, description = "Ring game still in progress")
    )
)]
pub async fn get_winner(State(state): State<SharedState>) -> Result<Json<WinnerView>, AppError> {
    Ok(Json(ring_service::winner(&state).await?))
}
