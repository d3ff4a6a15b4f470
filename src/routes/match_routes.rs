use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};

use crate::{
    dto::{
        input::{BindPlayerRequest, InputResponse, KeyPress, PointerRequest, TableCommand},
        scoreboard::{MatchSnapshot, WinnerView},
    },
    error::AppError,
    services::match_service,
    state::{SharedState, table::Seat},
};

/// Routes driving the 2-player match.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/match", get(get_match))
        .route("/match/events", post(post_event))
        .route("/match/keys", post(post_key))
        .route("/match/pointer", post(post_pointer))
        .route("/match/players/{seat}", put(bind_player))
        .route("/match/reset", post(reset_match))
        .route("/match/winner", get(get_winner))
}

/// Current match state.
#[utoipa::path(
    get,
    path = "/match",
    tag = "match",
    responses((status = 200, description = "Match state", body = MatchSnapshot))
)]
pub async fn get_match(State(state): State<SharedState>) -> Json<MatchSnapshot> {
    Json(match_service::snapshot(&state).await)
}

/// Apply a scoreboard command.
#[utoipa::path(
    post,
    path = "/match/events",
    tag = "match",
    request_body = TableCommand,
    responses(
        (status = 200, description = "Command applied", body = MatchSnapshot),
        (status = 400, description = "Command not supported by the match"),
        (status = 409, description = "Refused in the current state")
    )
)]
pub async fn post_event(
    State(state): State<SharedState>,
    Json(command): Json<TableCommand>,
) -> Result<Json<MatchSnapshot>, AppError> {
    let snapshot = match_service::apply_command(&state, command).await?;
    Ok(Json(snapshot))
}

/// Forward a key press.
#[utoipa::path(
    post,
    path = "/match/keys",
    tag = "match",
    request_body = KeyPress,
    responses((status = 200, description = "Key processed", body = InputResponse))
)]
pub async fn post_key(
    State(state): State<SharedState>,
    Json(key): Json<KeyPress>,
) -> Json<InputResponse> {
    Json(match_service::handle_key(&state, key).await)
}

/// Forward a click on a score or on the race target.
#[utoipa::path(
    post,
    path = "/match/pointer",
    tag = "match",
    request_body = PointerRequest,
    responses((status = 200, description = "Click processed", body = InputResponse))
)]
pub async fn post_pointer(
    State(state): State<SharedState>,
    Json(request): Json<PointerRequest>,
) -> Json<InputResponse> {
    Json(match_service::handle_pointer(&state, request).await)
}

/// Seat a roster player.
#[utoipa::path(
    put,
    path = "/match/players/{seat}",
    tag = "match",
    params(("seat" = Seat, Path, description = "`player1` or `player2`")),
    request_body = BindPlayerRequest,
    responses(
        (status = 200, description = "Player seated", body = MatchSnapshot),
        (status = 404, description = "Unknown player")
    )
)]
pub async fn bind_player(
    State(state): State<SharedState>,
    Path(seat): Path<Seat>,
    Json(request): Json<BindPlayerRequest>,
) -> Result<Json<MatchSnapshot>, AppError> {
    let snapshot = match_service::bind_player(&state, seat, &request.player_id).await?;
    Ok(Json(snapshot))
}

/// Zero the scores and clear the pocketed balls.
#[utoipa::path(
    post,
    path = "/match/reset",
    tag = "match",
    responses((status = 200, description = "Match reset", body = MatchSnapshot))
)]
pub async fn reset_match(State(state): State<SharedState>) -> Result<Json<MatchSnapshot>, AppError> {
    Ok(Json(match_service::reset(&state).await?))
}

/// Winner of the finished match.
#[utoipa::path(
    get,
    path = "/match/winner",
    tag = "match",
    responses(
        (status = 200, description = "Match is over", body = WinnerView),
        (status = 404, description = "Match still in progress")
    )
)]
pub async fn get_winner(State(state): State<SharedState>) -> Result<Json<WinnerView>, AppError> {
    Ok(Json(match_service::winner(&state).await?))
}
