use axum::Router;

use crate::state::SharedState;

pub mod detection;
pub mod docs;
pub mod health;
pub mod match_routes;
pub mod players;
pub mod ring_routes;
pub mod sse;

/// Every scoreboard route plus the Swagger UI, bound to the shared state.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(match_routes::router())
        .merge(ring_routes::router())
        .merge(players::router())
        .merge(detection::router())
        .merge(docs::router());

    api_router.with_state(state)
}
