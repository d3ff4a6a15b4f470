use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::detection::{DetectionAccepted, DetectionDocument},
    services::detection_service,
    state::SharedState,
};

/// Routes feeding the detection bridge.
pub fn router() -> Router<SharedState> {
    Router::new().route("/detections", post(push_detection))
}

/// Push the balls currently visible on the ring table.
#[utoipa::path(
    post,
    path = "/detections",
    tag = "detection",
    request_body = DetectionDocument,
    responses((status = 202, description = "Detection forwarded", body = DetectionAccepted))
)]
pub async fn push_detection(
    State(state): State<SharedState>,
    Json(document): Json<DetectionDocument>,
) -> (axum::http::StatusCode, Json<DetectionAccepted>) {
    let visible = document.visible();
    let delivered = detection_service::push(&state, visible.clone()).await;
    (
        axum::http::StatusCode::ACCEPTED,
        Json(DetectionAccepted {
            visible: visible.into_iter().collect(),
            delivered,
        }),
    )
}
