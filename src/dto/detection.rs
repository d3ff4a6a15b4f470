use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Detection document as published by the camera pipeline.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectionDocument {
    /// Ball numbers currently visible on the table.
    #[serde(default)]
    pub detected_balls: Vec<i64>,
}

impl DetectionDocument {
    /// Visible set restricted to plausible ball numbers (1..=15).
    pub fn visible(&self) -> BTreeSet<u8> {
        self.detected_balls
            .iter()
            .filter_map(|ball| u8::try_from(*ball).ok())
            .filter(|ball| (1..=15).contains(ball))
            .collect()
    }
}

/// Acknowledgement of a pushed detection.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectionAccepted {
    /// Sanitized visible set that was forwarded.
    pub visible: Vec<u8>,
    /// Whether a bridge was listening for it.
    pub delivered: bool,
}
