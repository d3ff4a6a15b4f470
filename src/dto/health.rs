use serde::Serialize;
use utoipa::ToSchema;

/// Overall status reported by `/healthcheck`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Storage answered its probe.
    Ok,
    /// Storage is failing; the scoreboards keep running from memory.
    Degraded,
}

/// Body of the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Ok or degraded.
    pub status: HealthStatus,
    /// Storage backend in use (`file`, `memory` or `couchdb`).
    pub storage: &'static str,
}

impl HealthResponse {
    /// Storage probe succeeded.
    pub fn ok(storage: &'static str) -> Self {
        Self {
            status: HealthStatus::Ok,
            storage,
        }
    }

    /// Storage probe failed.
    pub fn degraded(storage: &'static str) -> Self {
        Self {
            status: HealthStatus::Degraded,
            storage,
        }
    }
}
