use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the storage backend; a failing backend reports `degraded` while the
/// scoreboard keeps running on its in-memory state.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let store = state.persistence().store();
    match store.health_check().await {
        Ok(()) => HealthResponse::ok(store.backend()),
        Err(err) => {
            warn!(backend = store.backend(), error = %err, "storage health check failed");
            HealthResponse::degraded(store.backend())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dto::health::HealthStatus,
        dao::kv_store::{KeyValueStore, MemoryStore},
        state::AppState,
    };

    #[tokio::test]
    async fn memory_backend_is_healthy() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let state = AppState::hydrate(AppConfig::default(), store).await;

        let health = health_status(&state).await;
        assert_eq!(health.status, HealthStatus::Ok);
        assert_eq!(health.storage, "memory");
    }
}
