pub mod detection;
pub mod match_engine;
pub mod player;
pub mod rack;
pub mod ring_engine;
pub mod roster;
mod sse;
pub mod table;

use std::{collections::BTreeSet, sync::Arc};

use tokio::sync::{Mutex, RwLock, mpsc};
use tracing::info;

use crate::{
    config::AppConfig,
    dao::{
        kv_store::KeyValueStore,
        persistence::{Persistence, PersistenceWriter},
    },
    services::{match_service, ring_service, roster_service},
    state::{
        detection::DetectionHandle, match_engine::MatchEngine, ring_engine::RingEngine,
        roster::Roster,
    },
};

pub use self::sse::SseHub;

/// Handle shared by every route and background task.
pub type SharedState = Arc<AppState>;

const PUBLIC_SSE_CAPACITY: usize = 64;

/// Central application state: hydrated engines, the roster and the handles
/// of every background task that feeds them.
pub struct AppState {
    config: AppConfig,
    persistence: Persistence,
    writer: PersistenceWriter,
    match_engine: RwLock<MatchEngine>,
    ring_engine: RwLock<RingEngine>,
    roster: RwLock<Roster>,
    public_sse: SseHub,
    detection_push: Mutex<Option<mpsc::UnboundedSender<BTreeSet<u8>>>>,
    detection_handles: Mutex<Vec<DetectionHandle>>,
}

impl AppState {
    /// Load every stored blob and return a ready state.
    ///
    /// Nothing can mutate the engines before this returns, so hydration can
    /// never be raced by an early event overwriting stored data with defaults.
    pub async fn hydrate(config: AppConfig, store: Arc<dyn KeyValueStore>) -> SharedState {
        let backend = store.backend();
        let persistence = Persistence::new(store);
        let writer = PersistenceWriter::spawn(persistence.clone());

        let match_engine = match_service::hydrate(&persistence, &config).await;
        let ring_engine = ring_service::hydrate(&persistence, &config).await;
        let roster = roster_service::hydrate(&persistence, &writer, &config).await;

        info!(
            backend,
            players = roster.list().len(),
            "scoreboard state hydrated"
        );

        Arc::new(Self {
            config,
            persistence,
            writer,
            match_engine: RwLock::new(match_engine),
            ring_engine: RwLock::new(ring_engine),
            roster: RwLock::new(roster),
            public_sse: SseHub::new(PUBLIC_SSE_CAPACITY),
            detection_push: Mutex::new(None),
            detection_handles: Mutex::new(Vec::new()),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Fail-soft persistence adapter.
    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    /// Ordered background writer used for every state flush.
    pub fn writer(&self) -> &PersistenceWriter {
        &self.writer
    }

    /// The 2-player match.
    pub fn match_engine(&self) -> &RwLock<MatchEngine> {
        &self.match_engine
    }

    /// The 3-player ring game.
    pub fn ring_engine(&self) -> &RwLock<RingEngine> {
        &self.ring_engine
    }

    /// The player roster.
    pub fn roster(&self) -> &RwLock<Roster> {
        &self.roster
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        &self.public_sse
    }

    /// Sender feeding the push detection source, once the bridge is started.
    pub fn detection_push(&self) -> &Mutex<Option<mpsc::UnboundedSender<BTreeSet<u8>>>> {
        &self.detection_push
    }

    /// Running detection subscriptions.
    pub fn detection_handles(&self) -> &Mutex<Vec<DetectionHandle>> {
        &self.detection_handles
    }

    /// Stop the detection bridges and wait for queued writes to land.
    pub async fn shutdown(&self) {
        self.detection_push.lock().await.take();
        let handles: Vec<DetectionHandle> = self.detection_handles.lock().await.drain(..).collect();
        for handle in handles {
            info!(source = handle.source(), "stopping detection bridge");
            handle.unsubscribe();
        }
        self.writer.flush().await;
        info!("scoreboard state flushed");
    }
}
