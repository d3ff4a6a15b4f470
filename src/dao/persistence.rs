use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::dao::{
    kv_store::KeyValueStore,
    storage::{StorageError, StorageResult},
};

/// Fail-soft JSON layer over a [`KeyValueStore`].
#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn KeyValueStore>,
}

impl Persistence {
    /// Wrap a backend.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Backend this adapter writes to.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Read and parse the blob stored under `key`.
    ///
    /// Missing keys, unreadable backends and malformed text all read as
    /// `None`; the failure is logged and never reaches the caller.
    pub async fn load(&self, key: &str) -> Option<Value> {
        let bytes = match self.store.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(err) => {
                warn!(key, error = %err, "failed to read stored state; using defaults");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "discarding malformed stored state");
                None
            }
        }
    }

    /// Serialize `value` and overwrite the blob under `key`.
    pub async fn save<T>(&self, key: &str, value: &T) -> StorageResult<()>
    where
        T: Serialize + ?Sized,
    {
        let bytes = encode(key, value)?;
        self.store.set(key, bytes).await
    }
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> StorageResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })
}

enum WriteCommand {
    Save { key: String, bytes: Vec<u8> },
    Flush(oneshot::Sender<()>),
}

/// Fire-and-forget writer: saves are queued and applied in order by a single
/// background task, so a later snapshot of a key can never be overwritten by
/// an earlier one.
#[derive(Clone)]
pub struct PersistenceWriter {
    tx: mpsc::UnboundedSender<WriteCommand>,
}

impl PersistenceWriter {
    /// Spawn the writer task on the current runtime.
    pub fn spawn(persistence: Persistence) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    WriteCommand::Save { key, bytes } => {
                        if let Err(err) = persistence.store.set(&key, bytes).await {
                            warn!(key = %key, error = %err, "failed to persist state");
                        }
                    }
                    WriteCommand::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            debug!("persistence writer stopped");
        });
        Self { tx }
    }

    /// Queue a full snapshot of `value` under `key`.
    pub fn enqueue<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let bytes = match encode(key, value) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(key, error = %err, "dropping unserializable snapshot");
                return;
            }
        };

        let command = WriteCommand::Save {
            key: key.to_string(),
            bytes,
        };
        if self.tx.send(command).is_err() {
            warn!(key, "persistence writer is gone; snapshot dropped");
        }
    }

    /// Wait until every save queued before this call has been attempted.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(WriteCommand::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}
