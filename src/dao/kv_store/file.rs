use std::{
    io::ErrorKind,
    path::PathBuf,
    sync::Arc,
};

use futures::future::BoxFuture;
use tokio::fs;

use crate::dao::{
    kv_store::KeyValueStore,
    storage::{StorageError, StorageResult},
};

/// Stores each key as `<key>.json` inside a data directory.
#[derive(Clone)]
pub struct FileStore {
    root: Arc<PathBuf>,
}

impl FileStore {
    /// Store rooted at `root`; the directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::new(root.into()),
        }
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<Vec<u8>>>> {
        let path = self.path_for(key);
        Box::pin(async move {
            let path = path?;
            match fs::read(&path).await {
                Ok(bytes) => Ok(Some(bytes)),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(StorageError::unavailable(
                    format!("failed to read {}", path.display()),
                    err,
                )),
            }
        })
    }

    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'static, StorageResult<()>> {
        let root = self.root.clone();
        let path = self.path_for(key);
        let key = key.to_string();
        Box::pin(async move {
            let path = path?;
            fs::create_dir_all(root.as_path()).await.map_err(|err| {
                StorageError::unavailable(format!("failed to create {}", root.display()), err)
            })?;

            // Write beside the target and rename so readers never see half a blob.
            let staging = root.join(format!(".{key}.json.tmp"));
            fs::write(&staging, &value).await.map_err(|err| {
                StorageError::unavailable(format!("failed to write {}", staging.display()), err)
            })?;
            fs::rename(&staging, &path).await.map_err(|err| {
                StorageError::unavailable(format!("failed to replace {}", path.display()), err)
            })
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let root = self.root.clone();
        Box::pin(async move {
            fs::create_dir_all(root.as_path()).await.map_err(|err| {
                StorageError::unavailable(format!("data directory {} unusable", root.display()), err)
            })
        })
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}
