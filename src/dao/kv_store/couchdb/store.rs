use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use tracing::debug;

use crate::dao::{kv_store::KeyValueStore, storage::StorageResult};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::BlobDocument,
};

/// Key-value store keeping one CouchDB document per key.
#[derive(Clone)]
pub struct CouchStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchStore {
    /// Establish a connection to CouchDB and ensure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let base_url = Arc::<str>::from(config.base_url.trim_end_matches('/'));
        let database = Arc::<str>::from(config.database);
        let auth = config
            .username
            .zip(config.password)
            .map(|(u, p)| (Arc::<str>::from(u), Arc::<str>::from(p)));

        let store = Self {
            client,
            base_url,
            database,
            auth,
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn database_url(&self) -> String {
        format!("{}/{}", self.base_url, self.database)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.database_url(), path);
        self.authorize(self.client.request(method, url))
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some((ref user, ref pass)) = self.auth {
            builder.basic_auth(user.as_ref(), Some(pass.as_ref()))
        } else {
            builder
        }
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let url = self.database_url();

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::DatabaseQuery {
                database: database.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                debug!(database = %database, "creating CouchDB database");
                let create = self
                    .authorize(self.client.put(&url))
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::DatabaseCreate {
                        database: database.clone(),
                        source,
                    })?;
                if create.status().is_success() {
                    Ok(())
                } else {
                    Err(CouchDaoError::DatabaseStatus {
                        database,
                        status: create.status(),
                    })
                }
            }
            other => Err(CouchDaoError::DatabaseStatus {
                database,
                status: other,
            }),
        }
    }

    async fn get_document(&self, doc_id: &str) -> CouchResult<Option<BlobDocument>> {
        let response = self
            .request(Method::GET, doc_id)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<BlobDocument>()
                .await
                .map(Some)
                .map_err(|source| CouchDaoError::DecodeResponse {
                    path: doc_id.to_string(),
                    source,
                }),
            other => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    async fn put_document(&self, document: &BlobDocument) -> CouchResult<()> {
        let response = self
            .request(Method::PUT, &document.id)
            .json(document)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: document.id.clone(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::RequestStatus {
                path: document.id.clone(),
                status: response.status(),
            })
        }
    }
}

impl KeyValueStore for CouchStore {
    fn get(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<Vec<u8>>>> {
        let store = self.clone();
        let key = key.to_string();
        Box::pin(async move {
            let Some(doc) = store.get_document(&key).await? else {
                return Ok(None);
            };
            let bytes = serde_json::to_vec(&doc.value).map_err(|source| {
                CouchDaoError::EncodeValue {
                    path: key.clone(),
                    source,
                }
            })?;
            Ok(Some(bytes))
        })
    }

    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        let key = key.to_string();
        Box::pin(async move {
            let value = serde_json::from_slice(&value).map_err(|source| {
                CouchDaoError::EncodeValue {
                    path: key.clone(),
                    source,
                }
            })?;
            let rev = store
                .get_document(&key)
                .await?
                .and_then(|existing| existing.rev);
            let doc = BlobDocument::new(&key, value, rev);
            store.put_document(&doc).await.map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let url = store.database_url();
            let response = store
                .authorize(store.client.get(&url))
                .send()
                .await
                .map_err(|source| CouchDaoError::RequestSend {
                    path: url.clone(),
                    source,
                })?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(CouchDaoError::RequestStatus {
                    path: url,
                    status: response.status(),
                }
                .into())
            }
        })
    }

    fn backend(&self) -> &'static str {
        "couchdb"
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    use axum::{
        Json, Router,
        extract::{Path, State},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::get,
    };
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;

    /// Just enough of CouchDB: one database, revisioned documents.
    #[derive(Default)]
    struct FakeCouch {
        created: bool,
        creations: usize,
        next_rev: usize,
        docs: HashMap<String, Value>,
    }

    type Shared = Arc<Mutex<FakeCouch>>;

    async fn get_database(State(couch): State<Shared>) -> StatusCode {
        if couch.lock().unwrap().created {
            StatusCode::OK
        } else {
            StatusCode::NOT_FOUND
        }
    }

    async fn put_database(State(couch): State<Shared>) -> StatusCode {
        let mut couch = couch.lock().unwrap();
        couch.created = true;
        couch.creations += 1;
        StatusCode::CREATED
    }

    async fn get_doc(State(couch): State<Shared>, Path((_, id)): Path<(String, String)>) -> Response {
        match couch.lock().unwrap().docs.get(&id) {
            Some(doc) => Json(doc.clone()).into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn put_doc(
        State(couch): State<Shared>,
        Path((_, id)): Path<(String, String)>,
        Json(mut body): Json<Value>,
    ) -> Response {
        let mut couch = couch.lock().unwrap();
        let current = couch.docs.get(&id).map(|doc| doc["_rev"].clone());
        if current.as_ref() != body.get("_rev") {
            return StatusCode::CONFLICT.into_response();
        }

        couch.next_rev += 1;
        let rev = format!("{}-fake", couch.next_rev);
        body["_rev"] = json!(rev);
        couch.docs.insert(id.clone(), body);
        (StatusCode::CREATED, Json(json!({ "ok": true, "id": id, "rev": rev }))).into_response()
    }

    async fn spawn_fake() -> (String, Shared) {
        let couch = Shared::default();
        let app = Router::new()
            .route("/{db}", get(get_database).put(put_database))
            .route("/{db}/{id}", get(get_doc).put(put_doc))
            .with_state(couch.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app.into_make_service()).await.unwrap();
        });
        (format!("http://{addr}/"), couch)
    }

    #[tokio::test]
    async fn connect_creates_missing_database_once() {
        let (url, couch) = spawn_fake().await;

        CouchStore::connect(CouchConfig::new(url.clone(), "barako"))
            .await
            .unwrap();
        CouchStore::connect(CouchConfig::new(url, "barako"))
            .await
            .unwrap();

        let couch = couch.lock().unwrap();
        assert!(couch.created);
        assert_eq!(couch.creations, 1);
    }

    #[tokio::test]
    async fn overwrite_carries_revision_forward() {
        let (url, couch) = spawn_fake().await;
        let store = CouchStore::connect(CouchConfig::new(url, "barako"))
            .await
            .unwrap();

        assert_eq!(store.get("barako-match-state").await.unwrap(), None);
        store
            .set("barako-match-state", br#"{"raceTo":9}"#.to_vec())
            .await
            .unwrap();
        store
            .set("barako-match-state", br#"{"raceTo":11}"#.to_vec())
            .await
            .unwrap();

        let stored = store.get("barako-match-state").await.unwrap().unwrap();
        let value: Value = serde_json::from_slice(&stored).unwrap();
        assert_eq!(value, json!({ "raceTo": 11 }));
        assert_eq!(
            couch.lock().unwrap().docs["barako-match-state"]["_rev"],
            "2-fake"
        );
        store.health_check().await.unwrap();
    }
}
