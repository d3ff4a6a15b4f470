use std::{collections::BTreeSet, convert::Infallible, fmt::Display, sync::Arc};

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

use crate::{
    services::ring_service,
    state::{SharedState, detection::DetectionHandle},
};

/// Bridge a stream of visible-ball sets into the ring game.
///
/// The task only keeps a weak reference to the state, so it never keeps a
/// discarded scoreboard alive. A source error is logged and ends the
/// subscription; the last derived pocketed set stays as it was.
pub fn subscribe<S, E>(state: &SharedState, source_name: &'static str, source: S) -> DetectionHandle
where
    S: Stream<Item = Result<BTreeSet<u8>, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let weak = Arc::downgrade(state);
    let task = tokio::spawn(async move {
        let mut source = Box::pin(source);
        while let Some(item) = source.next().await {
            let Some(state) = weak.upgrade() else {
                break;
            };
            match item {
                Ok(visible) => {
                    if ring_service::apply_detection(&state, visible).await {
                        debug!(source = source_name, "detection applied");
                    }
                }
                Err(err) => {
                    warn!(
                        source = source_name,
                        error = %err,
                        "detection source failed; automatic updates stopped"
                    );
                    break;
                }
            }
        }
        debug!(source = source_name, "detection subscription ended");
    });

    DetectionHandle::new(source_name, task)
}

/// Start the push bridge and, when configured, the remote poller.
pub async fn start(state: &SharedState) {
    let (tx, rx) = mpsc::unbounded_channel();
    let push = UnboundedReceiverStream::new(rx).map(Ok::<_, Infallible>);
    let mut handles = state.detection_handles().lock().await;
    handles.push(subscribe(state, "push", push));
    state.detection_push().lock().await.replace(tx);

    if let Some(source) = state.config().detection() {
        #[cfg(feature = "remote-detection")]
        {
            info!(url = %source.url, interval = ?source.poll_interval, "polling remote detection document");
            handles.push(subscribe(state, "remote", remote::poll(source.clone())));
        }
        #[cfg(not(feature = "remote-detection"))]
        {
            warn!(url = %source.url, "remote detection configured but support is not compiled in");
        }
    }
}

/// Forward a pushed visible set to the bridge. Returns whether a bridge was
/// listening.
pub async fn push(state: &SharedState, visible: BTreeSet<u8>) -> bool {
    let guard = state.detection_push().lock().await;
    match guard.as_ref() {
        Some(tx) => tx.send(visible).is_ok(),
        None => false,
    }
}

#[cfg(feature = "remote-detection")]
pub mod remote {
    //! Poller for a remote detection document.

    use std::collections::BTreeSet;

    use futures::Stream;
    use reqwest::{Client, StatusCode};
    use thiserror::Error;
    use tokio::time::{MissedTickBehavior, interval};
    use tracing::warn;

    use crate::{config::DetectionSourceConfig, dto::detection::DetectionDocument};

    const MAX_CONSECUTIVE_FAILURES: u32 = 3;

    /// Failures while fetching the detection document.
    #[derive(Debug, Error)]
    pub enum DetectionError {
        /// Building the HTTP client failed.
        #[error("failed to build detection client")]
        ClientBuilder {
            #[source]
            source: reqwest::Error,
        },
        /// The request could not be sent.
        #[error("failed to fetch detection document `{url}`")]
        Request {
            url: String,
            #[source]
            source: reqwest::Error,
        },
        /// The source answered with an error status.
        #[error("unexpected status {status} from detection document `{url}`")]
        Status { url: String, status: StatusCode },
        /// The body was not a detection document.
        #[error("failed to decode detection document `{url}`")]
        Decode {
            url: String,
            #[source]
            source: reqwest::Error,
        },
    }

    /// Poll `config.url` and yield the visible set whenever it changes.
    ///
    /// Transient failures are retried on the next tick; the stream yields an
    /// error and ends after several consecutive ones.
    pub fn poll(
        config: DetectionSourceConfig,
    ) -> impl Stream<Item = Result<BTreeSet<u8>, DetectionError>> {
        async_stream::stream! {
            let client = match Client::builder().build() {
                Ok(client) => client,
                Err(source) => {
                    yield Err(DetectionError::ClientBuilder { source });
                    return;
                }
            };

            let mut ticker = interval(config.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last: Option<BTreeSet<u8>> = None;
            let mut failures = 0;

            loop {
                ticker.tick().await;
                match fetch(&client, &config.url).await {
                    Ok(visible) => {
                        failures = 0;
                        if last.as_ref() != Some(&visible) {
                            last = Some(visible.clone());
                            yield Ok(visible);
                        }
                    }
                    Err(err) => {
                        failures += 1;
                        if failures >= MAX_CONSECUTIVE_FAILURES {
                            yield Err(err);
                            return;
                        }
                        warn!(attempt = failures, error = %err, "detection fetch failed");
                    }
                }
            }
        }
    }

    async fn fetch(client: &Client, url: &str) -> Result<BTreeSet<u8>, DetectionError> {
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|source| DetectionError::Request {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(DetectionError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let document = response
            .json::<DetectionDocument>()
            .await
            .map_err(|source| DetectionError::Decode {
                url: url.to_string(),
                source,
            })?;
        Ok(document.visible())
    }

}
