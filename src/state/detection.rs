use tokio::task::JoinHandle;
use tracing::debug;

/// Owns a running detection subscription.
///
/// The bridge task stops when [`DetectionHandle::unsubscribe`] is called or
/// the handle is dropped, so a discarded ring game never receives updates.
pub struct DetectionHandle {
    source: &'static str,
    task: JoinHandle<()>,
}

impl DetectionHandle {
    pub(crate) fn new(source: &'static str, task: JoinHandle<()>) -> Self {
        Self { source, task }
    }

    /// Name of the feeding source (`push` or `remote`).
    pub fn source(&self) -> &'static str {
        self.source
    }

    /// Whether the bridge task already ended (source closed or failed).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop listening.
    pub fn unsubscribe(self) {
        debug!(source = self.source, "unsubscribing detection bridge");
    }
}

impl Drop for DetectionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
