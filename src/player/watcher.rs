// src/player/watcher.rs

use crate::audio::AudioBackend;
use crate::player::state::SegmentFinished;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info, instrument, trace, warn};

const LOG_TARGET: &str = "r_cueplayer::player::watcher";

/// Default spacing between `is_busy` polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Watches one playback segment and reports when the backend goes idle.
///
/// Dropping the watcher aborts its task, so a segment that was stopped never
/// reports completion.
#[derive(Debug)]
pub struct EndOfMediaWatcher {
    task_handle: JoinHandle<()>,
    generation: u64,
    path: String,
}

impl EndOfMediaWatcher {
    /// Spawns a watcher task for the segment identified by `generation`.
    #[instrument(skip(backend, finished_tx))]
    pub fn spawn(
        backend: Arc<dyn AudioBackend>,
        path: String,
        generation: u64,
        poll_interval: Duration,
        finished_tx: mpsc::Sender<SegmentFinished>,
    ) -> Self {
        debug!(target: LOG_TARGET, "Spawning end-of-media watcher for {} (generation {})", path, generation);
        let task_path = path.clone();
        let task_handle = tokio::spawn(async move {
            wait_until_idle(backend.as_ref(), poll_interval).await;
            info!(target: LOG_TARGET, path = %task_path, generation, "Segment finished.");
            let report = SegmentFinished {
                generation,
                path: task_path,
            };
            if let Err(e) = finished_tx.send(report).await {
                // Controller already shut down.
                trace!(target: LOG_TARGET, generation, "Failed to report finished segment: {}", e);
            }
        });

        EndOfMediaWatcher {
            task_handle,
            generation,
            path,
        }
    }

    /// Cancels the watcher. Its segment will not be reported.
    pub fn cancel(self) {
        debug!(target: LOG_TARGET, path = %self.path, generation = self.generation, "Cancelling end-of-media watcher.");
        drop(self);
    }
}

impl Drop for EndOfMediaWatcher {
    fn drop(&mut self) {
        self.task_handle.abort();
    }
}

/// Resolves once the backend reports idle.
async fn wait_until_idle(backend: &dyn AudioBackend, poll_interval: Duration) {
    if let Some(mut busy_rx) = backend.busy_signal() {
        loop {
            if !*busy_rx.borrow_and_update() {
                return;
            }
            if busy_rx.changed().await.is_err() {
                warn!(target: LOG_TARGET, "Backend busy signal closed; falling back to polling.");
                break;
            }
        }
    }

    let mut ticker = interval(poll_interval);
    loop {
        ticker.tick().await;
        if !backend.is_busy() {
            return;
        }
    }
}
