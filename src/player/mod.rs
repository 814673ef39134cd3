//! Playback controller: the single-track state machine, its request queue and
//! end-of-media watching.
//!
//! The controller runs as its own tokio task and owns all playback state.
//! Callers talk to it through a cloneable [`PlayerHandle`]; each watcher
//! reports back over a separate channel tagged with its segment generation.

use crate::audio::AudioBackend;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, instrument, trace, warn};

mod command_handler;
pub mod error;
mod playback_starter;
pub mod queue;
mod run_loop;
mod state;
pub mod watcher;

pub use error::PlayerError;
pub use queue::{QueueFull, RequestQueue, DEFAULT_QUEUE_CAPACITY};
pub use state::{
    PlaybackRequest, PlaybackState, PlayerCommand, PlayerEvent, PlayerSnapshot, SegmentFinished,
    StateListener,
};
pub use watcher::{EndOfMediaWatcher, DEFAULT_POLL_INTERVAL};

use state::PlaybackSession;

pub(crate) const PLAYER_LOG_TARGET: &str = "r_cueplayer::player";

/// Tunables for a [`PlaybackController`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Maximum number of pending requests.
    pub queue_capacity: usize,
    /// Spacing between end-of-media polls.
    pub poll_interval: Duration,
    /// Capacity of the event broadcast channel.
    pub state_update_capacity: usize,
    /// Capacity of the command channel.
    pub command_buffer_size: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            state_update_capacity: 32,
            command_buffer_size: 32,
        }
    }
}

/// Inter-segment delay that is currently running.
#[derive(Debug, Clone, Copy)]
struct PendingGap {
    deadline: Instant,
    generation: u64,
}

/// Owns the playback session, the request queue and the active watcher.
/// Run it with [`PlaybackController::run`] in its own task.
pub struct PlaybackController {
    // --- Configuration ---
    backend: Arc<dyn AudioBackend>,
    poll_interval: Duration,

    // --- State ---
    session: PlaybackSession,
    queue: RequestQueue,
    watcher: Option<EndOfMediaWatcher>,
    pending_gap: Option<PendingGap>,
    /// The gap ran out while paused; `resume` picks up from there.
    held_continuation: bool,

    // --- Communication ---
    command_rx: mpsc::Receiver<PlayerCommand>,
    segment_tx: mpsc::Sender<SegmentFinished>,
    segment_rx: mpsc::Receiver<SegmentFinished>,
    event_tx: broadcast::Sender<PlayerEvent>,
}

impl PlaybackController {
    /// Creates a controller and the handle used to drive it.
    pub fn new(backend: Arc<dyn AudioBackend>, config: ControllerConfig) -> (Self, PlayerHandle) {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer_size.max(1));
        let (segment_tx, segment_rx) = mpsc::channel(4);
        let (event_tx, _) = broadcast::channel(config.state_update_capacity.max(1));

        let controller = PlaybackController {
            backend,
            poll_interval: config.poll_interval,
            session: PlaybackSession::new(),
            queue: RequestQueue::new(config.queue_capacity),
            watcher: None,
            pending_gap: None,
            held_continuation: false,
            command_rx,
            segment_tx,
            segment_rx,
            event_tx: event_tx.clone(),
        };
        let handle = PlayerHandle {
            command_tx,
            event_tx,
        };
        (controller, handle)
    }

    /// Creates a controller and spawns its run loop on the current runtime.
    pub fn spawn(backend: Arc<dyn AudioBackend>, config: ControllerConfig) -> (PlayerHandle, JoinHandle<()>) {
        let (mut controller, handle) = Self::new(backend, config);
        let task = tokio::spawn(async move { controller.run().await });
        (handle, task)
    }

    /// Runs the command processing loop until shutdown or until every handle is dropped.
    #[instrument(skip(self))]
    pub async fn run(&mut self) {
        run_loop::run_controller_loop(self).await;
    }

    // --- Private Helper Methods ---

    /// Sends an event via the broadcast channel, logging errors.
    fn broadcast_update(&self, update: PlayerEvent) {
        trace!(target: PLAYER_LOG_TARGET, "Broadcasting event: {:?}", update);
        if self.event_tx.send(update.clone()).is_err() {
            // No subscribers; normal when only the listener is in use.
            debug!(target: PLAYER_LOG_TARGET, "No active subscribers for event: {:?}", update);
        }
    }

    /// Calls the session listener, if one is registered. Panics in the
    /// listener are caught and logged.
    fn notify_listener(&self, current_path: &str) {
        let Some(listener) = self.session.listener.as_ref() else {
            debug!(target: PLAYER_LOG_TARGET, "No listener registered; skipping notification {:?}", current_path);
            return;
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener.on_state_change(current_path)));
        if outcome.is_err() {
            warn!(target: PLAYER_LOG_TARGET, "State listener panicked while handling {:?}", current_path);
        }
    }

    /// Constructs a read-only copy of the session.
    fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            state: self.session.state,
            current_path: self.session.current_path.clone(),
            remaining_repeats: self.session.remaining_repeats,
            segment: self.session.segment,
            delay: self.session.delay,
            queued: self.queue.iter().cloned().collect(),
            generation: self.session.generation,
            has_listener: self.session.listener.is_some(),
        }
    }

    /// Drops the active watcher and any running gap so nothing from the
    /// current segment can fire again.
    fn cancel_segment(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.cancel();
        }
        self.pending_gap = None;
        self.held_continuation = false;
        self.session.generation += 1;
    }
}

/// Cloneable handle for sending commands to a running [`PlaybackController`].
#[derive(Clone)]
pub struct PlayerHandle {
    command_tx: mpsc::Sender<PlayerCommand>,
    event_tx: broadcast::Sender<PlayerEvent>,
}

impl PlayerHandle {
    /// Enqueues `media_path` and starts it right away if nothing is playing.
    ///
    /// `delay` and `listener` replace the session-wide settings; the repeat
    /// count stays attached to this request.
    pub async fn start(
        &self,
        media_path: impl Into<String>,
        repeat_count: u32,
        delay: Duration,
        listener: Option<Arc<dyn StateListener>>,
    ) -> Result<(), PlayerError> {
        let request = PlaybackRequest::new(media_path, repeat_count);
        self.request(|reply| PlayerCommand::Start {
            request,
            delay,
            listener,
            reply,
        })
        .await?
    }

    pub async fn pause(&self) -> Result<(), PlayerError> {
        self.request(PlayerCommand::Pause).await?
    }

    pub async fn resume(&self) -> Result<(), PlayerError> {
        self.request(PlayerCommand::Resume).await?
    }

    /// Stops the current track and starts the next queued request, if any.
    pub async fn stop(&self) -> Result<(), PlayerError> {
        self.request(PlayerCommand::Stop).await?
    }

    pub async fn snapshot(&self) -> Result<PlayerSnapshot, PlayerError> {
        self.request(PlayerCommand::GetSnapshot).await
    }

    /// Subscribes to controller events.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.event_tx.subscribe()
    }

    /// Stops playback and ends the controller task.
    pub async fn shutdown(&self) -> Result<(), PlayerError> {
        self.request(PlayerCommand::Shutdown).await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> PlayerCommand,
    ) -> Result<T, PlayerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(make(reply_tx))
            .await
            .map_err(|_| PlayerError::ControllerGone)?;
        reply_rx.await.map_err(|_| PlayerError::ControllerGone)
    }
}
