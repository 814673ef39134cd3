use crate::player::error::PlayerError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// A pending request to play `media_path`, `repeat_count` times in total.
///
/// A repeat count of 0 still plays the file once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackRequest {
    pub media_path: String,
    pub repeat_count: u32,
}

impl PlaybackRequest {
    pub fn new(media_path: impl Into<String>, repeat_count: u32) -> Self {
        PlaybackRequest {
            media_path: media_path.into(),
            repeat_count,
        }
    }
}

/// Controller state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
        }
    }
}

/// Receives the path that is now playing, or `""` once nothing is.
pub trait StateListener: Send + Sync {
    fn on_state_change(&self, current_path: &str);
}

impl<F> StateListener for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_state_change(&self, current_path: &str) {
        self(current_path)
    }
}

/// Live state of the single playback session.
pub(crate) struct PlaybackSession {
    pub state: PlaybackState,
    pub current_path: Option<String>,
    pub remaining_repeats: u32,
    pub delay: Duration,
    pub listener: Option<Arc<dyn StateListener>>,
    /// Bumped on every segment start and on stop; stale watcher reports carry an old value.
    pub generation: u64,
    /// 1-based index of the running segment within the current request.
    pub segment: u32,
}

impl PlaybackSession {
    pub fn new() -> Self {
        PlaybackSession {
            state: PlaybackState::Idle,
            current_path: None,
            remaining_repeats: 0,
            delay: Duration::ZERO,
            listener: None,
            generation: 0,
            segment: 0,
        }
    }

    /// Returns the session to idle, keeping delay, listener and generation.
    pub fn reset_to_idle(&mut self) {
        self.state = PlaybackState::Idle;
        self.current_path = None;
        self.remaining_repeats = 0;
        self.segment = 0;
    }
}

/// Commands that can be sent to the controller task.
pub enum PlayerCommand {
    Start {
        request: PlaybackRequest,
        delay: Duration,
        listener: Option<Arc<dyn StateListener>>,
        reply: oneshot::Sender<Result<(), PlayerError>>,
    },
    Pause(oneshot::Sender<Result<(), PlayerError>>),
    Resume(oneshot::Sender<Result<(), PlayerError>>),
    Stop(oneshot::Sender<Result<(), PlayerError>>),
    GetSnapshot(oneshot::Sender<PlayerSnapshot>),
    Shutdown(oneshot::Sender<()>),
}

impl fmt::Debug for PlayerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerCommand::Start { request, delay, listener, .. } => f
                .debug_struct("Start")
                .field("request", request)
                .field("delay", delay)
                .field("has_listener", &listener.is_some())
                .finish(),
            PlayerCommand::Pause(_) => write!(f, "Pause"),
            PlayerCommand::Resume(_) => write!(f, "Resume"),
            PlayerCommand::Stop(_) => write!(f, "Stop"),
            PlayerCommand::GetSnapshot(_) => write!(f, "GetSnapshot"),
            PlayerCommand::Shutdown(_) => write!(f, "Shutdown"),
        }
    }
}

/// Posted by an end-of-media watcher when its segment has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentFinished {
    pub generation: u64,
    pub path: String,
}

/// Read-only copy of the controller state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub state: PlaybackState,
    pub current_path: Option<String>,
    pub remaining_repeats: u32,
    pub segment: u32,
    pub delay: Duration,
    pub queued: Vec<PlaybackRequest>,
    pub generation: u64,
    pub has_listener: bool,
}

/// Updates broadcast by the controller task about its state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    SegmentStarted {
        path: String,
        segment: u32,
        remaining_repeats: u32,
    },
    Paused {
        path: String,
    },
    Resumed {
        path: String,
    },
    Idle,
    Error(String),
}
