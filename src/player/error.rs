use crate::audio::AudioError;
use crate::player::queue::QueueFull;
use crate::player::state::PlaybackState;
use thiserror::Error;

/// Errors returned by the playback controller.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The request queue already holds `capacity` pending requests.
    #[error("Request queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },

    /// The action is not valid in the current state. Nothing was changed.
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: PlaybackState,
    },

    /// The audio backend failed to load or play.
    #[error("Audio backend failure: {0}")]
    BackendFailure(#[from] AudioError),

    /// The controller task is no longer running.
    #[error("Playback controller is not running")]
    ControllerGone,
}

impl PlayerError {
    /// True for errors that leave playback untouched and may be ignored.
    pub fn is_benign(&self) -> bool {
        matches!(self, PlayerError::InvalidTransition { .. })
    }
}

impl From<QueueFull> for PlayerError {
    fn from(e: QueueFull) -> Self {
        PlayerError::QueueFull { capacity: e.capacity }
    }
}
