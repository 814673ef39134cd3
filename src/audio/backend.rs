use crate::audio::error::AudioError;
use tokio::sync::watch;

/// Trait defining the controls of a single-stream audio backend.
///
/// All methods take `&self` and are synchronous; implementations manage their
/// own interior locking so the controller and the end-of-media watcher can
/// share one instance behind an `Arc`.
pub trait AudioBackend: Send + Sync {
    /// Loads the media at `path`, replacing whatever was loaded before.
    fn load(&self, path: &str) -> Result<(), AudioError>;

    /// Starts playing the loaded media from the beginning.
    fn play(&self) -> Result<(), AudioError>;

    /// Pauses the current stream.
    fn pause(&self) -> Result<(), AudioError>;

    /// Resumes a paused stream.
    fn resume(&self) -> Result<(), AudioError>;

    /// Stops the current stream. Stopping an idle backend is not an error.
    fn stop(&self) -> Result<(), AudioError>;

    /// Returns true while a loaded stream has not yet finished or been stopped.
    /// A paused stream still counts as busy.
    fn is_busy(&self) -> bool;

    /// Push-style busy notifications, for backends that can provide them.
    ///
    /// The receiver carries the same value `is_busy` would return. When this
    /// returns `None` the watcher falls back to polling `is_busy`.
    fn busy_signal(&self) -> Option<watch::Receiver<bool>> {
        None
    }
}
