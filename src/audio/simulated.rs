use crate::audio::{backend::AudioBackend, error::AudioError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

const LOG_TARGET: &str = "r_cueplayer::audio::simulated";

/// Playback clock for the currently loaded file.
#[derive(Debug, Default)]
struct SimulatedStream {
    path: Option<String>,
    length: Duration,
    /// Time played before the most recent pause.
    played: Duration,
    /// Set while the stream is running (playing and not paused).
    running_since: Option<Instant>,
    started: bool,
    stopped: bool,
}

impl SimulatedStream {
    fn position(&self) -> Duration {
        match self.running_since {
            Some(since) => self.played + since.elapsed(),
            None => self.played,
        }
    }

    fn is_busy(&self) -> bool {
        self.path.is_some() && self.started && !self.stopped && self.position() < self.length
    }
}

/// Timer-driven backend that "plays" each file for a fixed length without
/// producing any sound. Paused time does not count towards the length.
pub struct SimulatedBackend {
    default_length: Duration,
    lengths: HashMap<String, Duration>,
    require_existing_files: bool,
    stream: Mutex<SimulatedStream>,
}

impl SimulatedBackend {
    /// Creates a backend where every track lasts `default_length`.
    pub fn new(default_length: Duration) -> Self {
        info!(target: LOG_TARGET, "Creating simulated backend with track length {:?}", default_length);
        SimulatedBackend {
            default_length,
            lengths: HashMap::new(),
            require_existing_files: false,
            stream: Mutex::new(SimulatedStream::default()),
        }
    }

    /// Makes `load` fail with `FileNotFound` for paths that do not exist.
    pub fn require_existing_files(mut self, require: bool) -> Self {
        self.require_existing_files = require;
        self
    }

    /// Overrides the simulated length for one path.
    pub fn with_track_length(mut self, path: impl Into<String>, length: Duration) -> Self {
        self.lengths.insert(path.into(), length);
        self
    }

    /// Current position within the loaded track.
    pub fn position(&self) -> Duration {
        self.stream.lock().position()
    }

    /// Path of the loaded track, if any.
    pub fn loaded_path(&self) -> Option<String> {
        self.stream.lock().path.clone()
    }
}

impl AudioBackend for SimulatedBackend {
    fn load(&self, path: &str) -> Result<(), AudioError> {
        if self.require_existing_files && !Path::new(path).exists() {
            warn!(target: LOG_TARGET, "Refusing to load missing file: {}", path);
            return Err(AudioError::FileNotFound(path.to_string()));
        }
        let length = self.lengths.get(path).copied().unwrap_or(self.default_length);
        debug!(target: LOG_TARGET, "Loaded {} ({:?})", path, length);
        *self.stream.lock() = SimulatedStream {
            path: Some(path.to_string()),
            length,
            ..SimulatedStream::default()
        };
        Ok(())
    }

    fn play(&self) -> Result<(), AudioError> {
        let mut stream = self.stream.lock();
        if stream.path.is_none() {
            return Err(AudioError::NothingLoaded);
        }
        stream.played = Duration::ZERO;
        stream.running_since = Some(Instant::now());
        stream.started = true;
        stream.stopped = false;
        trace!(target: LOG_TARGET, "Play {:?}", stream.path);
        Ok(())
    }

    fn pause(&self) -> Result<(), AudioError> {
        let mut stream = self.stream.lock();
        if !stream.is_busy() {
            return Err(AudioError::InvalidState("nothing is playing".to_string()));
        }
        if let Some(since) = stream.running_since.take() {
            stream.played += since.elapsed();
        }
        trace!(target: LOG_TARGET, "Paused at {:?}", stream.played);
        Ok(())
    }

    fn resume(&self) -> Result<(), AudioError> {
        let mut stream = self.stream.lock();
        if !stream.is_busy() {
            return Err(AudioError::InvalidState("nothing to resume".to_string()));
        }
        if stream.running_since.is_none() {
            stream.running_since = Some(Instant::now());
        }
        trace!(target: LOG_TARGET, "Resumed at {:?}", stream.played);
        Ok(())
    }

    fn stop(&self) -> Result<(), AudioError> {
        let mut stream = self.stream.lock();
        stream.played = stream.position();
        stream.running_since = None;
        stream.stopped = true;
        trace!(target: LOG_TARGET, "Stopped {:?}", stream.path);
        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.stream.lock().is_busy()
    }
}
