use std::io;
use thiserror::Error;

/// Error types reported by an audio backend.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Media file not found: {0}")]
    FileNotFound(String),
    #[error("Nothing loaded")]
    NothingLoaded,
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Device error: {0}")]
    Device(String),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}
