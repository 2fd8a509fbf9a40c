//! Error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WheelError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tone playback failures. Never fatal; the controller drops these.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio output unavailable")]
    Unavailable,
    #[error("Tone synthesis failed: {0}")]
    Synthesis(String),
}
