/*!
 * Error types for the narravid application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when synthesizing narration audio
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// Error when launching the engine process fails
    #[error("Failed to launch synthesis engine: {0}")]
    SpawnFailed(String),

    /// Error when the engine process exits unsuccessfully
    #[error("Synthesis engine failed: {0}")]
    EngineFailed(String),

    /// Error when the engine did not finish within the allowed time
    #[error("Synthesis timed out after {0}s")]
    Timeout(u64),

    /// Error when making a request to a TTS server fails
    #[error("TTS request failed: {0}")]
    RequestFailed(String),

    /// Error returned by the TTS server itself
    #[error("TTS server responded with error: {status_code} - {message}")]
    ServerError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the server
        message: String,
    },

    /// Error when the produced audio file is missing or unreadable
    #[error("Invalid audio output: {0}")]
    InvalidAudio(String),
}

/// Errors that can occur while rendering video with ffmpeg/ffprobe
#[derive(Error, Debug)]
pub enum RenderError {
    /// Error when launching ffmpeg or ffprobe fails
    #[error("Failed to launch {tool}: {message}")]
    LaunchFailed {
        /// Name of the external tool
        tool: String,
        /// Underlying failure description
        message: String,
    },

    /// Error when the external tool exits with a non-zero status
    #[error("{tool} failed: {message}")]
    ToolFailed {
        /// Name of the external tool
        tool: String,
        /// Filtered stderr from the tool
        message: String,
    },

    /// Error when the external tool did not finish within the allowed time
    #[error("{tool} timed out after {seconds}s")]
    Timeout {
        /// Name of the external tool
        tool: String,
        /// Timeout that was exceeded
        seconds: u64,
    },

    /// Error when probe output cannot be interpreted
    #[error("Failed to parse probe output: {0}")]
    ProbeParseError(String),

    /// Error writing filter scripts or caption text files
    #[error("Render I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for RenderError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

/// Errors that can occur when building a caption timeline
#[derive(Error, Debug)]
pub enum TimelineError {
    /// Error when the number of durations does not match the number of units
    #[error("Timeline length mismatch: {units} caption units but {durations} durations")]
    LengthMismatch {
        /// Number of caption units
        units: usize,
        /// Number of narration durations
        durations: usize,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from speech synthesis
    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    /// Error from video rendering
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Error from timeline construction
    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
