use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while driving the external camera tools
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("{0} not found")]
    ToolNotFound(&'static str),

    #[error("Failed to start {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} failed ({status})")]
    ToolFailed { tool: &'static str, status: String },

    #[error("No output written to {}", .0.display())]
    OutputMissing(PathBuf),

    #[error("A recording is already in progress")]
    AlreadyRecording,

    #[error("Duration must be between 1 and {max} seconds (got {requested})")]
    InvalidDuration { requested: u64, max: u64 },

    #[error("Recording task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CameraError {
    /// Map a spawn failure, singling out a missing binary
    pub(crate) fn spawn(tool: &'static str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            CameraError::ToolNotFound(tool)
        } else {
            CameraError::Spawn { tool, source }
        }
    }
}
