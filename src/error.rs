//! Error types for the render engine and run loop

use std::io;

use thiserror::Error;

use crate::app::{ConfigError, LoopState};
use crate::core::Size;
use crate::layout::LayoutError;

/// Crate error type
#[derive(Error, Debug)]
pub enum Error {
    /// Two grids of different sizes were diffed
    #[error("Grid dimensions differ: previous {previous}, next {next}")]
    DimensionMismatch { previous: Size, next: Size },

    /// Malformed constraint list
    #[error("Invalid layout: {0}")]
    Layout(#[from] LayoutError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to enter raw mode: {0}")]
    EnterRawMode(#[source] io::Error),

    #[error("Failed to leave raw mode: {0}")]
    LeaveRawMode(#[source] io::Error),

    #[error("Failed to query terminal size: {0}")]
    QuerySize(#[source] io::Error),

    #[error("Failed to clear terminal: {0}")]
    Clear(#[source] io::Error),

    #[error("Failed to write frame: {0}")]
    Write(#[source] io::Error),

    #[error("Failed to flush frame after retry: {0}")]
    Flush(#[source] io::Error),

    /// The application's suspend hook failed
    #[error("Suspend hook failed: {0}")]
    Suspend(#[source] io::Error),

    /// The input source failed and no more events can arrive
    #[error("Input source failed: {0}")]
    Input(#[source] io::Error),

    /// Failed to start the input listener thread
    #[error("Failed to spawn input listener: {0}")]
    SpawnListener(#[source] io::Error),

    /// A run loop operation was invoked in the wrong state
    #[error("Cannot {action} while {state:?}")]
    InvalidState {
        action: &'static str,
        state: LoopState,
    },
}

impl Error {
    /// Configuration errors are reported before the first frame and never
    /// retried.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::DimensionMismatch { .. } | Error::Layout(_) | Error::Config(_)
        )
    }

    /// Errors raised by the terminal collaborator
    pub fn is_terminal_io(&self) -> bool {
        matches!(
            self,
            Error::EnterRawMode(_)
                | Error::LeaveRawMode(_)
                | Error::QuerySize(_)
                | Error::Clear(_)
                | Error::Write(_)
                | Error::Flush(_)
        )
    }
}

/// Result type for render engine operations
pub type Result<T> = std::result::Result<T, Error>;
