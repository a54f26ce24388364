//! Error types for gaze.

use std::io;
use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors. Any of these ends the run.
#[derive(Debug, Error)]
pub enum Error {
    /// Terminal dimensions could not be determined and were not forced.
    #[error("unable to get terminal size (use --width and --height to force one)")]
    TerminalSize(#[source] io::Error),

    /// Entering or leaving raw mode failed on an interactive terminal.
    #[error("unable to switch terminal mode: {0}")]
    RawMode(#[source] io::Error),

    /// Another raw session is still active in this process.
    #[error("a raw terminal session is already active")]
    SessionActive,

    /// The command could not be started.
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        /// Command line as it was passed to the OS.
        command: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// Writing to the terminal or spawning a helper thread failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            Error::SessionActive.to_string(),
            "a raw terminal session is already active"
        );
        let err = Error::Spawn {
            command: "/bin/sh -c nope".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "failed to start `/bin/sh -c nope`: not found");
    }

    #[test]
    fn test_io_is_transparent() {
        let err = Error::from(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        assert_eq!(err.to_string(), "pipe closed");
    }
}
