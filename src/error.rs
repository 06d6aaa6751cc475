//! Error types for FileDrop
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using FileDropError
pub type Result<T> = std::result::Result<T, FileDropError>;

/// Unified error type for FileDrop operations
#[derive(Debug, Error)]
pub enum FileDropError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Connection closed by peer: {0}")]
    PeerClosed(String),

    /// Error text reported by the server, as received
    #[error("Server error: {0}")]
    Remote(String),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FileDropError {
    /// Whether this error means the peer went away mid-exchange
    ///
    /// These are expected on a byte-stream protocol and are not server faults.
    pub fn is_disconnect(&self) -> bool {
        match self {
            FileDropError::PeerClosed(_) => true,
            FileDropError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }

    /// Whether this error is a socket read/write timing out
    pub fn is_timeout(&self) -> bool {
        match self {
            FileDropError::Io(e) => matches!(
                e.kind(),
                // Windows reports TimedOut where Unix reports WouldBlock
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}
