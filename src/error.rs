//! Error types and handling infrastructure for jlless.
//!
//! Only a failure to read a source the user explicitly asked to open is a hard
//! error. Malformed lines, ignored range bounds, missing session files and failed
//! session writes all degrade to a usable result plus a count or a log entry, so
//! they never show up here as `Err`.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for jlless operations.
#[derive(Error, Debug)]
pub enum JllessError {
    /// An IO failure while opening, reading or mapping a source
    #[error("Cannot read log source: {message}")]
    FileError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Log file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Directories, sockets and other non-regular paths
    #[error("Not a regular file: {path}")]
    NotAFile { path: PathBuf },

    #[error("No permission to read: {path}")]
    PermissionDenied { path: PathBuf },

    /// Corrupt or truncated compressed input
    #[error("Cannot decompress: {message}")]
    CompressionError { message: String },

    /// A merge request in which not a single source could be read
    #[error("None of the {} requested files could be read", paths.len())]
    NoReadableSources { paths: Vec<PathBuf> },

    /// Session file could not be read, written or (de)serialized
    #[error("Session error: {message}")]
    SessionError { message: String },

    #[error("Invalid configuration: {message}")]
    ConfigError { message: String },

    /// A parse was cancelled; partial results were discarded
    #[error("Operation cancelled")]
    Cancelled,

    /// Internal failures such as a panicked worker task
    #[error("{message}")]
    Other { message: String },
}

/// Standard Result type for jlless operations.
pub type Result<T> = std::result::Result<T, JllessError>;

impl JllessError {
    /// Wrap an IO error with what was being attempted
    pub fn file_error(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileError {
            message: message.into(),
            source,
        }
    }

    pub fn compression(message: impl Into<String>) -> Self {
        Self::CompressionError {
            message: message.into(),
        }
    }

    pub fn session(message: impl Into<String>) -> Self {
        Self::SessionError {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Whether this error means the source itself could not be opened or read.
    pub fn is_file_access(&self) -> bool {
        matches!(
            self,
            Self::FileError { .. }
                | Self::FileNotFound { .. }
                | Self::NotAFile { .. }
                | Self::PermissionDenied { .. }
                | Self::CompressionError { .. }
        )
    }
}

impl From<std::io::Error> for JllessError {
    fn from(source: std::io::Error) -> Self {
        let message = match source.kind() {
            std::io::ErrorKind::NotFound => "source disappeared",
            std::io::ErrorKind::PermissionDenied => "access denied",
            std::io::ErrorKind::InvalidData => "source is not readable text",
            _ => "read failed",
        };
        Self::file_error(message, source)
    }
}
