//! Error types and handling for dirmirror
//!
//! The taxonomy separates file-level failures, which are recovered locally
//! and reported per file, from pass-level failures, which abort an entire
//! synchronization pass. Transience classification decides whether the
//! retrying copier will attempt a file again.

use std::path::PathBuf;

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Reading file content failed
    Read,
    /// Permission or lock prevented the operation
    Access,
    /// Generic I/O failure
    Io,
    /// Post-copy digest verification failed
    Verification,
    /// A tree root could not be enumerated
    TreeEnumeration,
    /// A target file could not be removed
    Delete,
    /// Configuration errors
    Config,
    /// Cancellation
    Cancelled,
}

/// Main error type for dirmirror operations
#[derive(thiserror::Error, Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Error {
    /// A file could not be opened or read to completion
    #[error("Read error for '{path}': {message}")]
    Read {
        /// Path to the file that could not be read
        path: PathBuf,
        /// Error message from the underlying read
        message: String,
    },

    /// Permission denied or file locked
    #[error("Access denied for '{path}': {message}")]
    Access {
        /// Path to the file with permission issues
        path: PathBuf,
        /// Error message from the underlying operation
        message: String,
    },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        /// Error message from the I/O operation
        message: String,
    },

    /// Destination digest did not match the source digest after a copy
    #[error("Verification failed for '{path}': digest mismatch after copy")]
    Verification {
        /// Path to the destination file that failed verification
        path: PathBuf,
    },

    /// A tree root directory is missing or unreadable
    #[error("Tree enumeration failed for '{path}': {message}")]
    TreeEnumeration {
        /// Root path that could not be enumerated
        path: PathBuf,
        /// Error message from the enumeration
        message: String,
    },

    /// A target file could not be removed
    #[error("Delete failed for '{path}': {message}")]
    Delete {
        /// Path to the file that could not be removed
        path: PathBuf,
        /// Error message from the removal
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Operation cancelled by a shutdown request
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Read { .. } => ErrorKind::Read,
            Self::Access { .. } => ErrorKind::Access,
            Self::Io { .. } => ErrorKind::Io,
            Self::Verification { .. } => ErrorKind::Verification,
            Self::TreeEnumeration { .. } => ErrorKind::TreeEnumeration,
            Self::Delete { .. } => ErrorKind::Delete,
            Self::Config { .. } => ErrorKind::Config,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Check if this error should trigger a retry of the owning copy
    ///
    /// Access errors are retried under the same policy as transient I/O
    /// errors. Permission problems rarely resolve within seconds, but the
    /// uniform policy is kept for predictable timing.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Read { .. }
            | Self::Access { .. }
            | Self::Io { .. }
            | Self::Verification { .. } => true,
            Self::TreeEnumeration { .. }
            | Self::Delete { .. }
            | Self::Config { .. }
            | Self::Cancelled => false,
        }
    }

    /// Check if this error aborts an entire synchronization pass
    pub fn is_pass_fatal(&self) -> bool {
        matches!(self, Self::TreeEnumeration { .. } | Self::Cancelled)
    }

    /// Create a new read error
    pub fn read(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Read {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new access error
    pub fn access(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Access {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a new tree enumeration error
    pub fn tree_enumeration(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::TreeEnumeration {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new delete error
    pub fn delete(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Delete {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classify an I/O error raised while copying the given path
    ///
    /// Permission problems are kept apart from generic I/O failures so that
    /// callers can report them distinctly, even though the retry policy
    /// currently treats both as retryable.
    pub fn from_copy_io(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        if error.kind() == std::io::ErrorKind::PermissionDenied {
            Self::Access {
                path,
                message: error.to_string(),
            }
        } else {
            Self::Io {
                message: format!("'{}': {}", path.display(), error),
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(Error::read("a", "gone").kind(), ErrorKind::Read);
        assert_eq!(Error::access("a", "denied").kind(), ErrorKind::Access);
        assert_eq!(Error::io("boom").kind(), ErrorKind::Io);
        assert_eq!(
            Error::tree_enumeration("root", "missing").kind(),
            ErrorKind::TreeEnumeration
        );
        assert_eq!(Error::delete("a", "busy").kind(), ErrorKind::Delete);
        assert_eq!(Error::Cancelled.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn test_transience_classification() {
        assert!(Error::io("hiccup").is_transient());
        assert!(Error::access("a", "denied").is_transient());
        assert!(Error::read("a", "gone").is_transient());
        assert!(Error::Verification { path: "a".into() }.is_transient());

        assert!(!Error::tree_enumeration("root", "missing").is_transient());
        assert!(!Error::delete("a", "busy").is_transient());
        assert!(!Error::config("bad interval").is_transient());
        assert!(!Error::Cancelled.is_transient());
    }

    #[test]
    fn test_pass_fatal_classification() {
        assert!(Error::tree_enumeration("root", "missing").is_pass_fatal());
        assert!(Error::Cancelled.is_pass_fatal());
        assert!(!Error::io("hiccup").is_pass_fatal());
        assert!(!Error::delete("a", "busy").is_pass_fatal());
    }

    #[test]
    fn test_copy_io_classification() {
        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(Error::from_copy_io("a", &denied).kind(), ErrorKind::Access);

        let broken = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        assert_eq!(Error::from_copy_io("a", &broken).kind(), ErrorKind::Io);
    }
}
