//! Error types for the pw-watcher crate.
//!
//! This module provides the [`WatchError`] type for everything that can end
//! a watch session or keep one from starting.

use camino::{Utf8Path, Utf8PathBuf};
use pw_core::ConfigError;
use pw_scanner::ScanError;

/// Errors that can occur while watching.
///
/// # Error Recovery Strategy
///
/// A session never recovers from an error by itself: the first failure ends
/// it. What a caller can do next depends on the cause.
///
/// - **Tend / scan** ([`WatchError::Tend`], [`WatchError::Scan`]):
///   recoverable. The watched tree was missing or unreadable; a new session
///   may succeed once it is back.
/// - **Path not found** ([`WatchError::PathNotFound`]): recoverable, for the
///   same reason.
/// - **Stopped** ([`WatchError::Stopped`]): fatal. The session has already
///   ended and must be replaced.
/// - **Channel closed** ([`WatchError::ChannelClosed`]): fatal. The session
///   task did not finish normally.
/// - **Config** ([`WatchError::Config`]): fatal. The options are invalid.
/// - **I/O errors** ([`WatchError::Io`]): fatal.
///
/// # Examples
///
/// ```
/// use pw_watcher::WatchError;
///
/// fn handle_error(err: &WatchError) {
///     if err.is_recoverable() {
///         eprintln!("watch ended, retry later: {err}");
///     } else {
///         eprintln!("watch failed: {err}");
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Tending the snapshot store failed.
    ///
    /// In practice this means the root did not exist when the session first
    /// populated its store.
    #[error("failed to tend snapshot store: {0}")]
    Tend(#[source] ScanError),

    /// Scanning the watch root failed.
    #[error("failed to scan watch root: {0}")]
    Scan(#[source] ScanError),

    /// The specified path does not exist.
    #[error("path does not exist: {0}")]
    PathNotFound(Utf8PathBuf),

    /// The session has already stopped and cannot poll again.
    #[error("watch session already stopped")]
    Stopped,

    /// The session task ended without reporting a result.
    #[error("event channel closed unexpectedly")]
    ChannelClosed,

    /// The watch options are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An I/O error occurred while setting up the watch.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchError {
    /// Creates a new [`WatchError::PathNotFound`] error.
    #[inline]
    pub fn path_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::PathNotFound(path.into())
    }

    /// Returns the scan failure behind this error, if any.
    #[must_use]
    pub const fn scan_error(&self) -> Option<&ScanError> {
        match self {
            Self::Tend(err) | Self::Scan(err) => Some(err),
            _ => None,
        }
    }

    /// Returns `true` if a new session might succeed once the watched tree
    /// changes.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Tend(_) | Self::Scan(_) | Self::PathNotFound(_))
    }

    /// Returns `true` if retrying cannot help.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        match self {
            Self::PathNotFound(path) => Some(path),
            Self::Tend(err) | Self::Scan(err) => err.path(),
            Self::Stopped | Self::ChannelClosed | Self::Config(_) | Self::Io(_) => None,
        }
    }
}
