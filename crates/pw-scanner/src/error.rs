//! Error types for the pw-scanner crate.
//!
//! - [`StatError`] is the outcome of a single failed filesystem query
//!   (existence check, stat, modification time).
//! - [`ScanError`] is a failure of a whole tend or scan step. Every
//!   [`ScanError`] ends the watch session that hit it.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use pw_core::PathKind;

/// A filesystem query that did not produce an answer.
///
/// # Examples
///
/// ```
/// use pw_scanner::StatError;
/// use std::io;
///
/// let err = StatError::from_io("/w/a", io::Error::from(io::ErrorKind::NotFound));
/// assert!(err.is_not_found());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StatError {
    /// Nothing exists at the path (or a parent component is not a directory).
    #[error("path not found: {0}")]
    NotFound(Utf8PathBuf),

    /// The path exists but may not be inspected.
    #[error("permission denied: {0}")]
    PermissionDenied(Utf8PathBuf),

    /// Any other I/O failure.
    #[error("failed to inspect {path}: {source}")]
    Io {
        /// The path that was queried.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl StatError {
    /// Classifies an I/O error raised while probing `path`.
    pub fn from_io(path: impl Into<Utf8PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }

    /// Returns `true` for [`StatError::NotFound`].
    #[inline]
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns the queried path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::NotFound(path) | Self::PermissionDenied(path) | Self::Io { path, .. } => path,
        }
    }
}

/// A tend or scan step that failed.
///
/// # Error Taxonomy
///
/// - [`ScanError::RootNotFound`]: the root did not exist when the store was
///   first populated
/// - [`ScanError::RootVanished`]: the root disappeared before it could be
///   scanned
/// - [`ScanError::Unscannable`]: the root is neither a directory nor a
///   regular file
/// - [`ScanError::Walk`]: directory enumeration failed partway through
/// - [`ScanError::Stat`]: the root could not be inspected at all
///
/// Per-entry races and permission-denied entries never surface here; they
/// are handled inside the scan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The watch root does not exist.
    #[error("watch root does not exist: {0}")]
    RootNotFound(Utf8PathBuf),

    /// The watch root disappeared between polls or during a scan.
    #[error("watch root vanished: {0}")]
    RootVanished(Utf8PathBuf),

    /// The watch root exists but cannot be scanned.
    #[error("watch root is neither a directory nor a regular file: {path} ({kind})")]
    Unscannable {
        /// The watch root.
        path: Utf8PathBuf,
        /// What the root turned out to be.
        kind: PathKind,
    },

    /// Directory enumeration raised an error.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// The watch root could not be inspected.
    #[error(transparent)]
    Stat(#[from] StatError),
}

impl ScanError {
    /// Creates a new [`ScanError::RootNotFound`] error.
    #[inline]
    pub fn root_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::RootNotFound(path.into())
    }

    /// Creates a new [`ScanError::Unscannable`] error.
    #[inline]
    pub fn unscannable(path: impl Into<Utf8PathBuf>, kind: PathKind) -> Self {
        Self::Unscannable {
            path: path.into(),
            kind,
        }
    }

    /// Returns `true` if the root itself is gone.
    #[inline]
    #[must_use]
    pub const fn is_root_missing(&self) -> bool {
        matches!(self, Self::RootNotFound(_) | Self::RootVanished(_))
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        match self {
            Self::RootNotFound(path) | Self::RootVanished(path) | Self::Unscannable { path, .. } => {
                Some(path)
            }
            Self::Stat(err) => Some(err.path()),
            Self::Walk(_) => None,
        }
    }
}
