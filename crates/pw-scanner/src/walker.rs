//! Directory tree traversal.
//!
//! This module provides [`TreeWalker`], which uses the `ignore` crate to walk
//! a watched directory tree and classifies what it finds.
//!
//! # Traversal Rules
//!
//! - No ignore files, hidden-file rules, or other filters are applied: every
//!   entry under the root is visited.
//! - Directory symlinks are followed when
//!   [`TraversalConfig::follow_directory_symlinks`] is set; symlink loops are
//!   skipped.
//! - Permission-denied entries are skipped when
//!   [`TraversalConfig::skip_permission_denied`] is set, and are errors
//!   otherwise.
//! - Entries that vanish while the walk is in progress (including dangling
//!   symlinks) are skipped; the store maintainer notices them on the next poll.
//!   The root itself vanishing is an error.
//! - Non-UTF-8 paths are skipped with a warning.
//!
//! Any other enumeration error is yielded to the caller.
//!
//! # Examples
//!
//! ```no_run
//! use pw_scanner::TreeWalker;
//! use pw_core::TraversalConfig;
//! use camino::Utf8Path;
//!
//! let walker = TreeWalker::new(Utf8Path::new("./src"), TraversalConfig::default());
//! for entry in walker.walk() {
//!     let entry = entry?;
//!     println!("{} ({})", entry.path, entry.kind);
//! }
//! # Ok::<(), pw_scanner::ScanError>(())
//! ```

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;
use pw_core::{PathKind, TraversalConfig};

use crate::error::ScanError;
use crate::stat;

/// One entry found while walking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path of the entry, rooted at the walker's root.
    pub path: Utf8PathBuf,

    /// Kind of the entry. Symlinks are resolved to their target's kind; a
    /// symlink that points nowhere stays [`PathKind::Symlink`].
    pub kind: PathKind,
}

/// A walker over one directory tree.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    /// The root directory to walk.
    root: Utf8PathBuf,
    /// Traversal options.
    traversal: TraversalConfig,
}

impl TreeWalker {
    /// Creates a walker for `root`.
    ///
    /// The root is not checked here; a missing root surfaces as
    /// [`ScanError::RootVanished`] from the walk itself.
    #[must_use]
    pub fn new(root: &Utf8Path, traversal: TraversalConfig) -> Self {
        Self {
            root: root.to_owned(),
            traversal,
        }
    }

    /// Starts a new walk.
    #[must_use]
    pub fn walk(&self) -> Walk {
        Walk {
            inner: self.build_walker(),
            root: self.root.clone(),
            skip_permission_denied: self.traversal.skip_permission_denied,
        }
    }

    /// Builds the ignore walker with every filter switched off.
    fn build_walker(&self) -> ignore::Walk {
        WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(self.traversal.follow_directory_symlinks)
            .build()
    }
}

/// An in-progress walk. Yields entries in the order the filesystem returns
/// them, which is not sorted.
pub struct Walk {
    inner: ignore::Walk,
    root: Utf8PathBuf,
    skip_permission_denied: bool,
}

impl std::fmt::Debug for Walk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walk")
            .field("root", &self.root)
            .field("skip_permission_denied", &self.skip_permission_denied)
            .finish_non_exhaustive()
    }
}

impl Iterator for Walk {
    type Item = Result<WalkEntry, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(entry) => {
                    if let Some(entry) = convert_entry(entry) {
                        return Some(Ok(entry));
                    }
                }
                Err(err) => match classify(&err) {
                    WalkFault::PermissionDenied if self.skip_permission_denied => {
                        tracing::trace!(error = %err, "Skipping unreadable entry");
                    }
                    WalkFault::Loop => {
                        tracing::debug!(error = %err, "Skipping symlink loop");
                    }
                    WalkFault::Vanished if err.depth() == Some(0) => {
                        return Some(Err(ScanError::RootVanished(self.root.clone())));
                    }
                    WalkFault::Vanished => {
                        tracing::trace!(error = %err, "Skipping entry that vanished during walk");
                    }
                    WalkFault::PermissionDenied | WalkFault::Other => {
                        return Some(Err(ScanError::Walk(err)));
                    }
                },
            }
        }
    }
}

/// Why an enumeration step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkFault {
    PermissionDenied,
    Loop,
    Vanished,
    Other,
}

fn classify(err: &ignore::Error) -> WalkFault {
    if is_loop(err) {
        return WalkFault::Loop;
    }
    match err.io_error().map(io::Error::kind) {
        Some(io::ErrorKind::PermissionDenied) => WalkFault::PermissionDenied,
        Some(io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => WalkFault::Vanished,
        _ => WalkFault::Other,
    }
}

fn is_loop(err: &ignore::Error) -> bool {
    match err {
        ignore::Error::Loop { .. } => true,
        ignore::Error::WithPath { err, .. }
        | ignore::Error::WithDepth { err, .. }
        | ignore::Error::WithLineNumber { err, .. } => is_loop(err),
        _ => false,
    }
}

/// Converts an ignore entry, resolving symlinks the walker did not follow.
fn convert_entry(entry: ignore::DirEntry) -> Option<WalkEntry> {
    let file_kind = entry
        .file_type()
        .map_or(PathKind::Other, PathKind::from_file_type);

    let path = match Utf8PathBuf::from_path_buf(entry.into_path()) {
        Ok(path) => path,
        Err(invalid_path) => {
            tracing::warn!(
                path = %invalid_path.display(),
                "Skipping non-UTF-8 path during walk"
            );
            return None;
        }
    };

    let kind = if file_kind == PathKind::Symlink {
        stat::kind(&path).unwrap_or(PathKind::Other)
    } else {
        file_kind
    };

    Some(WalkEntry { path, kind })
}
