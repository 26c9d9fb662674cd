//! Effect and path-kind enumerations.
//!
//! Both enumerations are closed: every event carries exactly one [`Effect`]
//! and one [`PathKind`].

use std::fmt;
use std::fs::FileType;

use serde::{Deserialize, Serialize};

/// What happened to a path.
///
/// # Examples
///
/// ```
/// use pw_core::Effect;
///
/// assert_eq!(Effect::Create.label(), "create");
/// assert_eq!(Effect::Destroy.to_string(), "destroy");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// The path appeared since the previous poll.
    Create,
    /// The path's modification time changed since the previous poll.
    Modify,
    /// The path disappeared, or stopped being a regular file.
    Destroy,
    /// Anything else.
    Other,
}

impl Effect {
    /// Returns the lowercase name of this effect.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Modify => "modify",
            Self::Destroy => "destroy",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The kind of filesystem entry an event concerns.
///
/// [`PathKind::Other`] covers special files (fifos, sockets, devices) and
/// entries whose kind could not be determined.
///
/// # Examples
///
/// ```
/// use pw_core::PathKind;
///
/// assert!(PathKind::File.is_file());
/// assert_eq!(PathKind::Symlink.to_string(), "symlink");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    /// A regular file.
    File,
    /// A directory.
    Dir,
    /// A symbolic link, reported when the link itself is all there is to see
    /// (for example a dangling link).
    Symlink,
    /// Anything else.
    Other,
}

impl PathKind {
    /// Classifies a [`FileType`].
    ///
    /// The file type is taken as given: a symlink file type yields
    /// [`PathKind::Symlink`] without looking at the target.
    #[must_use]
    pub fn from_file_type(file_type: FileType) -> Self {
        if file_type.is_file() {
            Self::File
        } else if file_type.is_dir() {
            Self::Dir
        } else if file_type.is_symlink() {
            Self::Symlink
        } else {
            Self::Other
        }
    }

    /// Returns `true` for [`PathKind::File`].
    #[inline]
    #[must_use]
    pub const fn is_file(self) -> bool {
        matches!(self, Self::File)
    }

    /// Returns `true` for [`PathKind::Dir`].
    #[inline]
    #[must_use]
    pub const fn is_dir(self) -> bool {
        matches!(self, Self::Dir)
    }

    /// Returns the lowercase name of this kind.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Dir => "dir",
            Self::Symlink => "symlink",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
