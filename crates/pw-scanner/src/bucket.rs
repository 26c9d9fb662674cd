//! The snapshot store.
//!
//! A [`Bucket`] maps every regular file seen under the watch root to the
//! modification time observed for it on the most recent poll. It is the only
//! state a polling watch session carries between polls.
//!
//! # Ownership
//!
//! A bucket belongs to exactly one watch session. It is created empty when
//! the session starts and dropped when the session ends; nothing in it is
//! shared, so it needs no locking.

use std::time::SystemTime;

use camino::{Utf8Path, Utf8PathBuf};
use pw_core::{FxHashMap, fx_hash_map};

/// Path → last observed modification time.
///
/// # Examples
///
/// ```
/// use pw_scanner::Bucket;
/// use camino::{Utf8Path, Utf8PathBuf};
/// use std::time::SystemTime;
///
/// let mut bucket = Bucket::new();
/// assert!(bucket.is_empty());
///
/// bucket.insert(Utf8PathBuf::from("/w/a"), SystemTime::UNIX_EPOCH);
/// assert!(bucket.contains(Utf8Path::new("/w/a")));
/// assert_eq!(bucket.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Bucket {
    /// Modification time per path.
    entries: FxHashMap<Utf8PathBuf, SystemTime>,
    /// Set once the store has been populated from the root.
    primed: bool,
}

impl Bucket {
    /// Creates an empty, unpopulated bucket.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: fx_hash_map(),
            primed: false,
        }
    }

    /// Returns the number of tracked paths.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no path is tracked.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` once the bucket has been populated from the root.
    ///
    /// A primed bucket may still be empty, for example when the watched
    /// directory has no files.
    #[inline]
    #[must_use]
    pub const fn is_primed(&self) -> bool {
        self.primed
    }

    pub(crate) fn mark_primed(&mut self) {
        self.primed = true;
    }

    /// Returns the recorded modification time of `path`.
    #[inline]
    #[must_use]
    pub fn get(&self, path: &Utf8Path) -> Option<SystemTime> {
        self.entries.get(path).copied()
    }

    /// Returns `true` if `path` is tracked.
    #[inline]
    #[must_use]
    pub fn contains(&self, path: &Utf8Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Records `mtime` for `path`, returning the previous value.
    pub fn insert(&mut self, path: Utf8PathBuf, mtime: SystemTime) -> Option<SystemTime> {
        self.entries.insert(path, mtime)
    }

    /// Stops tracking `path`, returning its last recorded time.
    pub fn remove(&mut self, path: &Utf8Path) -> Option<SystemTime> {
        self.entries.remove(path)
    }

    /// Iterates over the tracked paths in no particular order.
    pub fn paths(&self) -> impl Iterator<Item = &Utf8Path> {
        self.entries.keys().map(Utf8PathBuf::as_path)
    }

    /// Iterates over `(path, mtime)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&Utf8Path, SystemTime)> {
        self.entries.iter().map(|(path, mtime)| (path.as_path(), *mtime))
    }
}

impl<'a> IntoIterator for &'a Bucket {
    type Item = (&'a Utf8PathBuf, &'a SystemTime);
    type IntoIter = std::collections::hash_map::Iter<'a, Utf8PathBuf, SystemTime>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
