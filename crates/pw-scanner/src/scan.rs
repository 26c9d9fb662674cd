//! The per-poll scanner.
//!
//! Compares the live filesystem under the watch root with the [`Bucket`],
//! emits create/modify/destroy events for every difference, and leaves the
//! bucket describing what was just observed.
//!
//! # Flow
//!
//! ```text
//! scan(root)
//!   ├── scan_directory(root) ── not a directory ──┐
//!   │       │                                      ▼
//!   │       └── scan_file(entry) per file    scan_file(root)
//!   │                                              │
//!   └── Ok(tally)                   not scannable ─┴─► Err(ScanError)
//! ```
//!
//! Trying the directory first and the file second lets a root that flips
//! between file and directory across polls go through the same path.

use camino::Utf8Path;
use pw_core::{Effect, Event, PathKind, TraversalConfig};

use crate::bucket::Bucket;
use crate::error::{ScanError, StatError};
use crate::stat;
use crate::sink::{EventSink, emit};
use crate::stats::ScanTally;
use crate::walker::TreeWalker;

/// Why a path could not be scanned as a regular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absence {
    /// Nothing exists at the path.
    Missing,
    /// The path looked like a file but changed while it was being examined.
    Raced,
    /// The path exists but may not be inspected.
    Unreadable,
    /// The path exists but is not a regular file.
    NotRegular(PathKind),
}

/// The result of [`scan_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// The file was new; a create event was emitted.
    Created,
    /// The file's modification time changed; a modify event was emitted.
    Modified,
    /// The file is tracked and unchanged.
    Unchanged,
    /// The path is not a scannable regular file.
    Gone {
        /// What was found instead.
        absence: Absence,
        /// Whether a destroy event was emitted. Tracked paths are dropped
        /// with one; a race emits one even for an untracked path.
        destroyed: bool,
    },
}

impl FileOutcome {
    /// Returns `true` if the path was scanned as a regular file.
    #[inline]
    #[must_use]
    pub const fn is_scanned(self) -> bool {
        !matches!(self, Self::Gone { .. })
    }
}

/// The result of [`scan_directory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirOutcome {
    /// The directory was walked to completion.
    Scanned(ScanTally),
    /// The path is not a directory.
    NotDirectory,
}

/// Scans a single file.
///
/// A file that is missing or no longer a regular file when examined is
/// dropped from the bucket, with a destroy event if it was tracked. A file
/// whose modification time cannot be read after it was seen is treated as
/// destroyed mid-examination. A file that may not be inspected is left alone.
/// Otherwise its modification time is compared against the bucket: absent
/// files are created, changed timestamps are modified, equal timestamps are
/// ignored.
pub fn scan_file<S: EventSink + ?Sized>(
    path: &Utf8Path,
    bucket: &mut Bucket,
    sink: &mut S,
) -> FileOutcome {
    match stat::kind(path) {
        Ok(PathKind::File) => {}
        Ok(kind) => return forget(path, bucket, sink, Absence::NotRegular(kind)),
        Err(StatError::NotFound(_)) => return forget(path, bucket, sink, Absence::Missing),
        Err(StatError::PermissionDenied(_)) => return unreadable(path),
        Err(err) => {
            tracing::debug!(path = %path, error = %err, "Could not inspect file");
            return forget(path, bucket, sink, Absence::Raced);
        }
    }

    let mtime = match stat::modified(path) {
        Ok(mtime) => mtime,
        Err(StatError::PermissionDenied(_)) => return unreadable(path),
        Err(err) => {
            tracing::debug!(path = %path, error = %err, "File changed while being examined");
            return forget(path, bucket, sink, Absence::Raced);
        }
    };

    match bucket.get(path) {
        None => {
            bucket.insert(path.to_owned(), mtime);
            emit(sink, Event::new(path, Effect::Create, PathKind::File));
            FileOutcome::Created
        }
        Some(previous) if previous != mtime => {
            bucket.insert(path.to_owned(), mtime);
            emit(sink, Event::new(path, Effect::Modify, PathKind::File));
            FileOutcome::Modified
        }
        Some(_) => FileOutcome::Unchanged,
    }
}

/// Drops `path` from the bucket, emitting a destroy event if it was tracked
/// or if it vanished while being examined.
fn forget<S: EventSink + ?Sized>(
    path: &Utf8Path,
    bucket: &mut Bucket,
    sink: &mut S,
    absence: Absence,
) -> FileOutcome {
    let tracked = bucket.remove(path).is_some();
    let destroyed = tracked || absence == Absence::Raced;
    if destroyed {
        emit(sink, Event::new(path, Effect::Destroy, PathKind::File));
    }
    FileOutcome::Gone { absence, destroyed }
}

/// Leaves an uninspectable path as it is in the bucket.
fn unreadable(path: &Utf8Path) -> FileOutcome {
    tracing::trace!(path = %path, "Skipping unreadable file");
    FileOutcome::Gone {
        absence: Absence::Unreadable,
        destroyed: false,
    }
}

/// Scans a directory tree.
///
/// Every regular file found is passed to [`scan_file`], as is every tracked
/// path that is no longer a regular file. An enumeration error aborts the
/// walk: entries already visited stay updated in the bucket, the rest wait
/// for the next poll. The directory disappearing once the walk has started
/// is reported as [`ScanError::RootVanished`].
pub fn scan_directory<S: EventSink + ?Sized>(
    path: &Utf8Path,
    bucket: &mut Bucket,
    sink: &mut S,
    traversal: TraversalConfig,
) -> Result<DirOutcome, ScanError> {
    if !matches!(stat::kind(path), Ok(PathKind::Dir)) {
        return Ok(DirOutcome::NotDirectory);
    }

    let mut tally = ScanTally::default();
    for entry in TreeWalker::new(path, traversal).walk() {
        let entry = entry?;
        if !entry.kind.is_file() && !bucket.contains(&entry.path) {
            continue;
        }
        tally.record(scan_file(&entry.path, bucket, sink));
    }

    Ok(DirOutcome::Scanned(tally))
}

/// Scans the watch root, whatever it currently is.
///
/// # Errors
///
/// Returns [`ScanError::RootVanished`] if the root no longer exists,
/// [`ScanError::Unscannable`] if it is neither a directory nor a regular
/// file, [`ScanError::Stat`] if it may not be inspected, and
/// [`ScanError::Walk`] if directory enumeration fails.
pub fn scan<S: EventSink + ?Sized>(
    root: &Utf8Path,
    bucket: &mut Bucket,
    sink: &mut S,
    traversal: TraversalConfig,
) -> Result<ScanTally, ScanError> {
    if let DirOutcome::Scanned(tally) = scan_directory(root, bucket, sink, traversal)? {
        return Ok(tally);
    }

    let outcome = scan_file(root, bucket, sink);
    match outcome {
        FileOutcome::Gone {
            absence: Absence::NotRegular(kind),
            ..
        } => Err(ScanError::unscannable(root, kind)),
        FileOutcome::Gone {
            absence: Absence::Unreadable,
            ..
        } => Err(StatError::PermissionDenied(root.to_owned()).into()),
        FileOutcome::Gone { .. } => Err(ScanError::RootVanished(root.to_owned())),
        FileOutcome::Created | FileOutcome::Modified | FileOutcome::Unchanged => {
            let mut tally = ScanTally::default();
            tally.record(outcome);
            Ok(tally)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Tree, event, sorted};
    use std::fs;

    fn scan_all(tree: &Tree, bucket: &mut Bucket) -> (Result<ScanTally, ScanError>, Vec<Event>) {
        let mut events = Vec::new();
        let result = scan(
            tree.root(),
            bucket,
            &mut |e| events.push(e),
            TraversalConfig::default(),
        );
        (result, events)
    }

    #[test]
    fn test_scan_file_create_modify_unchanged() {
        let tree = Tree::new();
        let file = tree.write("a.txt", 1_000);
        let mut bucket = Bucket::new();
        let mut events = Vec::new();

        let outcome = scan_file(&file, &mut bucket, &mut |e| events.push(e));
        assert_eq!(outcome, FileOutcome::Created);
        assert_eq!(events, vec![event(&file, Effect::Create, PathKind::File)]);

        events.clear();
        let outcome = scan_file(&file, &mut bucket, &mut |e| events.push(e));
        assert_eq!(outcome, FileOutcome::Unchanged);
        assert!(events.is_empty());

        tree.touch("a.txt", 2_000);
        let outcome = scan_file(&file, &mut bucket, &mut |e| events.push(e));
        assert_eq!(outcome, FileOutcome::Modified);
        assert_eq!(events, vec![event(&file, Effect::Modify, PathKind::File)]);
    }

    #[test]
    fn test_scan_file_content_change_without_mtime_change() {
        let tree = Tree::new();
        let file = tree.write("a.txt", 1_000);
        let mut bucket = Bucket::new();
        scan_file(&file, &mut bucket, &mut |_| {});

        fs::write(&file, "different contents").unwrap();
        tree.touch("a.txt", 1_000);

        let mut events = Vec::new();
        let outcome = scan_file(&file, &mut bucket, &mut |e| events.push(e));
        assert_eq!(outcome, FileOutcome::Unchanged);
        assert!(events.is_empty());
    }

    #[test]
    fn test_scan_file_missing_tracked_file_is_destroyed() {
        let tree = Tree::new();
        let file = tree.write("a.txt", 1_000);
        let mut bucket = Bucket::new();
        scan_file(&file, &mut bucket, &mut |_| {});
        tree.remove("a.txt");

        let mut events = Vec::new();
        let outcome = scan_file(&file, &mut bucket, &mut |e| events.push(e));
        assert_eq!(
            outcome,
            FileOutcome::Gone {
                absence: Absence::Missing,
                destroyed: true
            }
        );
        assert_eq!(events, vec![event(&file, Effect::Destroy, PathKind::File)]);
        assert!(bucket.is_empty());
    }

    #[test]
    fn test_scan_file_missing_untracked_file_is_silent() {
        let tree = Tree::new();
        let mut bucket = Bucket::new();
        let mut events = Vec::new();

        let outcome = scan_file(&tree.path("nope"), &mut bucket, &mut |e| events.push(e));
        assert!(!outcome.is_scanned());
        assert!(events.is_empty());
    }

    #[test]
    fn test_forget_race_destroys_untracked_path() {
        let tree = Tree::new();
        let file = tree.path("fleeting.txt");
        let mut bucket = Bucket::new();
        let mut events = Vec::new();

        let outcome = forget(&file, &mut bucket, &mut |e| events.push(e), Absence::Raced);
        assert_eq!(
            outcome,
            FileOutcome::Gone {
                absence: Absence::Raced,
                destroyed: true
            }
        );
        assert_eq!(events, vec![event(&file, Effect::Destroy, PathKind::File)]);
        assert!(bucket.is_empty());

        events.clear();
        let outcome = forget(&file, &mut bucket, &mut |e| events.push(e), Absence::Missing);
        assert_eq!(
            outcome,
            FileOutcome::Gone {
                absence: Absence::Missing,
                destroyed: false
            }
        );
        assert!(events.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_file_unreadable_keeps_entry() {
        use std::os::unix::fs::PermissionsExt;

        let tree = Tree::new();
        let file = tree.write("sub/a.txt", 1_000);
        let sub = tree.path("sub");
        let mut bucket = Bucket::new();
        scan_all(&tree, &mut bucket).0.unwrap();
        assert!(bucket.contains(&file));

        // Listable but not searchable: names are visible, metadata is not.
        fs::set_permissions(&sub, fs::Permissions::from_mode(0o600)).unwrap();
        if fs::metadata(&file).is_ok() {
            fs::set_permissions(&sub, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let mut events = Vec::new();
        let outcome = scan_file(&file, &mut bucket, &mut |e| events.push(e));
        assert_eq!(
            outcome,
            FileOutcome::Gone {
                absence: Absence::Unreadable,
                destroyed: false
            }
        );

        let (result, more) = scan_all(&tree, &mut bucket);
        result.unwrap();
        events.extend(more);
        assert!(events.is_empty());
        assert!(bucket.contains(&file));

        fs::set_permissions(&sub, fs::Permissions::from_mode(0o755)).unwrap();
        let (result, events) = scan_all(&tree, &mut bucket);
        result.unwrap();
        assert!(events.is_empty());
        assert!(bucket.contains(&file));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_unreadable_file_root_fails() {
        use std::os::unix::fs::PermissionsExt;

        let tree = Tree::new();
        let file = tree.write("sub/a.txt", 1_000);
        let sub = tree.path("sub");
        fs::set_permissions(&sub, fs::Permissions::from_mode(0o600)).unwrap();
        if fs::metadata(&file).is_ok() {
            fs::set_permissions(&sub, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let mut bucket = Bucket::new();
        let result = scan(&file, &mut bucket, &mut |_| {}, TraversalConfig::default());
        fs::set_permissions(&sub, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(
            result,
            Err(ScanError::Stat(StatError::PermissionDenied(_)))
        ));
        assert!(bucket.is_empty());
    }

    #[test]
    fn test_scan_file_on_directory_is_not_regular() {
        let tree = Tree::new();
        let dir = tree.mkdir("sub");
        let mut bucket = Bucket::new();

        let outcome = scan_file(&dir, &mut bucket, &mut |_| {});
        assert_eq!(
            outcome,
            FileOutcome::Gone {
                absence: Absence::NotRegular(PathKind::Dir),
                destroyed: false
            }
        );
    }

    #[test]
    fn test_scan_directory_not_a_directory() {
        let tree = Tree::new();
        let file = tree.write("f", 1);
        let mut bucket = Bucket::new();

        let outcome =
            scan_directory(&file, &mut bucket, &mut |_| {}, TraversalConfig::default()).unwrap();
        assert_eq!(outcome, DirOutcome::NotDirectory);

        let missing = tree.path("missing");
        let outcome =
            scan_directory(&missing, &mut bucket, &mut |_| {}, TraversalConfig::default())
                .unwrap();
        assert_eq!(outcome, DirOutcome::NotDirectory);
    }

    #[test]
    fn test_scan_directory_creates_every_file_once() {
        let tree = Tree::new();
        let a = tree.write("a.txt", 1);
        let b = tree.write("sub/b.txt", 2);
        let c = tree.write("sub/deeper/c.txt", 3);
        let mut bucket = Bucket::new();

        let (result, events) = scan_all(&tree, &mut bucket);
        let tally = result.unwrap();
        assert_eq!(tally.created, 3);
        assert_eq!(
            sorted(events),
            vec![
                event(&a, Effect::Create, PathKind::File),
                event(&b, Effect::Create, PathKind::File),
                event(&c, Effect::Create, PathKind::File),
            ]
        );
        assert_eq!(bucket.len(), 3);

        let (result, events) = scan_all(&tree, &mut bucket);
        assert_eq!(result.unwrap().unchanged, 3);
        assert!(events.is_empty());
    }

    #[test]
    fn test_scan_root_file() {
        let tree = Tree::new();
        let file = tree.write("f", 10);
        let mut bucket = Bucket::new();
        let mut events = Vec::new();

        let tally = scan(&file, &mut bucket, &mut |e| events.push(e), TraversalConfig::default())
            .unwrap();
        assert_eq!(tally.created, 1);
        assert_eq!(events, vec![event(&file, Effect::Create, PathKind::File)]);
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let tree = Tree::new();
        let mut bucket = Bucket::new();
        let err = scan(
            &tree.path("gone"),
            &mut bucket,
            &mut |_| {},
            TraversalConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ScanError::RootVanished(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_special_file_root_fails() {
        let mut bucket = Bucket::new();
        let err = scan(
            Utf8Path::new("/dev/null"),
            &mut bucket,
            &mut |_| {},
            TraversalConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScanError::Unscannable {
                kind: PathKind::Other,
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_walk_error_keeps_visited_entries() {
        use std::os::unix::fs::PermissionsExt;

        let tree = Tree::new();
        tree.write("a.txt", 1);
        tree.write("b/b.txt", 2);
        let secret = tree.write("locked/secret.txt", 3);
        let locked = tree.path("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users read through permission bits; nothing to test then.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let strict = TraversalConfig {
            skip_permission_denied: false,
            ..TraversalConfig::default()
        };
        let mut bucket = Bucket::new();
        let mut events = Vec::new();
        let result = scan(tree.root(), &mut bucket, &mut |e| events.push(e), strict);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        // Readdir order decides how much was visited before the abort.
        assert!(matches!(result, Err(ScanError::Walk(_))));
        assert_eq!(events.len(), bucket.len());
        for e in &events {
            assert_eq!(e.effect, Effect::Create);
            assert!(bucket.contains(&e.path));
        }
        assert!(!bucket.contains(&secret));
    }

    #[test]
    fn test_scan_tracked_file_replaced_by_directory() {
        let tree = Tree::new();
        let a = tree.write("a", 1);
        let mut bucket = Bucket::new();
        scan_all(&tree, &mut bucket).0.unwrap();

        tree.remove("a");
        let inner = tree.write("a/inner.txt", 2);

        let (result, events) = scan_all(&tree, &mut bucket);
        result.unwrap();
        assert!(events.contains(&event(&a, Effect::Destroy, PathKind::File)));
        assert!(events.contains(&event(&inner, Effect::Create, PathKind::File)));
        assert!(!bucket.contains(&a));
        assert!(bucket.contains(&inner));
    }

    #[test]
    fn test_scan_root_flips_from_file_to_directory() {
        let tree = Tree::new();
        let root = tree.write("root", 1);
        let mut bucket = Bucket::new();
        scan(&root, &mut bucket, &mut |_| {}, TraversalConfig::default()).unwrap();

        tree.remove("root");
        let child = tree.write("root/child", 2);

        let mut events = Vec::new();
        scan(&root, &mut bucket, &mut |e| events.push(e), TraversalConfig::default()).unwrap();
        assert_eq!(
            sorted(events),
            vec![
                event(&root, Effect::Destroy, PathKind::File),
                event(&child, Effect::Create, PathKind::File),
            ]
        );
        assert_eq!(bucket.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_follows_symlinked_files() {
        let tree = Tree::new();
        let target = tree.write("target.txt", 1);
        let link = tree.path("link.txt");
        std::os::unix::fs::symlink(&target, &link).unwrap();
        let mut bucket = Bucket::new();

        scan_all(&tree, &mut bucket).0.unwrap();
        assert!(bucket.contains(&target));
        assert!(bucket.contains(&link));
    }
}
