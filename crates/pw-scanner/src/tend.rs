//! Store maintenance.
//!
//! Before every scan the bucket is tended: populated from the root on the
//! first poll of a session, pruned of vanished paths on every later poll.
//! Population emits no events; the files it records are the baseline the
//! scanner diffs against.

use std::time::SystemTime;

use camino::{Utf8Path, Utf8PathBuf};
use pw_core::{Effect, Event, PathKind, TraversalConfig};
use smallvec::SmallVec;

use crate::bucket::Bucket;
use crate::error::{ScanError, StatError};
use crate::stat;
use crate::sink::{EventSink, emit};
use crate::stats::ScanTally;
use crate::walker::TreeWalker;

/// Populates an unprimed bucket from `root`, returning how many files were
/// recorded.
///
/// A directory root records every regular file below it. Entries the walk
/// cannot reach are left out; the scanner reports them as created once they
/// become visible. An entry whose modification time cannot be read is
/// recorded with the root's time instead. A file root records itself.
///
/// # Errors
///
/// Returns [`ScanError::RootNotFound`] if nothing exists at `root`, and
/// [`ScanError::Stat`] if the root cannot be inspected.
pub fn initialize(
    root: &Utf8Path,
    bucket: &mut Bucket,
    traversal: TraversalConfig,
) -> Result<usize, ScanError> {
    let kind = match stat::kind(root) {
        Ok(PathKind::Symlink) | Err(StatError::NotFound(_)) => {
            return Err(ScanError::root_not_found(root));
        }
        Ok(kind) => kind,
        Err(err) => return Err(err.into()),
    };

    let recorded = match kind {
        PathKind::Dir => populate_dir(root, bucket, traversal),
        PathKind::File => {
            let mtime = stat::modified(root).map_err(|err| {
                if err.is_not_found() {
                    ScanError::root_not_found(root)
                } else {
                    err.into()
                }
            })?;
            bucket.insert(root.to_owned(), mtime);
            1
        }
        PathKind::Symlink | PathKind::Other => 0,
    };

    bucket.mark_primed();
    tracing::debug!(root = %root, kind = %kind, files = recorded, "Initialized bucket");
    Ok(recorded)
}

fn populate_dir(root: &Utf8Path, bucket: &mut Bucket, traversal: TraversalConfig) -> usize {
    let fallback = stat::modified(root).ok();
    let mut recorded = 0;

    for entry in TreeWalker::new(root, traversal).walk() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(root = %root, error = %err, "Skipping entry during initialization");
                continue;
            }
        };
        if !entry.kind.is_file() {
            continue;
        }
        if let Some(mtime) = entry_mtime(&entry.path, fallback) {
            bucket.insert(entry.path, mtime);
            recorded += 1;
        }
    }

    recorded
}

/// An entry's own modification time, or `fallback` when it cannot be read.
/// Entries that vanished are not recorded at all.
fn entry_mtime(path: &Utf8Path, fallback: Option<SystemTime>) -> Option<SystemTime> {
    match stat::modified(path) {
        Ok(mtime) => Some(mtime),
        Err(StatError::NotFound(_)) => None,
        Err(err) => {
            tracing::debug!(path = %path, error = %err, "Using root modification time");
            fallback
        }
    }
}

/// Drops every tracked path that no longer exists, emitting a destroy event
/// for each. Returns the number of paths dropped.
///
/// Destroy events carry the root's current kind, not the kind the dropped
/// path had; [`PathKind::Other`] if the root itself cannot be inspected.
/// Paths whose existence cannot be determined are kept.
pub fn prune<S: EventSink + ?Sized>(root: &Utf8Path, bucket: &mut Bucket, sink: &mut S) -> usize {
    let vanished: SmallVec<[Utf8PathBuf; 8]> = bucket
        .paths()
        .filter(|path| match stat::exists(path) {
            Ok(exists) => !exists,
            Err(err) => {
                tracing::debug!(path = %path, error = %err, "Keeping entry that cannot be inspected");
                false
            }
        })
        .map(Utf8Path::to_path_buf)
        .collect();

    if vanished.is_empty() {
        return 0;
    }

    let kind = stat::kind(root).unwrap_or(PathKind::Other);
    for path in &vanished {
        bucket.remove(path);
    }
    let pruned = vanished.len();
    for path in vanished {
        emit(sink, Event::new(path, Effect::Destroy, kind));
    }

    pruned
}

/// Brings the bucket up to date before a scan.
///
/// Initializes an unprimed bucket, prunes a primed one. The returned tally
/// counts the destroy events emitted by pruning.
///
/// # Errors
///
/// Fails only when initialization fails; see [`initialize`].
pub fn tend<S: EventSink + ?Sized>(
    root: &Utf8Path,
    bucket: &mut Bucket,
    sink: &mut S,
    traversal: TraversalConfig,
) -> Result<ScanTally, ScanError> {
    if bucket.is_primed() {
        let destroyed = prune(root, bucket, sink);
        Ok(ScanTally {
            destroyed,
            ..ScanTally::default()
        })
    } else {
        initialize(root, bucket, traversal)?;
        Ok(ScanTally::default())
    }
}
