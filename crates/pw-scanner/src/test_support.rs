//! Scratch trees for unit tests.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use filetime::FileTime;
use pw_core::{Effect, Event, PathKind};
use tempfile::TempDir;

/// A temporary directory with UTF-8 helpers.
pub(crate) struct Tree {
    _temp: TempDir,
    root: Utf8PathBuf,
}

impl Tree {
    pub(crate) fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("Invalid path");
        Self { _temp: temp, root }
    }

    pub(crate) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(crate) fn path(&self, rel: &str) -> Utf8PathBuf {
        self.root.join(rel)
    }

    /// Writes `rel` with a fixed modification time of `secs` since the epoch.
    pub(crate) fn write(&self, rel: &str, secs: i64) -> Utf8PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent");
        }
        fs::write(&path, rel).expect("Failed to write file");
        self.touch(rel, secs);
        path
    }

    pub(crate) fn touch(&self, rel: &str, secs: i64) {
        filetime::set_file_mtime(self.path(rel), FileTime::from_unix_time(secs, 0))
            .expect("Failed to set mtime");
    }

    pub(crate) fn mkdir(&self, rel: &str) -> Utf8PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(&path).expect("Failed to create directory");
        path
    }

    pub(crate) fn remove(&self, rel: &str) {
        let path = self.path(rel);
        if path.is_dir() {
            fs::remove_dir_all(&path).expect("Failed to remove directory");
        } else {
            fs::remove_file(&path).expect("Failed to remove file");
        }
    }
}

pub(crate) fn event(path: &Utf8Path, effect: Effect, kind: PathKind) -> Event {
    Event::new(path, effect, kind)
}

/// Sorts events by path so assertions do not depend on readdir order.
pub(crate) fn sorted(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by(|a, b| a.path.cmp(&b.path));
    events
}
