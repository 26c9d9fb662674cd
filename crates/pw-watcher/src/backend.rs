//! Watch backends.
//!
//! A [`Backend`] turns a root and a liveness flag into a stream of events on
//! the calling thread. The only implementation shipped here is
//! [`PollBackend`], which works on every filesystem because it needs nothing
//! from the OS beyond `stat` and `readdir`.

use std::sync::atomic::AtomicBool;

use camino::Utf8Path;
use pw_core::WatchConfig;
use pw_scanner::EventSink;

use crate::error::WatchError;
use crate::session::PollSession;

/// A way of watching a path for changes.
///
/// Implementations block the calling thread until `alive` is cleared or the
/// watch fails, delivering events to `sink` as they are found.
pub trait Backend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Watches `root` until `alive` is cleared.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the watch.
    fn watch(
        &self,
        root: &Utf8Path,
        sink: &mut dyn EventSink,
        alive: &AtomicBool,
    ) -> Result<(), WatchError>;
}

/// Detects changes by diffing periodic snapshots of the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollBackend {
    config: WatchConfig,
}

impl PollBackend {
    /// Creates a poll backend with the given options.
    #[must_use]
    pub const fn new(config: WatchConfig) -> Self {
        Self { config }
    }

    /// Returns the options this backend runs sessions with.
    #[must_use]
    pub const fn config(&self) -> &WatchConfig {
        &self.config
    }
}

impl Backend for PollBackend {
    fn name(&self) -> &'static str {
        "poll"
    }

    fn watch(
        &self,
        root: &Utf8Path,
        sink: &mut dyn EventSink,
        alive: &AtomicBool,
    ) -> Result<(), WatchError> {
        PollSession::new(root, self.config).run(sink, alive)
    }
}

/// Returns the best backend available for this platform.
#[must_use]
pub fn recommended(config: &WatchConfig) -> Box<dyn Backend> {
    Box::new(PollBackend::new(*config))
}
