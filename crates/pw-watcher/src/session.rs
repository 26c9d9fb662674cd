//! The polling watch session.
//!
//! A [`PollSession`] owns one snapshot store and drives it through
//! tend + scan cycles until it is told to stop or a cycle fails.
//!
//! # State Machine
//!
//! ```text
//!             poll ok, alive set
//!             ┌──────────────┐
//!             ▼              │
//!        ┌─────────┐ ────────┘
//!   ───► │ Running │ ── alive cleared ──► StoppedOk
//!        └─────────┘
//!             │
//!             └── tend or scan failed ──► StoppedError
//! ```
//!
//! Both stopped states are terminal. A failed session is never retried;
//! start a new one instead.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use camino::{Utf8Path, Utf8PathBuf};
use pw_core::{Event, WatchConfig};
use pw_scanner::{Bucket, EventSink, ScanTally, scan, tend};

use crate::error::WatchError;

/// Where a [`PollSession`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Polling.
    Running,
    /// Stopped because the liveness flag was cleared.
    StoppedOk,
    /// Stopped because a tend or scan failed.
    StoppedError,
}

impl SessionState {
    /// Returns `true` for either stopped state.
    #[inline]
    #[must_use]
    pub const fn is_stopped(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// One watch session over one root.
///
/// The session can be driven one cycle at a time with [`PollSession::poll`],
/// or handed to [`PollSession::run`] to poll on the configured interval.
///
/// # Examples
///
/// ```no_run
/// use pw_core::WatchConfig;
/// use pw_watcher::PollSession;
///
/// let mut session = PollSession::new("./src", WatchConfig::default());
/// let tally = session.poll(&mut |event| println!("{event}"))?;
/// println!("{} events", tally.events());
/// # Ok::<(), pw_watcher::WatchError>(())
/// ```
#[derive(Debug)]
pub struct PollSession {
    root: Utf8PathBuf,
    bucket: Bucket,
    config: WatchConfig,
    state: SessionState,
    polls: u64,
}

impl PollSession {
    /// Creates a running session with an empty store. Nothing is read from
    /// disk until the first poll.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>, config: WatchConfig) -> Self {
        Self {
            root: root.into(),
            bucket: Bucket::new(),
            config,
            state: SessionState::Running,
            polls: 0,
        }
    }

    /// Returns the watch root.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns the current lifecycle state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the snapshot store.
    #[inline]
    #[must_use]
    pub const fn bucket(&self) -> &Bucket {
        &self.bucket
    }

    /// Returns the number of completed polls.
    #[inline]
    #[must_use]
    pub const fn polls(&self) -> u64 {
        self.polls
    }

    /// Runs one tend + scan cycle, delivering every event to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Stopped`] if the session has already stopped.
    /// Returns [`WatchError::Tend`] or [`WatchError::Scan`] if the cycle
    /// failed, after moving the session to [`SessionState::StoppedError`].
    pub fn poll<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Result<ScanTally, WatchError> {
        if self.state.is_stopped() {
            return Err(WatchError::Stopped);
        }

        let traversal = self.config.traversal;
        let mut tally = match tend(&self.root, &mut self.bucket, sink, traversal) {
            Ok(tally) => tally,
            Err(err) => return Err(self.fail(WatchError::Tend(err))),
        };
        match scan(&self.root, &mut self.bucket, sink, traversal) {
            Ok(scanned) => tally += scanned,
            Err(err) => return Err(self.fail(WatchError::Scan(err))),
        }

        self.polls += 1;
        tracing::debug!(
            root = %self.root,
            poll = self.polls,
            created = tally.created,
            modified = tally.modified,
            destroyed = tally.destroyed,
            unchanged = tally.unchanged,
            "Poll complete"
        );
        Ok(tally)
    }

    /// Polls until `alive` is cleared or a poll fails.
    ///
    /// The flag is checked after each poll, so the session always polls at
    /// least once and stops at most one interval plus one poll after the flag
    /// is cleared.
    ///
    /// # Errors
    ///
    /// Returns the error of the failing poll; see [`PollSession::poll`].
    pub fn run<S: EventSink + ?Sized>(
        &mut self,
        sink: &mut S,
        alive: &AtomicBool,
    ) -> Result<(), WatchError> {
        let interval = self.config.poll_interval();
        tracing::info!(
            root = %self.root,
            interval_ms = self.config.poll_interval_ms,
            "Watch session started"
        );

        loop {
            if let Err(err) = self.poll(sink) {
                tracing::warn!(root = %self.root, error = %err, "Watch session failed");
                return Err(err);
            }
            if !alive.load(Ordering::Acquire) {
                self.state = SessionState::StoppedOk;
                tracing::info!(root = %self.root, polls = self.polls, "Watch session stopped");
                return Ok(());
            }
            if !interval.is_zero() {
                thread::sleep(interval);
            }
        }
    }

    fn fail(&mut self, err: WatchError) -> WatchError {
        self.state = SessionState::StoppedError;
        err
    }
}

/// Watches `root` on the default 16 ms interval, calling `on_event` for every
/// change, until `alive` is cleared.
///
/// Returns `true` if the session stopped because `alive` was cleared and
/// `false` if it stopped because the root could not be tended or scanned, for
/// example because it did not exist. `on_event` runs on the calling thread
/// and is never called after this function returns.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use camino::Utf8Path;
///
/// let alive = Arc::new(AtomicBool::new(true));
/// let flag = Arc::clone(&alive);
/// let handle = std::thread::spawn(move || {
///     pw_watcher::watch(Utf8Path::new("./src"), |event| println!("{event}"), &flag)
/// });
///
/// alive.store(false, Ordering::Release);
/// let stopped_cleanly = handle.join().unwrap_or(false);
/// ```
pub fn watch(root: &Utf8Path, on_event: impl FnMut(Event), alive: &AtomicBool) -> bool {
    watch_with_config(root, on_event, alive, WatchConfig::default())
}

/// Like [`watch`], with explicit options.
pub fn watch_with_config(
    root: &Utf8Path,
    mut on_event: impl FnMut(Event),
    alive: &AtomicBool,
    config: WatchConfig,
) -> bool {
    PollSession::new(root, config)
        .run(&mut on_event, alive)
        .is_ok()
}
