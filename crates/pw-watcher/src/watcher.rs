//! Async handle over a polling watch session.
//!
//! This module provides the [`PollWatcher`] type that runs a blocking
//! [`Backend`](crate::Backend) on tokio's blocking pool and streams its
//! events to async code.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Blocking Thread (spawn_blocking)             │
//! │  ┌──────────────────┐    ┌────────────────┐    ┌────────────┐  │
//! │  │ PollSession      │ -> │ tend + scan    │ -> │ Sink       │  │
//! │  │ (16ms interval)  │    │ (Bucket diff)  │    │ (closure)  │  │
//! │  └──────────────────┘    └────────────────┘    └─────┬──────┘  │
//! └──────────────────────────────────────────────────────│─────────┘
//!                                                        │
//!                                          blocking_send │
//!                                                        ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Async Runtime (tokio)                        │
//! │  ┌──────────────────┐    ┌────────────────┐                     │
//! │  │ PollWatcher      │    │ mpsc::Receiver │ -> consumer         │
//! │  │ (alive flag)     │    │ (events)       │                     │
//! │  └──────────────────┘    └────────────────┘                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The channel is bounded. When the consumer falls behind, the session
//! blocks on send and polling slows down with it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use pw_core::{ConfigError, Event, WatchConfig};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::backend::{self, Backend};
use crate::error::WatchError;

/// A polling watcher that streams events to an async context.
///
/// # Lifecycle
///
/// 1. **Creation**: `PollWatcher::new()` validates the options and the path,
///    creates the channel, and spawns a blocking task running the session.
///
/// 2. **Event Reception**: Use `recv()` or `try_recv()`. The channel closes
///    when the session ends, whether it was stopped or failed.
///
/// 3. **Shutdown**: Call `shutdown()` to stop the session and collect its
///    result, or drop the watcher. Dropping clears the liveness flag; the
///    session ends after its current poll.
///
/// # Examples
///
/// ```no_run
/// use pw_watcher::PollWatcher;
/// use pw_core::WatchConfig;
/// use camino::Utf8Path;
///
/// # async fn example() -> Result<(), pw_watcher::WatchError> {
/// let mut watcher = PollWatcher::new(Utf8Path::new("./src"), &WatchConfig::default()).await?;
///
/// while let Some(event) = watcher.recv().await {
///     println!("{event}");
/// }
///
/// watcher.shutdown().await
/// # }
/// ```
pub struct PollWatcher {
    /// Liveness flag shared with the session. Cleared to request a stop.
    alive: Arc<AtomicBool>,

    /// Handle to the blocking session task.
    ///
    /// Taken when the watcher is shut down.
    task_handle: Option<JoinHandle<Result<(), WatchError>>>,

    /// Event receiver for async consumption.
    event_rx: mpsc::Receiver<Event>,

    /// The canonical path being watched.
    watch_path: Utf8PathBuf,
}

impl std::fmt::Debug for PollWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollWatcher")
            .field("watch_path", &self.watch_path)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl PollWatcher {
    /// Starts watching `path`.
    ///
    /// The path is canonicalized first, so events carry absolute paths.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Config`] if the options are invalid,
    /// [`WatchError::PathNotFound`] if the path doesn't exist, and
    /// [`WatchError::Io`] if it cannot be canonicalized.
    #[allow(clippy::unused_async)] // Async for API consistency with shutdown()
    pub async fn new(path: &Utf8Path, config: &WatchConfig) -> Result<Self, WatchError> {
        config.validate()?;
        Self::with_backend(path, backend::recommended(config), config.channel_capacity)
    }

    /// Starts watching `path` with a specific backend.
    ///
    /// # Errors
    ///
    /// Same as [`PollWatcher::new`].
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn with_backend(
        path: &Utf8Path,
        backend: Box<dyn Backend>,
        channel_capacity: usize,
    ) -> Result<Self, WatchError> {
        if channel_capacity == 0 {
            return Err(ConfigError::invalid_option(
                "watch.channel_capacity",
                "must be greater than zero",
            )
            .into());
        }
        if !path.exists() {
            return Err(WatchError::path_not_found(path));
        }
        let watch_path = path.canonicalize_utf8()?;

        let (event_tx, event_rx) = mpsc::channel(channel_capacity);
        let alive = Arc::new(AtomicBool::new(true));

        let task_path = watch_path.clone();
        let task_alive = Arc::clone(&alive);
        let task_handle = tokio::task::spawn_blocking(move || {
            run_session(backend.as_ref(), &task_path, &event_tx, &task_alive)
        });

        Ok(Self {
            alive,
            task_handle: Some(task_handle),
            event_rx,
            watch_path,
        })
    }

    /// Receives the next event.
    ///
    /// Returns `None` once the session has ended and every event it sent has
    /// been received.
    pub async fn recv(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }

    /// Tries to receive an event without waiting.
    pub fn try_recv(&mut self) -> Result<Event, mpsc::error::TryRecvError> {
        self.event_rx.try_recv()
    }

    /// Returns a mutable reference to the event receiver, for use with
    /// `tokio::select!`.
    pub fn events(&mut self) -> &mut mpsc::Receiver<Event> {
        &mut self.event_rx
    }

    /// Returns the canonical path being watched.
    #[must_use]
    pub fn watch_path(&self) -> &Utf8Path {
        &self.watch_path
    }

    /// Returns `true` while the session is polling.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.alive.load(Ordering::Acquire)
            && self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the session and waits for it to finish.
    ///
    /// Events not yet received are discarded.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the session, if it failed before it
    /// was stopped, or [`WatchError::ChannelClosed`] if the session task
    /// panicked.
    pub async fn shutdown(mut self) -> Result<(), WatchError> {
        self.alive.store(false, Ordering::Release);
        // Closing the receiver fails any send the session is blocked on.
        self.event_rx.close();

        if let Some(handle) = self.task_handle.take() {
            match handle.await {
                Ok(result) => result?,
                Err(_join_error) => return Err(WatchError::ChannelClosed),
            }
        }

        Ok(())
    }
}

impl Drop for PollWatcher {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
    }
}

/// Runs a backend on the blocking pool, forwarding its events to the channel.
fn run_session(
    backend: &dyn Backend,
    path: &Utf8Path,
    event_tx: &mpsc::Sender<Event>,
    alive: &AtomicBool,
) -> Result<(), WatchError> {
    tracing::info!(path = %path, backend = backend.name(), "Watcher started");

    let mut forward = |event: Event| {
        if event_tx.blocking_send(event).is_err() && alive.swap(false, Ordering::AcqRel) {
            tracing::debug!("Event channel closed, stopping watcher");
        }
    };
    let result = backend.watch(path, &mut forward, alive);

    match &result {
        Ok(()) => tracing::info!(path = %path, "Watcher stopped"),
        Err(err) => tracing::warn!(path = %path, error = %err, "Watcher failed"),
    }
    result
}
