//! Polling watch sessions with blocking and async event streaming.
//!
//! This crate turns the one-shot tend + scan steps of `pw-scanner` into a
//! watch that runs until it is told to stop.
//!
//! # Overview
//!
//! - [`watch`]: blocks the calling thread, polling every 16 ms and calling a
//!   closure per event, until a shared flag is cleared. Returns `true` on a
//!   requested stop and `false` when the root could not be watched.
//! - [`PollSession`]: the state machine behind [`watch`], usable one poll at
//!   a time.
//! - [`Backend`]: the seam between "how changes are detected" and the
//!   consumers above it. [`PollBackend`] is the implementation used
//!   everywhere.
//! - [`PollWatcher`]: runs a session on tokio's blocking pool and streams
//!   its events through a bounded channel.
//!
//! # Crate Dependencies
//!
//! ```text
//! pw-cli ──► pw-watcher ──► pw-scanner ──► pw-core
//! ```
//!
//! # Usage
//!
//! ## Blocking
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use camino::Utf8Path;
//!
//! let alive = AtomicBool::new(true);
//! let stopped_cleanly = pw_watcher::watch(
//!     Utf8Path::new("./src"),
//!     |event| println!("{event}"),
//!     &alive,
//! );
//! ```
//!
//! ## Using with `tokio::select!`
//!
//! ```no_run
//! use pw_watcher::PollWatcher;
//! use pw_core::WatchConfig;
//! use camino::Utf8Path;
//!
//! # async fn example() -> Result<(), pw_watcher::WatchError> {
//! let mut watcher = PollWatcher::new(Utf8Path::new("./src"), &WatchConfig::default()).await?;
//!
//! loop {
//!     tokio::select! {
//!         event = watcher.recv() => match event {
//!             Some(event) => println!("{event}"),
//!             None => break,
//!         },
//!         _ = tokio::signal::ctrl_c() => break,
//!     }
//! }
//!
//! watcher.shutdown().await
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod backend;
mod error;
mod session;
mod watcher;

pub use backend::{Backend, PollBackend, recommended};
pub use error::WatchError;
pub use session::{PollSession, SessionState, watch, watch_with_config};
pub use watcher::PollWatcher;
