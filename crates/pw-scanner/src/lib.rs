//! Snapshot store, tree scanner, and store maintenance for polling watchers.
//!
//! A polling watcher cannot be told what changed; it has to look. This crate
//! does the looking. Each poll is two steps over one [`Bucket`]:
//!
//! 1. [`tend`] populates the bucket on the first poll of a session and prunes
//!    paths that no longer exist on every later one.
//! 2. [`scan`] walks the watch root and diffs what it finds against the
//!    bucket, emitting an [`Event`](pw_core::Event) for every difference.
//!
//! Events are handed to an [`EventSink`] as soon as they are found. Any
//! `FnMut(Event)` closure is a sink.
//!
//! # Example
//!
//! ```no_run
//! use pw_core::TraversalConfig;
//! use pw_scanner::{Bucket, scan, tend};
//! use camino::Utf8Path;
//!
//! let root = Utf8Path::new("./src");
//! let traversal = TraversalConfig::default();
//! let mut bucket = Bucket::new();
//! let mut print = |event| println!("{event}");
//!
//! let mut tally = tend(root, &mut bucket, &mut print, traversal)?;
//! tally += scan(root, &mut bucket, &mut print, traversal)?;
//! println!("{} events", tally.events());
//! # Ok::<(), pw_scanner::ScanError>(())
//! ```
//!
//! # Crate Dependencies
//!
//! ```text
//! pw-cli ──► pw-watcher ──► pw-scanner ──► pw-core
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod bucket;
mod error;
mod scan;
mod sink;
pub mod stat;
mod stats;
mod tend;
mod walker;

#[cfg(test)]
mod test_support;

pub use bucket::Bucket;
pub use error::{ScanError, StatError};
pub use scan::{Absence, DirOutcome, FileOutcome, scan, scan_directory, scan_file};
pub use sink::EventSink;
pub use stats::ScanTally;
pub use tend::{initialize, prune, tend};
pub use walker::{TreeWalker, Walk, WalkEntry};
