//! The change event handed to event sinks.
//!
//! # Event Flow
//!
//! ```text
//! poll (tend + scan)
//!        │
//!        ▼
//!   Event created
//!        │
//!        ▼
//!   EventSink::send (inline, in traversal order)
//! ```

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use super::kind::{Effect, PathKind};

/// One detected change.
///
/// Events are built by the scanner and the store maintainer, passed by value
/// to the sink, and never retained by the engine afterwards.
///
/// # Examples
///
/// ```
/// use pw_core::{Effect, Event, PathKind};
/// use camino::Utf8PathBuf;
///
/// let event = Event::new(Utf8PathBuf::from("/tmp/d/b"), Effect::Create, PathKind::File);
/// assert_eq!(event.to_string(), "create file /tmp/d/b");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// The path that changed.
    pub path: Utf8PathBuf,

    /// What happened to it.
    pub effect: Effect,

    /// What kind of entry it is.
    pub kind: PathKind,
}

impl Event {
    /// Creates a new event.
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>, effect: Effect, kind: PathKind) -> Self {
        Self {
            path: path.into(),
            effect,
            kind,
        }
    }

    /// Returns the path as a borrowed [`Utf8Path`].
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Consumes the event, returning its path.
    #[inline]
    #[must_use]
    pub fn into_path(self) -> Utf8PathBuf {
        self.path
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.effect, self.kind, self.path)
    }
}
