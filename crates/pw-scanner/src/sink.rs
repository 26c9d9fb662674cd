//! Event sinks.
//!
//! The scanner and the store maintainer never hold on to events: each one is
//! handed to an [`EventSink`] the moment it is detected, on the scanning
//! thread, in traversal order. A slow sink therefore slows the poll down.
//!
//! Any `FnMut(Event)` closure is a sink:
//!
//! ```
//! use pw_core::{Effect, Event, PathKind};
//! use pw_scanner::EventSink;
//!
//! let mut seen = Vec::new();
//! let mut sink = |event: Event| seen.push(event);
//! sink.send(Event::new("/w/a", Effect::Create, PathKind::File));
//! assert_eq!(seen.len(), 1);
//! ```

use pw_core::Event;

/// Receives events as they are detected.
pub trait EventSink {
    /// Delivers one event.
    fn send(&mut self, event: Event);
}

impl<F> EventSink for F
where
    F: FnMut(Event),
{
    #[inline]
    fn send(&mut self, event: Event) {
        self(event);
    }
}

/// Logs and delivers one event.
pub(crate) fn emit<S: EventSink + ?Sized>(sink: &mut S, event: Event) {
    tracing::trace!(
        path = %event.path,
        effect = %event.effect,
        kind = %event.kind,
        "Emitting event"
    );
    sink.send(event);
}
