//! Domain types for pollwatch.
//!
//! # Module Organization
//!
//! - [`event`] - The change event handed to event sinks
//! - [`kind`] - Effect and path-kind enumerations
//!
//! All public types are re-exported at this module level and at the crate root:
//!
//! ```
//! use pw_core::{Effect, Event, PathKind};
//! ```

mod event;
mod kind;

pub use event::Event;
pub use kind::{Effect, PathKind};
