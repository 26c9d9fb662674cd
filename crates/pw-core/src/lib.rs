//! Core types, errors, and utilities for pollwatch.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - Event types ([`Event`], [`Effect`], [`PathKind`])
//! - Configuration structures ([`Config`], [`WatchConfig`], [`TraversalConfig`])
//! - The [`ConfigError`] type for configuration loading
//! - The `FxHashMap` alias (faster than std for path keys)
//!
//! # Crate Dependencies
//!
//! ```text
//! pw-cli ──► pw-watcher ──► pw-scanner ──► pw-core
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod types;

pub use config::{Config, TraversalConfig, WatchConfig};
pub use error::ConfigError;
pub use hash::{FxHashMap, fx_hash_map};
pub use types::{Effect, Event, PathKind};
