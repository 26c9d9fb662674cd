//! Fast hash map type alias.
//!
//! The snapshot store keys every regular file under the watch root by path,
//! so lookups happen once per file per poll. The alias uses the Fx hash
//! algorithm from `rustc-hash`, which is considerably cheaper than SipHash
//! for path-like keys. Denial-of-service resistance is not needed: keys come
//! from the local filesystem, not from untrusted input.
//!
//! # Examples
//!
//! ```
//! use pw_core::{FxHashMap, fx_hash_map};
//! use std::time::SystemTime;
//!
//! let mut mtimes: FxHashMap<String, SystemTime> = fx_hash_map();
//! mtimes.insert("/tmp/a".to_owned(), SystemTime::UNIX_EPOCH);
//! assert_eq!(mtimes.len(), 1);
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// Creates a new empty [`FxHashMap`].
#[inline]
#[must_use]
pub fn fx_hash_map<K, V>() -> FxHashMap<K, V> {
    FxHashMap::default()
}
