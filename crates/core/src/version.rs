//! Version stamps for atomic cells
//!
//! Every successful commit against a cell stores a new [`Version`]. Staleness
//! is detected by version identity, never by comparing values: a cell that
//! was set to `1` and then back to `0` is at a different version than the
//! cell that was observed at `0`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Commit stamp of a cell
///
/// Versions are counters. A fresh cell starts at [`Version::INITIAL`] and each
/// commit stores the successor of the version it replaced, so stamps increase
/// strictly in commit order for a given cell. Stamps from different cells are
/// unrelated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(u64);

impl Version {
    /// Version of a freshly constructed cell
    pub const INITIAL: Version = Version(1);

    /// Create a version from a raw counter
    pub const fn counter(counter: u64) -> Self {
        Version(counter)
    }

    /// Raw counter value
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Version stored by the commit that replaces this one
    ///
    /// Wraps on overflow. At one commit per nanosecond that takes centuries.
    #[must_use]
    pub const fn next(self) -> Self {
        Version(self.0.wrapping_add(1))
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::INITIAL
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A value together with the version it was committed at
///
/// This is the unit a cell swaps atomically: value and version never change
/// independently of each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned<T> {
    /// Committed value
    pub value: T,
    /// Version of the commit that stored `value`
    pub version: Version,
}

impl<T> Versioned<T> {
    /// Pair a value with a version
    pub fn new(value: T, version: Version) -> Self {
        Self { value, version }
    }

    /// Pair a value with the initial version
    pub fn initial(value: T) -> Self {
        Self::new(value, Version::INITIAL)
    }

    /// Successor commit carrying `value`
    pub fn succeed(&self, value: T) -> Self {
        Self::new(value, self.version.next())
    }

    /// Transform the value, keeping the version
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Versioned<U> {
        Versioned::new(f(self.value), self.version)
    }

    /// Discard the version
    pub fn into_value(self) -> T {
        self.value
    }
}
