//! Lock-free versioned atomic cell
//!
//! ## Design
//!
//! The cell stores its state as one immutable `Arc<Versioned<T>>` behind an
//! [`ArcSwap`]. Value and version are therefore swapped as a unit: a commit
//! publishes a new snapshot whose version is the successor of the snapshot
//! it replaces.
//!
//! A compare-and-swap compares snapshot pointers. Anyone holding the
//! expected snapshot (a retry loop, an access token) keeps it alive, so the
//! pointer cannot be recycled underneath them and pointer identity is
//! version identity.
//!
//! No locks are taken. Readers never wait. Writers that lose a race re-read
//! and recompute (see [`retry`](crate::retry)).

use crate::access::AccessToken;
use crate::retry::{self, RetryConfig};
use crate::traits::Ref;
use arc_swap::ArcSwap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use stratacell_core::{Error, Result, Version, Versioned};

/// Lock-free atomic reference cell
///
/// # Example
///
/// ```
/// use stratacell_concurrency::{AtomicCell, Ref};
///
/// let counter = AtomicCell::new(0);
/// counter.update(|n| n + 1);
/// assert_eq!(counter.get_and_set(10), 1);
///
/// let (seen, setter) = counter.access();
/// assert_eq!(seen, 10);
/// # use stratacell_concurrency::Setter;
/// assert!(setter.set(11));
/// assert!(!setter.set(12));
/// assert_eq!(counter.get(), 11);
/// ```
///
/// # Thread Safety
///
/// `AtomicCell<T>` is `Send + Sync` when `T` is. Share it by reference or
/// behind an `Arc`; no external synchronization is needed.
pub struct AtomicCell<T> {
    /// Current committed snapshot
    state: ArcSwap<Versioned<T>>,

    /// Backoff between lost races
    retry: RetryConfig,
}

impl<T> AtomicCell<T> {
    /// Create a cell at [`Version::INITIAL`] with the default retry policy
    pub fn new(value: T) -> Self {
        Self::builder().build(value)
    }

    /// Create a builder for cell configuration
    ///
    /// # Example
    ///
    /// ```
    /// use stratacell_concurrency::{AtomicCell, RetryConfig};
    ///
    /// let cell = AtomicCell::builder()
    ///     .retry(RetryConfig::no_backoff())
    ///     .build(vec![1, 2, 3]);
    /// assert_eq!(cell.retry_config(), RetryConfig::no_backoff());
    /// ```
    pub fn builder() -> CellBuilder<T> {
        CellBuilder::new()
    }

    /// Retry policy used by this cell's retrying operations
    pub fn retry_config(&self) -> RetryConfig {
        self.retry
    }

    /// Current version
    pub fn version(&self) -> Version {
        self.state.load().version
    }

    /// Explicit compare-and-swap against a version
    ///
    /// Replaces the value only if the cell is still at `expected`. Never
    /// retries.
    ///
    /// # Returns
    /// - Ok(version) stored by the commit
    /// - Err(VersionMismatch) if the cell was at another version
    pub fn compare_and_set(&self, expected: Version, value: T) -> Result<Version> {
        let current = self.snapshot();
        if current.version != expected {
            return Err(Error::VersionMismatch {
                expected,
                actual: current.version,
            });
        }

        self.swap_from(&current, value)
            .map_err(|actual| Error::VersionMismatch { expected, actual })
    }

    /// Current committed snapshot
    pub(crate) fn snapshot(&self) -> Arc<Versioned<T>> {
        self.state.load_full()
    }

    /// Publish `value` if the cell still holds `current`
    ///
    /// Returns the stored version, or the version found instead of
    /// `current` when the race was lost.
    pub(crate) fn swap_from(
        &self,
        current: &Arc<Versioned<T>>,
        value: T,
    ) -> std::result::Result<Version, Version> {
        let next = Arc::new(current.succeed(value));
        let stored = next.version;

        let prev = self.state.compare_and_swap(current, next);
        if Arc::ptr_eq(&prev, current) {
            Ok(stored)
        } else {
            Err(prev.version)
        }
    }
}

impl<T: Clone> AtomicCell<T> {
    /// Current value together with its version, captured atomically
    pub fn get_versioned(&self) -> Versioned<T> {
        Versioned::clone(&self.state.load())
    }

    /// Consume the cell, returning its value
    pub fn into_inner(self) -> T {
        let last = self.state.into_inner();
        match Arc::try_unwrap(last) {
            Ok(versioned) => versioned.value,
            Err(shared) => shared.value.clone(),
        }
    }
}

impl<T: Clone> Ref<T> for AtomicCell<T> {
    type Access<'a> = AccessToken<'a, T> where Self: 'a;

    fn get(&self) -> T {
        self.state.load().value.clone()
    }

    fn access(&self) -> (T, AccessToken<'_, T>) {
        let observed = self.snapshot();
        (observed.value.clone(), AccessToken::new(self, observed))
    }

    fn try_modify_or<R, E, F>(&self, f: F) -> std::result::Result<Option<R>, E>
    where
        F: FnOnce(&T) -> std::result::Result<(T, R), E>,
    {
        retry::attempt_once(
            || self.snapshot(),
            |current| f(&current.value),
            |current, next| self.swap_from(current, next).is_ok(),
        )
    }

    fn modify_or<R, E, F>(&self, mut f: F) -> std::result::Result<R, E>
    where
        F: FnMut(&T) -> std::result::Result<(T, R), E>,
    {
        retry::retry_to_success(
            self.retry,
            || self.snapshot(),
            |current| f(&current.value),
            |current, next| self.swap_from(current, next).is_ok(),
        )
    }
}

impl<T: Default> Default for AtomicCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> From<T> for AtomicCell<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for AtomicCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.load();
        f.debug_struct("AtomicCell")
            .field("value", &state.value)
            .field("version", &state.version)
            .finish()
    }
}

/// Builder for cell configuration
///
/// # Example
///
/// ```
/// use stratacell_concurrency::{AtomicCell, RetryConfig};
///
/// // Default policy: spin, then yield
/// let cell = AtomicCell::builder().build(0u64);
///
/// // Hot loop on a dedicated core: retry immediately
/// let cell = AtomicCell::builder().no_backoff().build(0u64);
/// ```
pub struct CellBuilder<T> {
    retry: RetryConfig,
    _value: PhantomData<fn() -> T>,
}

impl<T> CellBuilder<T> {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            retry: RetryConfig::default(),
            _value: PhantomData,
        }
    }

    /// Use a custom retry policy
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Retry immediately after a lost race
    pub fn no_backoff(self) -> Self {
        self.retry(RetryConfig::no_backoff())
    }

    /// Build the cell
    pub fn build(self, value: T) -> AtomicCell<T> {
        AtomicCell {
            state: ArcSwap::from_pointee(Versioned::initial(value)),
            retry: self.retry,
        }
    }
}

impl<T> Default for CellBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CellBuilder<T> {
    fn clone(&self) -> Self {
        Self {
            retry: self.retry,
            _value: PhantomData,
        }
    }
}

impl<T> fmt::Debug for CellBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellBuilder")
            .field("retry", &self.retry)
            .finish()
    }
}
