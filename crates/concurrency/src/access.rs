//! Single-use access tokens
//!
//! [`AtomicCell::access`](crate::Ref::access) reads the cell once and hands
//! back an [`AccessToken`] bound to that read. The token permits exactly one
//! conditional commit:
//!
//! ```text
//! Live ──set/commit──> Consumed
//! ```
//!
//! The commit succeeds only if the cell is still at the observed version.
//! Staleness is decided by version identity: if another writer changed the
//! value and then restored it, the token is still stale.
//!
//! A token keeps its observed snapshot alive until it is dropped.

use crate::cell::AtomicCell;
use crate::traits::Setter;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use stratacell_core::{Error, Result, Version, Versioned};
use tracing::trace;

/// Single-use conditional commit against an [`AtomicCell`]
pub struct AccessToken<'a, T> {
    cell: &'a AtomicCell<T>,
    observed: Arc<Versioned<T>>,
    consumed: AtomicBool,
}

impl<'a, T> AccessToken<'a, T> {
    pub(crate) fn new(cell: &'a AtomicCell<T>, observed: Arc<Versioned<T>>) -> Self {
        Self {
            cell,
            observed,
            consumed: AtomicBool::new(false),
        }
    }

    /// Version captured by `access`
    pub fn observed_version(&self) -> Version {
        self.observed.version
    }

    /// Whether the token has been used
    pub fn is_consumed(&self) -> bool {
        self.consumed.load(Ordering::Acquire)
    }

    /// Commit `value` if the cell is still at the observed version
    ///
    /// The token is spent whatever the outcome.
    ///
    /// # Returns
    /// - Ok(version) stored by the commit
    /// - Err(TokenConsumed) if the token was already used
    /// - Err(StaleToken) if the cell committed since the token was issued
    pub fn commit(&self, value: T) -> Result<Version> {
        if self.consumed.swap(true, Ordering::AcqRel) {
            trace!(
                observed = %self.observed.version,
                "access token reused, commit rejected"
            );
            return Err(Error::TokenConsumed);
        }

        self.cell
            .swap_from(&self.observed, value)
            .map_err(|current| {
                trace!(
                    observed = %self.observed.version,
                    current = %current,
                    "stale access token, commit rejected"
                );
                Error::StaleToken {
                    observed: self.observed.version,
                    current,
                }
            })
    }
}

impl<T> Setter<T> for AccessToken<'_, T> {
    fn set(&self, value: T) -> bool {
        self.commit(value).is_ok()
    }
}

impl<T> fmt::Debug for AccessToken<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("observed_version", &self.observed.version)
            .field("consumed", &self.is_consumed())
            .finish()
    }
}
