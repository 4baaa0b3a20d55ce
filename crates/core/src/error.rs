//! Error types for version-checked cell operations
//!
//! Most cell operations report optimistic failure as part of their return
//! value (`bool`, `Option`). Only the diagnostic surface
//! (`compare_and_set`, `AccessToken::commit`) returns [`Error`], so callers
//! can tell a lost race from a reused token.

use crate::version::Version;
use thiserror::Error;

/// Errors from version-checked operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The cell was not at the expected version when the swap was attempted
    #[error("version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Version the caller expected
        expected: Version,
        /// Version the cell was at
        actual: Version,
    },

    /// The access token was already used
    #[error("access token already consumed")]
    TokenConsumed,

    /// The cell committed past the version the token observed
    #[error("stale access token: observed {observed}, cell at {current}")]
    StaleToken {
        /// Version captured by `access`
        observed: Version,
        /// Version the cell was at when the commit was attempted
        current: Version,
    },
}

/// Result type for version-checked operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error was caused by a concurrent commit.
    ///
    /// Conflicts may succeed with a fresh read. A consumed token never will.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::VersionMismatch { .. } | Error::StaleToken { .. })
    }

    /// Check if this error came from an access token that can no longer commit.
    pub fn is_token_error(&self) -> bool {
        matches!(self, Error::TokenConsumed | Error::StaleToken { .. })
    }
}
