//! # stratacell
//!
//! Lock-free atomic reference cells with optimistic concurrent mutation.
//!
//! A cell holds a value and a version stamp that are swapped together by
//! compare-and-swap. On top of that primitive, stratacell provides:
//!
//! - Retrying updates (`update`, `modify`, ...) that never lose a write
//! - Attempt-once updates (`try_update`, `try_modify`) that report a lost race
//! - Short-circuiting updates (`update_maybe`, `modify_or`, ...)
//! - Single-use access tokens for read-now, commit-later workflows
//! - Lens views that update one field of a cell without clobbering siblings
//!
//! ## Quick Start
//!
//! ```
//! use stratacell::prelude::*;
//!
//! let counter = AtomicCell::new(0u64);
//!
//! // Retry-to-success
//! counter.update(|n| n + 1);
//!
//! // Attempt once
//! assert!(counter.try_update(|n| n * 10));
//!
//! // Read now, commit later (at most once)
//! let (seen, setter) = counter.access();
//! assert_eq!(seen, 10);
//! assert!(setter.set(seen + 1));
//! assert!(!setter.set(0));
//!
//! assert_eq!(counter.get(), 11);
//! ```
//!
//! ## Lenses
//!
//! ```
//! use stratacell::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Job {
//!     attempts: u32,
//!     status: &'static str,
//! }
//!
//! let job = AtomicCell::new(Job { attempts: 0, status: "queued" });
//! let attempts = make_lens(
//!     &job,
//!     |j: &Job| j.attempts,
//!     |j: &Job, attempts: u32| Job { attempts, ..j.clone() },
//! );
//!
//! attempts.update(|n| n + 1);
//! assert_eq!(job.get(), Job { attempts: 1, status: "queued" });
//! ```
//!
//! ## Purity
//!
//! Closures passed to retrying operations may run more than once per call
//! when the cell is contended. Keep them free of side effects.

#![warn(missing_docs)]

pub mod prelude;

pub use stratacell_concurrency::{
    retry, AccessToken, AtomicCell, Backoff, CellBuilder, Ref, RetryConfig, Setter,
};
pub use stratacell_core::{Error, Result, Transition, Version, Versioned};
pub use stratacell_primitives::{iso, make_lens, make_lens_by, LensAccess, LensView};
