//! Concurrency layer for stratacell
//!
//! This crate implements lock-free optimistic cells:
//! - AtomicCell: versioned value swapped as a unit by compare-and-swap
//! - Retry engine: read-compute-CAS loops (retry-to-success and attempt-once)
//! - AccessToken: single-use conditional commit bound to one read
//! - Ref: the operation surface shared by cells and derived views

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod access;
pub mod cell;
pub mod retry;
pub mod traits;

pub use access::AccessToken;
pub use cell::{AtomicCell, CellBuilder};
pub use retry::{Backoff, RetryConfig};
pub use traits::{Ref, Setter};

// Re-export the core vocabulary for convenience
pub use stratacell_core::{Error, Result, Transition, Version, Versioned};
