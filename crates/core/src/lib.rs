//! Core types for stratacell
//!
//! This crate defines the vocabulary shared by every cell implementation:
//! - [`Version`]: Stamp that changes on every successful commit
//! - [`Versioned`]: A value paired with the version it was committed at
//! - [`Transition`]: Pure state-transition function consumed by `modify_state`
//! - [`Error`]: Diagnostic errors for the version-checked operations

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod transition;
pub mod version;

pub use error::{Error, Result};
pub use transition::Transition;
pub use version::{Version, Versioned};
