//! Convenient imports for stratacell.
//!
//! This module re-exports the most commonly used types so you can get started
//! with a single import:
//!
//! ```
//! use stratacell::prelude::*;
//!
//! let cell = AtomicCell::new(1);
//! cell.update(|n| n + 1);
//! assert_eq!(cell.get(), 2);
//! ```

// Cells and their configuration
pub use crate::{AtomicCell, CellBuilder, RetryConfig};

// Operation surface
pub use crate::{Ref, Setter};

// Derived views
pub use crate::{iso, make_lens, make_lens_by, LensView};

// Core types
pub use crate::{Error, Result, Transition, Version, Versioned};
