//! Derived references for stratacell
//!
//! Primitives in this crate hold no state of their own. They wrap a parent
//! [`Ref`](stratacell_concurrency::Ref) and delegate all atomicity to it.
//!
//! - [`LensView`]: read and update one field of the parent's value
//! - [`iso`]: view the parent's whole value through a bidirectional mapping

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod lens;

pub use lens::{iso, make_lens, make_lens_by, LensAccess, LensView};
