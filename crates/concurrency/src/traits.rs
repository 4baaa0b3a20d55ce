//! Operation surface shared by cells and derived views
//!
//! [`Ref`] is implemented by [`AtomicCell`](crate::AtomicCell) and by lens
//! views over any other `Ref`. Implementors supply four primitives; every
//! other operation is derived from them and inherits their atomicity.
//!
//! ## Failure Semantics
//!
//! | Policy | Operations | Reports |
//! |--------|------------|---------|
//! | retry-to-success | `update`, `modify`, `modify_state`, ... | never fails |
//! | retry with short-circuit | `update_maybe`, `modify_or`, ... | abort from the closure |
//! | attempt-once | `try_update`, `try_modify`, `try_modify_state` | lost race |
//! | single-use token | `access` | failed setter |
//!
//! Closures receive the current committed value by reference. Retrying
//! operations may call them more than once, so they must be pure.

use std::convert::Infallible;
use std::sync::Arc;
use stratacell_core::Transition;

/// Single-use conditional commit handed out by [`Ref::access`]
pub trait Setter<T> {
    /// Attempt the commit. Returns `false` if the token was already used or
    /// the observed state is gone; the token is spent either way.
    fn set(&self, value: T) -> bool;
}

/// Atomic reference supporting optimistic concurrent mutation
pub trait Ref<T: Clone> {
    /// Token type returned by [`access`](Ref::access)
    type Access<'a>: Setter<T>
    where
        Self: 'a;

    /// Current value
    fn get(&self) -> T;

    /// Capture the current value and a single-use setter bound to it
    fn access(&self) -> (T, Self::Access<'_>);

    /// Single read-compute-CAS with an optional abort
    ///
    /// # Returns
    /// - Ok(Some(r)) if the new value was committed
    /// - Ok(None) if a concurrent commit won the race
    /// - Err(e) if `f` aborted; nothing was written
    fn try_modify_or<R, E, F>(&self, f: F) -> Result<Option<R>, E>
    where
        F: FnOnce(&T) -> Result<(T, R), E>;

    /// Retry `f` until its candidate commits or it aborts
    ///
    /// # Returns
    /// - Ok(r) from the evaluation that committed
    /// - Err(e) from the first evaluation that aborted; nothing was written
    fn modify_or<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnMut(&T) -> Result<(T, R), E>;

    /// Unconditionally replace the value
    fn set(&self, value: T) {
        self.update(move |_| value.clone());
    }

    /// Replace the value, returning the one it replaced
    fn get_and_set(&self, value: T) -> T {
        self.modify(move |old| (value.clone(), old.clone()))
    }

    /// Apply `f` until it commits
    fn update<F>(&self, mut f: F)
    where
        F: FnMut(&T) -> T,
    {
        self.modify(move |v| (f(v), ()));
    }

    /// Apply `f` until it commits, returning the value it replaced
    fn get_and_update<F>(&self, mut f: F) -> T
    where
        F: FnMut(&T) -> T,
    {
        self.modify(move |v| (f(v), v.clone()))
    }

    /// Apply `f` until it commits, returning the committed value
    fn update_and_get<F>(&self, mut f: F) -> T
    where
        F: FnMut(&T) -> T,
    {
        self.modify(move |v| {
            let next = f(v);
            (next.clone(), next)
        })
    }

    /// Apply `f` until it commits, returning its auxiliary result
    fn modify<R, F>(&self, mut f: F) -> R
    where
        F: FnMut(&T) -> (T, R),
    {
        match self.modify_or(move |v| Ok::<_, Infallible>(f(v))) {
            Ok(result) => result,
            Err(never) => match never {},
        }
    }

    /// Apply `f` once; `false` if a concurrent commit won the race
    fn try_update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&T) -> T,
    {
        self.try_modify(move |v| (f(v), ())).is_some()
    }

    /// Apply `f` once; `None` if a concurrent commit won the race
    fn try_modify<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&T) -> (T, R),
    {
        match self.try_modify_or(move |v| Ok::<_, Infallible>(f(v))) {
            Ok(result) => result,
            Err(never) => match never {},
        }
    }

    /// Apply `f` until it commits; `false` without writing if `f` returns `None`
    fn update_maybe<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&T) -> Option<T>,
    {
        self.modify_or(move |v| f(v).map(|next| (next, ())).ok_or(()))
            .is_ok()
    }

    /// Apply `f` until it commits; `None` without writing if `f` returns `None`
    fn modify_maybe<R, F>(&self, mut f: F) -> Option<R>
    where
        F: FnMut(&T) -> Option<(T, R)>,
    {
        self.modify_or(move |v| f(v).ok_or(())).ok()
    }

    /// Apply `f` until it commits; `Some(e)` without writing if `f` returns `Err(e)`
    fn update_or<E, F>(&self, mut f: F) -> Option<E>
    where
        F: FnMut(&T) -> Result<T, E>,
    {
        self.modify_or(move |v| f(v).map(|next| (next, ()))).err()
    }

    /// Run a pure transition until it commits
    fn modify_state<R>(&self, transition: &Transition<T, R>) -> R {
        self.modify(|v| transition.run(v))
    }

    /// Run a pure transition once; `None` if a concurrent commit won the race
    fn try_modify_state<R>(&self, transition: &Transition<T, R>) -> Option<R> {
        self.try_modify(|v| transition.run(v))
    }
}

impl<T: Clone, R: Ref<T> + ?Sized> Ref<T> for &R {
    type Access<'a> = R::Access<'a> where Self: 'a;

    fn get(&self) -> T {
        (**self).get()
    }

    fn access(&self) -> (T, Self::Access<'_>) {
        (**self).access()
    }

    fn try_modify_or<Out, E, F>(&self, f: F) -> Result<Option<Out>, E>
    where
        F: FnOnce(&T) -> Result<(T, Out), E>,
    {
        (**self).try_modify_or(f)
    }

    fn modify_or<Out, E, F>(&self, f: F) -> Result<Out, E>
    where
        F: FnMut(&T) -> Result<(T, Out), E>,
    {
        (**self).modify_or(f)
    }
}

impl<T: Clone, R: Ref<T> + ?Sized> Ref<T> for Arc<R> {
    type Access<'a> = R::Access<'a> where Self: 'a;

    fn get(&self) -> T {
        (**self).get()
    }

    fn access(&self) -> (T, Self::Access<'_>) {
        (**self).access()
    }

    fn try_modify_or<Out, E, F>(&self, f: F) -> Result<Option<Out>, E>
    where
        F: FnOnce(&T) -> Result<(T, Out), E>,
    {
        (**self).try_modify_or(f)
    }

    fn modify_or<Out, E, F>(&self, f: F) -> Result<Out, E>
    where
        F: FnMut(&T) -> Result<(T, Out), E>,
    {
        (**self).modify_or(f)
    }
}
