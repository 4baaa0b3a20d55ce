//! Pure state transitions
//!
//! A [`Transition`] is a function `S -> (S, R)` wrapped so it can be stored,
//! cloned and handed to `modify_state` / `try_modify_state`.
//!
//! ## Purity Requirement
//!
//! A transition may be run several times for a single logical update when
//! the cell is contended. It MUST be a pure function of its input:
//! - No I/O
//! - No mutation of state outside the closure
//! - No irreversible effects (logging, metrics)

use std::fmt;
use std::sync::Arc;

/// Shared pure function from a state to its successor and a result
///
/// # Example
///
/// ```
/// use stratacell_core::Transition;
///
/// let pop = Transition::new(|stack: &Vec<u32>| {
///     let mut next = stack.clone();
///     let top = next.pop();
///     (next, top)
/// });
///
/// let (rest, top) = pop.run(&vec![1, 2, 3]);
/// assert_eq!(rest, vec![1, 2]);
/// assert_eq!(top, Some(3));
/// ```
pub struct Transition<S, R> {
    run: Arc<dyn Fn(&S) -> (S, R) + Send + Sync>,
}

impl<S, R> Transition<S, R> {
    /// Wrap a pure function
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&S) -> (S, R) + Send + Sync + 'static,
    {
        Self { run: Arc::new(f) }
    }

    /// Apply the transition to a state
    pub fn run(&self, state: &S) -> (S, R) {
        (self.run)(state)
    }

    /// Post-compose a function on the result
    pub fn map<R2, F>(self, f: F) -> Transition<S, R2>
    where
        S: 'static,
        R: 'static,
        F: Fn(R) -> R2 + Send + Sync + 'static,
    {
        let run = self.run;
        Transition::new(move |state: &S| {
            let (next, result) = run(state);
            (next, f(result))
        })
    }
}

impl<S: Clone + 'static> Transition<S, S> {
    /// Transition that leaves the state alone and returns a copy of it
    pub fn inspect() -> Self {
        Transition::new(|state: &S| (state.clone(), state.clone()))
    }
}

impl<S, R> Clone for Transition<S, R> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<S, R> fmt::Debug for Transition<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition").finish_non_exhaustive()
    }
}
