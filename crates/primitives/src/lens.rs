//! Lens views over atomic references
//!
//! A [`LensView`] projects a field `B` out of a parent reference holding `A`.
//! It stores no value and no version of its own. Every operation is
//! rewritten into the equivalent parent operation:
//!
//! ```text
//! view.modify(g)  ==>  parent.modify(|a| {
//!                          let (b, r) = g(&get(a));
//!                          (set(a, b), r)
//!                      })
//! ```
//!
//! Atomicity therefore comes entirely from the parent's CAS, and `set` is
//! always applied to the latest parent value. Fields of `A` the lens does
//! not touch survive concurrent writes by other parties.
//!
//! ## Lens Laws
//!
//! Callers must supply a lawful getter/setter pair. The laws are not
//! checked:
//! - `get(&set(a, b)) == b`
//! - `set(a, get(a)) == a`
//!
//! ## Access Tokens
//!
//! A lens token remembers the projected value it handed out. Its setter
//! makes one attempt on the parent, committing `set(latest, b)` only if the
//! projection of the latest parent value still equals the remembered one.
//! A sibling field changing in the meantime does not fail the commit. A
//! change to the projected field does.
//!
//! The check is on projected values, not on parent versions. If the
//! projected field is changed and then restored (`0 -> 5 -> 0`) before the
//! token commits, the commit succeeds. Tokens from [`AtomicCell`] itself
//! reject that case. Use [`make_lens_by`] with a stricter equality when a
//! restored field should count as a change.
//!
//! [`AtomicCell`]: stratacell_concurrency::AtomicCell

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use stratacell_concurrency::{Ref, Setter};
use tracing::trace;

/// Reference to a projected field of a parent reference
///
/// # Example
///
/// ```
/// use stratacell_concurrency::{AtomicCell, Ref};
/// use stratacell_primitives::make_lens;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Account {
///     balance: i64,
///     owner: String,
/// }
///
/// let account = AtomicCell::new(Account { balance: 10, owner: "ada".into() });
/// let balance = make_lens(
///     &account,
///     |a: &Account| a.balance,
///     |a: &Account, balance: i64| Account { balance, ..a.clone() },
/// );
///
/// balance.update(|b| b + 5);
/// assert_eq!(account.get(), Account { balance: 15, owner: "ada".into() });
/// ```
pub struct LensView<P, A, B, G, S> {
    parent: P,
    get: G,
    set: S,
    eq: fn(&B, &B) -> bool,
    _marker: PhantomData<fn(&A) -> A>,
}

/// Build a lens view comparing projections with `PartialEq`
pub fn make_lens<P, A, B, G, S>(parent: P, get: G, set: S) -> LensView<P, A, B, G, S>
where
    A: Clone,
    B: Clone + PartialEq,
    P: Ref<A>,
    G: Fn(&A) -> B,
    S: Fn(&A, B) -> A,
{
    make_lens_by(parent, get, set, <B as PartialEq>::eq)
}

/// Build a lens view with an explicit projection equality
///
/// `eq` decides whether a lens access token is still valid: the token
/// commits only if `eq(get(latest), observed)`.
pub fn make_lens_by<P, A, B, G, S>(
    parent: P,
    get: G,
    set: S,
    eq: fn(&B, &B) -> bool,
) -> LensView<P, A, B, G, S>
where
    A: Clone,
    B: Clone,
    P: Ref<A>,
    G: Fn(&A) -> B,
    S: Fn(&A, B) -> A,
{
    LensView {
        parent,
        get,
        set,
        eq,
        _marker: PhantomData,
    }
}

/// View a whole parent value through a bidirectional mapping
///
/// `from(to(a)) == a` and `to(from(b)) == b` must hold.
///
/// # Example
///
/// ```
/// use stratacell_concurrency::{AtomicCell, Ref};
/// use stratacell_primitives::iso;
///
/// let celsius = AtomicCell::new(100.0_f64);
/// let fahrenheit = iso(&celsius, |c: &f64| c * 9.0 / 5.0 + 32.0, |f: f64| (f - 32.0) * 5.0 / 9.0);
///
/// assert_eq!(fahrenheit.get(), 212.0);
/// fahrenheit.set(32.0);
/// assert_eq!(celsius.get(), 0.0);
/// ```
pub fn iso<P, A, B, G, H>(
    parent: P,
    to: G,
    from: H,
) -> LensView<P, A, B, G, impl Fn(&A, B) -> A>
where
    A: Clone,
    B: Clone + PartialEq,
    P: Ref<A>,
    G: Fn(&A) -> B,
    H: Fn(B) -> A,
{
    make_lens(parent, to, move |_: &A, b: B| from(b))
}

impl<P, A, B, G, S> LensView<P, A, B, G, S> {
    /// Parent reference
    pub fn parent(&self) -> &P {
        &self.parent
    }

    /// Consume the view, returning the parent reference
    pub fn into_parent(self) -> P {
        self.parent
    }
}

impl<P, A, B, G, S> Ref<B> for LensView<P, A, B, G, S>
where
    A: Clone,
    B: Clone,
    P: Ref<A>,
    G: Fn(&A) -> B,
    S: Fn(&A, B) -> A,
{
    type Access<'a> = LensAccess<'a, P, A, B, G, S> where Self: 'a;

    fn get(&self) -> B {
        (self.get)(&self.parent.get())
    }

    fn access(&self) -> (B, LensAccess<'_, P, A, B, G, S>) {
        let observed = (self.get)(&self.parent.get());
        let token = LensAccess {
            lens: self,
            observed: observed.clone(),
            consumed: AtomicBool::new(false),
        };
        (observed, token)
    }

    fn try_modify_or<R, E, F>(&self, f: F) -> Result<Option<R>, E>
    where
        F: FnOnce(&B) -> Result<(B, R), E>,
    {
        self.parent
            .try_modify_or(|a| f(&(self.get)(a)).map(|(b, result)| ((self.set)(a, b), result)))
    }

    fn modify_or<R, E, F>(&self, mut f: F) -> Result<R, E>
    where
        F: FnMut(&B) -> Result<(B, R), E>,
    {
        self.parent
            .modify_or(|a| f(&(self.get)(a)).map(|(b, result)| ((self.set)(a, b), result)))
    }
}

impl<P: fmt::Debug, A, B, G, S> fmt::Debug for LensView<P, A, B, G, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LensView")
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}

/// Single-use conditional commit through a [`LensView`]
pub struct LensAccess<'a, P, A, B, G, S> {
    lens: &'a LensView<P, A, B, G, S>,
    observed: B,
    consumed: AtomicBool,
}

impl<P, A, B, G, S> LensAccess<'_, P, A, B, G, S> {
    /// Projected value captured by `access`
    pub fn observed(&self) -> &B {
        &self.observed
    }

    /// Whether the token has been used
    pub fn is_consumed(&self) -> bool {
        self.consumed.load(Ordering::Acquire)
    }
}

impl<P, A, B, G, S> Setter<B> for LensAccess<'_, P, A, B, G, S>
where
    A: Clone,
    B: Clone,
    P: Ref<A>,
    G: Fn(&A) -> B,
    S: Fn(&A, B) -> A,
{
    fn set(&self, value: B) -> bool {
        if self.consumed.swap(true, Ordering::AcqRel) {
            trace!("lens access token reused, commit rejected");
            return false;
        }

        let lens = self.lens;
        let outcome = lens.parent.try_modify_or(|a| {
            if (lens.eq)(&(lens.get)(a), &self.observed) {
                Ok(((lens.set)(a, value), ()))
            } else {
                Err(())
            }
        });

        match outcome {
            Ok(Some(())) => true,
            Ok(None) => {
                trace!("lens access commit lost race on parent");
                false
            }
            Err(()) => {
                trace!("projected field changed since access, commit rejected");
                false
            }
        }
    }
}

impl<P, A, B: fmt::Debug, G, S> fmt::Debug for LensAccess<'_, P, A, B, G, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LensAccess")
            .field("observed", &self.observed)
            .field("consumed", &self.is_consumed())
            .finish()
    }
}
