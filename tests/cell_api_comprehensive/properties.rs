//! Property Tests
//!
//! Single-threaded runs of arbitrary operation sequences must agree with a
//! plain sequential model, and lens operations must never disturb fields
//! outside the projection.

use crate::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Set(i64),
    GetAndSet(i64),
    Add(i64),
    GetAndAdd(i64),
    TryAdd(i64),
    DecrementIfPositive,
    SubtractOrReject(i64),
    AccessAndCommit(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-100i64..100).prop_map(Op::Set),
        (-100i64..100).prop_map(Op::GetAndSet),
        (-100i64..100).prop_map(Op::Add),
        (-100i64..100).prop_map(Op::GetAndAdd),
        (-100i64..100).prop_map(Op::TryAdd),
        Just(Op::DecrementIfPositive),
        (0i64..50).prop_map(Op::SubtractOrReject),
        (-100i64..100).prop_map(Op::AccessAndCommit),
    ]
}

/// Apply an operation to the cell, returning what the caller observed
fn apply_cell(cell: &AtomicCell<i64>, op: &Op) -> Option<i64> {
    match *op {
        Op::Set(v) => {
            cell.set(v);
            None
        }
        Op::GetAndSet(v) => Some(cell.get_and_set(v)),
        Op::Add(d) => Some(cell.update_and_get(|n| n + d)),
        Op::GetAndAdd(d) => Some(cell.get_and_update(|n| n + d)),
        Op::TryAdd(d) => Some(cell.try_update(|n| n + d) as i64),
        Op::DecrementIfPositive => {
            Some(cell.update_maybe(|n| if *n > 0 { Some(n - 1) } else { None }) as i64)
        }
        Op::SubtractOrReject(d) => cell.update_or(|n| if *n >= d { Ok(n - d) } else { Err(*n) }),
        Op::AccessAndCommit(v) => {
            let (seen, setter) = cell.access();
            assert!(setter.set(v));
            Some(seen)
        }
    }
}

/// Apply an operation to the sequential model
fn apply_model(model: &mut i64, op: &Op) -> Option<i64> {
    match *op {
        Op::Set(v) => {
            *model = v;
            None
        }
        Op::GetAndSet(v) => Some(std::mem::replace(model, v)),
        Op::Add(d) => {
            *model += d;
            Some(*model)
        }
        Op::GetAndAdd(d) => {
            let old = *model;
            *model += d;
            Some(old)
        }
        Op::TryAdd(d) => {
            *model += d;
            Some(1)
        }
        Op::DecrementIfPositive => {
            if *model > 0 {
                *model -= 1;
                Some(1)
            } else {
                Some(0)
            }
        }
        Op::SubtractOrReject(d) => {
            if *model >= d {
                *model -= d;
                None
            } else {
                Some(*model)
            }
        }
        Op::AccessAndCommit(v) => Some(std::mem::replace(model, v)),
    }
}

proptest! {
    #[test]
    fn cell_matches_sequential_model(
        initial in -1000i64..1000,
        ops in prop::collection::vec(op_strategy(), 0..64),
    ) {
        let cell = AtomicCell::new(initial);
        let mut model = initial;

        for op in &ops {
            let observed = apply_cell(&cell, op);
            let expected = apply_model(&mut model, op);
            prop_assert_eq!(observed, expected, "diverged on {:?}", op);
            prop_assert_eq!(cell.get(), model);
        }
    }

    #[test]
    fn aborted_operations_keep_version(initial in -1000i64..0) {
        let cell = AtomicCell::new(initial);
        let version = cell.version();

        let committed = cell.update_maybe(|n| if *n > 0 { Some(n - 1) } else { None });
        prop_assert!(!committed);
        prop_assert_eq!(cell.modify_maybe(|_| None::<(i64, ())>), None);
        prop_assert_eq!(cell.update_or(|n| Err::<i64, _>(*n)), Some(initial));
        prop_assert_eq!(cell.modify_or(|n| Err::<(i64, ()), _>(*n)), Err(initial));

        prop_assert_eq!(cell.version(), version);
        prop_assert_eq!(cell.get(), initial);
    }

    #[test]
    fn lens_never_touches_sibling(
        bar in any::<i32>(),
        baz in any::<i32>(),
        writes in prop::collection::vec(any::<i32>(), 1..16),
    ) {
        let cell = AtomicCell::new(Foo::new(bar as i64, baz as i64));
        let lens = bar_lens(&cell);

        for w in &writes {
            lens.set(*w as i64);
            // get(set(a, b)) == b
            prop_assert_eq!(lens.get(), *w as i64);
            prop_assert_eq!(cell.get().baz, baz as i64);
        }

        // set(a, get(a)) == a
        let before = cell.get();
        lens.update(|b| *b);
        prop_assert_eq!(cell.get(), before);
    }
}
