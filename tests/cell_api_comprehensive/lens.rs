//! Lens Tests
//!
//! Tests for field projections over a parent cell:
//! - Every operation is reflected in the parent
//! - Sibling fields survive
//! - Access token policy (projection check, single use)

use crate::*;

/// Test get projects the field
#[test]
fn test_lens_get() {
    let cell = AtomicCell::new(Foo::new(0, -1));
    let bar = bar_lens(&cell);
    assert_eq!(bar.get(), 0);
}

/// Test set updates only the projected field
#[test]
fn test_lens_set() {
    let cell = AtomicCell::new(Foo::new(0, -1));
    let bar = bar_lens(&cell);
    bar.set(1);
    assert_eq!(cell.get(), Foo::new(1, -1));
}

/// Test get_and_set
#[test]
fn test_lens_get_and_set() {
    let cell = AtomicCell::new(Foo::new(0, -1));
    let bar = bar_lens(&cell);
    assert_eq!(bar.get_and_set(1), 0);
    assert_eq!(cell.get(), Foo::new(1, -1));
}

/// Test update family
#[test]
fn test_lens_updates() {
    let cell = AtomicCell::new(Foo::new(0, -1));
    let bar = bar_lens(&cell);
    bar.update(|b| b + 1);
    assert_eq!(bar.get_and_update(|b| b + 1), 1);
    assert_eq!(bar.update_and_get(|b| b + 1), 3);
    assert_eq!(cell.get(), Foo::new(3, -1));
}

/// Test modify
#[test]
fn test_lens_modify() {
    let cell = AtomicCell::new(Foo::new(0, -1));
    let bar = bar_lens(&cell);
    assert_eq!(bar.modify(|b| (b + 1, b + 2)), 2);
    assert_eq!(cell.get(), Foo::new(1, -1));
}

/// Test try_update and try_modify succeed without contention
#[test]
fn test_lens_try_ops_success() {
    let cell = AtomicCell::new(Foo::new(0, -1));
    let bar = bar_lens(&cell);
    assert!(bar.try_update(|b| b + 1));
    assert_eq!(bar.try_modify(|b| (b + 1, "ok")), Some("ok"));
    assert_eq!(cell.get(), Foo::new(2, -1));
}

/// Test try_update fails if the parent changes concurrently
#[test]
fn test_lens_try_update_fails_on_parent_write() {
    let cell = AtomicCell::new(Foo::new(0, -1));
    let bar = bar_lens(&cell);
    let ok = bar.try_update(|b| {
        cell.update(|f| Foo { baz: -2, ..f.clone() });
        b + 1
    });
    assert!(!ok);
    assert_eq!(cell.get(), Foo::new(0, -2));
}

/// Test try_modify fails if the parent changes concurrently
#[test]
fn test_lens_try_modify_fails_on_parent_write() {
    let cell = AtomicCell::new(Foo::new(0, -1));
    let bar = bar_lens(&cell);
    let result = bar.try_modify(|b| {
        cell.set(Foo::new(7, 7));
        (b + 1, ())
    });
    assert_eq!(result, None);
    assert_eq!(cell.get(), Foo::new(7, 7));
}

/// Test retrying lens updates recompute against the latest parent
#[test]
fn test_lens_update_preserves_concurrent_sibling_write() {
    let cell = AtomicCell::new(Foo::new(0, -1));
    let bar = bar_lens(&cell);
    let mut interfered = false;
    bar.update(|b| {
        if !interfered {
            interfered = true;
            cell.update(|f| Foo { baz: -2, ..f.clone() });
        }
        b + 1
    });
    assert_eq!(cell.get(), Foo::new(1, -2));
}

/// Test state transitions through a lens
#[test]
fn test_lens_state_transitions() {
    let cell = AtomicCell::new(Foo::new(0, -1));
    let bar = bar_lens(&cell);
    let incr = Transition::new(|b: &i64| (b + 1, *b));
    assert_eq!(bar.modify_state(&incr), 0);
    assert_eq!(bar.try_modify_state(&incr), Some(1));
    assert_eq!(cell.get(), Foo::new(2, -1));
}

/// Test short-circuit operations never touch the parent
#[test]
fn test_lens_short_circuit() {
    let cell = AtomicCell::new(Foo::new(0, -1));
    let version = cell.version();
    let bar = bar_lens(&cell);

    assert!(!bar.update_maybe(|b| if *b > 0 { Some(b - 1) } else { None }));
    assert_eq!(bar.update_or(|_| Err::<i64, _>("rejected")), Some("rejected"));
    assert_eq!(cell.version(), version);

    assert!(bar.update_maybe(|b| Some(b + 5)));
    assert_eq!(bar.modify_maybe(|b| Some((b - 1, *b))), Some(5));
    assert_eq!(cell.get(), Foo::new(4, -1));
}

/// Test access commits through the lens
#[test]
fn test_lens_access_commits() {
    let cell = AtomicCell::new(Foo::new(0, -1));
    let bar = bar_lens(&cell);
    let (value, setter) = bar.access();
    assert_eq!(value, 0);
    assert!(setter.set(1));
    assert_eq!(cell.get(), Foo::new(1, -1));
}

/// Test access commits after a sibling field changed, keeping the sibling
#[test]
fn test_lens_access_after_sibling_change() {
    let cell = AtomicCell::new(Foo::new(0, -1));
    let bar = bar_lens(&cell);
    let (value, setter) = bar.access();
    cell.update(|f| Foo { baz: -2, ..f.clone() });
    assert!(setter.set(value + 1));
    assert_eq!(cell.get(), Foo::new(1, -2));
}

/// Test access fails if the projected field changed
#[test]
fn test_lens_access_fails_after_field_change() {
    let cell = AtomicCell::new(Foo::new(0, -1));
    let bar = bar_lens(&cell);
    let (value, setter) = bar.access();
    cell.update(|f| Foo { bar: f.bar + 1, ..f.clone() });
    assert!(!setter.set(value + 10));
    assert_eq!(cell.get(), Foo::new(1, -1));
}

/// Test access setter fails the second time
#[test]
fn test_lens_access_fails_second_time() {
    let cell = AtomicCell::new(Foo::new(0, -1));
    let bar = bar_lens(&cell);
    let (value, setter) = bar.access();
    assert!(setter.set(value + 1));
    assert!(!setter.set(value + 1));
    assert_eq!(cell.get(), Foo::new(1, -1));
}

/// Test a lens over an Arc-shared parent
#[test]
fn test_lens_over_shared_parent() {
    let cell = shared_cell(Foo::new(0, 0));
    let baz = make_lens(
        Arc::clone(&cell),
        |f: &Foo| f.baz,
        |f: &Foo, baz: i64| Foo { baz, ..f.clone() },
    );
    baz.set(9);
    assert_eq!(cell.get(), Foo::new(0, 9));
    assert!(Arc::ptr_eq(baz.parent(), &cell));
}

/// Test two lenses on one cell update independent fields
#[test]
fn test_two_lenses_one_cell() {
    let cell = AtomicCell::new(Foo::new(0, 0));
    let bar = bar_lens(&cell);
    let baz = make_lens(
        &cell,
        |f: &Foo| f.baz,
        |f: &Foo, baz: i64| Foo { baz, ..f.clone() },
    );

    let (_, bar_setter) = bar.access();
    let (_, baz_setter) = baz.access();
    assert!(baz_setter.set(2));
    assert!(bar_setter.set(1));
    assert_eq!(cell.get(), Foo::new(1, 2));
}
